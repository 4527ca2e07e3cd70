use clap::Parser;
use calmjournal::cli::commands;
use calmjournal::cli::commands::add::NewEntry;
use calmjournal::cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Diagnostics go to stderr; user-facing output stays on stdout.
    let subscriber = FmtSubscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Unable to set global default subscriber");
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Status => commands::status::execute(&cli),
        Commands::Add {
            ref text,
            ref note,
            ref tag,
            ref emoji,
        } => commands::add::execute(
            &cli,
            &NewEntry {
                text,
                note: note.as_deref(),
                tag: tag.as_deref(),
                emoji: emoji.as_deref(),
            },
        ),
        Commands::List => commands::list::execute(&cli),
        Commands::Protect => commands::protect::execute(&cli),
        Commands::Unprotect => commands::unprotect::execute(&cli),
        Commands::ChangeCode => commands::change_code::execute(&cli),
        Commands::Autolock { mode, minutes } => commands::autolock::execute(&cli, mode, minutes),
        Commands::Export {
            ref output,
            no_readable,
        } => commands::export::execute(&cli, output.as_deref(), no_readable),
        Commands::Import { ref file } => commands::import_cmd::execute(&cli, file),
        Commands::Reset { force } => commands::reset::execute(&cli, force),
        Commands::Session => commands::session::execute(&cli),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last } => commands::audit_cmd::execute(&cli, last),
        Commands::Completions { shell } => commands::completions::execute(shell),
        Commands::Version => commands::version::execute(),
    };

    if let Err(e) = result {
        calmjournal::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
