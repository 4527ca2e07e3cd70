//! `calmjournal version` — display version and build features.

use console::style;

use crate::crypto::kdf::KDF_ITERATIONS;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("calmjournal {current}");

    let audit = if cfg!(feature = "audit-log") {
        style("on").green()
    } else {
        style("off").dim()
    };
    println!("  cipher:    AES-256-GCM, PBKDF2-SHA256 x{KDF_ITERATIONS}");
    println!("  audit log: {audit}");

    Ok(())
}
