//! One module per subcommand.

pub mod add;
#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod autolock;
pub mod change_code;
pub mod completions;
pub mod export;
pub mod import_cmd;
pub mod list;
pub mod protect;
pub mod reset;
pub mod session;
pub mod status;
pub mod unprotect;
pub mod version;
