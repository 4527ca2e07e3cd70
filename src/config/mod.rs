//! Configuration loaded from `.calmjournal.toml`.

pub mod settings;

pub use settings::Settings;
