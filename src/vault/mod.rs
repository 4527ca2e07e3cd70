//! Vault module — the Calm Code lock core.
//!
//! This module provides:
//! - The persisted lock configuration (`config`)
//! - `VaultState`: session key ownership and all-or-nothing bulk passes (`state`)
//! - Auto-lock timer and clocks (`autolock`)
//! - The pending encrypted import (`import`)
//! - `LockController`: the lock/unlock state machine (`controller`)

pub mod autolock;
pub mod config;
pub mod controller;
pub mod import;
pub mod state;

// Re-export the most commonly used items.
pub use autolock::{AutoLockTimer, Clock, ManualClock, SystemClock};
pub use config::VaultConfig;
pub use controller::{ImportStart, LockController, NoticeKind, Notifier, NullNotifier};
pub use import::PendingImport;
pub use state::{LockState, VaultState};
