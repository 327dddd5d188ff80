//! # parkit-shell: Interactive Parking Console
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  main.rs                                                               │
//! │    ShellConfig::load()          config.rs                              │
//! │    init tracing (stderr)                                               │
//! │    Database::new() + health     parkit-db                              │
//! │    menu::run(service, console)  menu.rs + console.rs                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod console;
pub mod menu;

pub use config::{ConfigError, ShellConfig};
pub use console::StdConsole;
