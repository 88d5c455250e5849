mod commands;

pub use commands::{confirm_disclaimer, Cli};
