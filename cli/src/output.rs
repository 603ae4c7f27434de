//! Output formatting

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// Print `data`; `table` renders the human-readable form
    pub fn print<T: Serialize>(&self, data: &T, table: impl FnOnce() -> String) {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Table => {
                println!("{}", table());
            }
        }
    }
}
