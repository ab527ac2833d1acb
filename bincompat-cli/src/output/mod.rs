//! Output formatting for bincompat commands.
//!
//! Every command result is `Serialize` and implements [`TableDisplay`]; the
//! selected [`OutputFormat`] decides which rendering reaches stdout.

use clap::ValueEnum;
use serde::Serialize;
use std::str::FromStr;

mod json;

pub use self::json::JsonOutput;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Table,
    /// JSON format for machine consumption
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Rendering options shared by all formats
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

/// Types that render as a human-readable report.
pub trait TableDisplay: Serialize {
    fn to_table(&self) -> String;

    fn render(&self, config: &OutputConfig) -> String {
        match config.format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => JsonOutput::format(self),
        }
    }
}

/// Result wrapper printed in the selected format
pub struct Output<T> {
    data: T,
    config: OutputConfig,
}

impl<T: TableDisplay> Output<T> {
    pub fn new(data: T, format: OutputFormat) -> Self {
        Self {
            data,
            config: OutputConfig::new(format),
        }
    }

    /// Render the output to stdout
    pub fn render(&self) -> anyhow::Result<()> {
        println!("{}", self.render_to_string());
        Ok(())
    }

    pub fn render_to_string(&self) -> String {
        self.data.render(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Message {
        text: String,
    }

    impl TableDisplay for Message {
        fn to_table(&self) -> String {
            format!("MSG: {}", self.text)
        }
    }

    fn make_message() -> Message {
        Message {
            text: "hello".to_string(),
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_selects_format() {
        let table = Output::new(make_message(), OutputFormat::Table).render_to_string();
        assert_eq!(table, "MSG: hello");

        let json = Output::new(make_message(), OutputFormat::Json).render_to_string();
        assert!(json.contains("\"text\": \"hello\""));
    }
}
