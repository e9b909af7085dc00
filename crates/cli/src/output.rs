//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain-text sectioned report (default)
    #[default]
    Text,
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse a format name from configuration, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }
}

/// Log output format for diagnostics on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a section header
pub fn section(title: &str) -> String {
    format!("----{}----", title)
}

/// Color a recommended host count against the configured one
///
/// Green when they match, red when the group is configured below the
/// recommendation, yellow when above.
pub fn color_recommendation(configured: u32, recommended: u64) -> String {
    let text = recommended.to_string();
    match u64::from(configured).cmp(&recommended) {
        std::cmp::Ordering::Equal => text.green().to_string(),
        std::cmp::Ordering::Less => text.red().to_string(),
        std::cmp::Ordering::Greater => text.yellow().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    #[test]
    fn test_section() {
        assert_eq!(section("Basic ECS Info"), "----Basic ECS Info----");
    }

    #[test]
    fn test_color_recommendation_plain() {
        colored::control::set_override(false);
        assert_eq!(color_recommendation(4, 4), "4");
        assert_eq!(color_recommendation(2, 5), "5");
        assert_eq!(color_recommendation(9, 5), "5");
    }
}
