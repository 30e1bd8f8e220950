// Mode-aware terminal output for analysis results
use crate::charts::BarChart;
use crate::history::EditHistory;
use crate::models::AnalysisResult;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, IsTerminal};

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colors and symbols for an interactive terminal
    Human,
    /// One JSON document per message or result
    Json,
    /// Plain text without colors (for pipes/logs)
    Plain,
}

impl OutputMode {
    /// Auto-detect output mode based on environment
    pub fn auto() -> Self {
        if std::env::var("COLTALLY_JSON").is_ok() {
            Self::Json
        } else if !io::stdout().is_terminal() {
            Self::Plain
        } else {
            Self::Human
        }
    }
}

/// How a result should be drawn
#[derive(Debug, Clone, Copy)]
pub struct ResultStyle {
    pub chart_width: usize,
    pub top_n: Option<usize>,
    pub precision: usize,
    pub show_chart: bool,
}

#[derive(Serialize)]
struct Message<'a> {
    level: &'a str,
    message: &'a str,
}

/// CLI output writer with mode awareness
pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        if mode != OutputMode::Human {
            colored::control::set_override(false);
        }
        Self { mode }
    }

    pub fn auto() -> Self {
        Self::new(OutputMode::auto())
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        match self.mode {
            OutputMode::Human => {
                println!();
                println!("{}", title.cyan().bold());
                println!("{}", "═".repeat(title.chars().count()).cyan());
            }
            OutputMode::Plain => {
                println!();
                println!("{}", title);
                println!("{}", "=".repeat(title.chars().count()));
            }
            OutputMode::Json => {}
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✓".green(), message),
            OutputMode::Plain => println!("  [OK] {}", message),
            OutputMode::Json => self.emit("ok", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => eprintln!("  {} {}", "✗".red(), message),
            OutputMode::Plain => eprintln!("  [ERROR] {}", message),
            OutputMode::Json => self.emit("error", message),
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "⚠".yellow(), message),
            OutputMode::Plain => println!("  [WARN] {}", message),
            OutputMode::Json => self.emit("warning", message),
        }
    }

    pub fn info(&self, message: &str) {
        match self.mode {
            OutputMode::Human | OutputMode::Plain => println!("  {}", message),
            OutputMode::Json => self.emit("info", message),
        }
    }

    /// Print a key-value table
    pub fn table(&self, rows: &[(&str, String)]) {
        let max_key_len = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        match self.mode {
            OutputMode::Human => {
                for (key, value) in rows {
                    println!("  {:width$} │ {}", key.yellow(), value, width = max_key_len);
                }
            }
            OutputMode::Plain => {
                for (key, value) in rows {
                    println!("  {:width$} : {}", key, value, width = max_key_len);
                }
            }
            OutputMode::Json => {
                let object: serde_json::Map<String, serde_json::Value> = rows
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                    .collect();
                println!("{}", serde_json::Value::Object(object));
            }
        }
    }

    /// Print a frequency table: totals, then the chart
    pub fn result(&self, title: &str, result: &AnalysisResult, style: ResultStyle) {
        if self.mode == OutputMode::Json {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{}", json);
            }
            return;
        }

        self.section(title);
        self.table(&[
            ("Rows", result.total_rows.to_string()),
            ("Categories", result.unique_categories.to_string()),
        ]);

        if style.show_chart {
            println!();
            let chart = BarChart::from_result("", result, style.top_n)
                .with_width(style.chart_width)
                .with_precision(style.precision);
            print!("{}", chart.render());
        }
    }

    /// One-line undo/redo status
    pub fn history_status(&self, history: &EditHistory) {
        let status = describe_history(history);
        match self.mode {
            OutputMode::Human => println!("  {}", status.dimmed()),
            OutputMode::Plain => println!("  {}", status),
            OutputMode::Json => self.emit("history", &status),
        }
    }

    fn emit(&self, level: &str, message: &str) {
        if let Ok(json) = serde_json::to_string(&Message { level, message }) {
            println!("{}", json);
        }
    }
}

pub fn describe_history(history: &EditHistory) -> String {
    format!(
        "edit {}/{}{}{}",
        history.cursor(),
        history.len() - 1,
        if history.can_undo() { ", undo available" } else { "" },
        if history.can_redo() { ", redo available" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrequencyItem;

    #[test]
    fn test_auto_mode() {
        let mode = OutputMode::auto();
        // Plain under cargo test unless COLTALLY_JSON is set
        assert!(matches!(mode, OutputMode::Plain | OutputMode::Human | OutputMode::Json));
    }

    #[test]
    fn test_describe_history() {
        let mut history = EditHistory::new(vec![
            FrequencyItem {
                normalized_key: "a".into(),
                display_name: "a".into(),
                count: 1,
                percentage: 50.0,
            },
            FrequencyItem {
                normalized_key: "b".into(),
                display_name: "b".into(),
                count: 1,
                percentage: 50.0,
            },
        ]);
        assert_eq!(describe_history(&history), "edit 0/0");

        history.delete_category("a");
        assert_eq!(describe_history(&history), "edit 1/1, undo available");

        history.undo();
        assert_eq!(describe_history(&history), "edit 0/1, redo available");
    }
}
