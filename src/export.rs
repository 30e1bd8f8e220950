// Serialize the current frequency table as a table, CSV or JSON
use crate::error::ExportError;
use crate::models::AnalysisResult;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Render `result` in `format`. `precision` is the number of decimals shown
/// for percentages in table and CSV output; JSON carries the exact values.
pub fn render(
    result: &AnalysisResult,
    format: ExportFormat,
    precision: usize,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        ExportFormat::Csv => render_csv(result, precision),
        ExportFormat::Table => Ok(render_table(result, precision)),
    }
}

/// Write `result` to `path`
pub fn write(
    path: &Path,
    result: &AnalysisResult,
    format: ExportFormat,
    precision: usize,
) -> Result<(), ExportError> {
    let content = render(result, format, precision)?;
    fs::write(path, content)?;
    info!("Exported {} categories to {}", result.unique_categories, path.display());
    Ok(())
}

/// `<file stem>_<column>_frequency.csv`, made filesystem-safe
pub fn default_file_name(dataset_name: &str, column: &str) -> String {
    let stem = Path::new(dataset_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    format!("{}_{}_frequency.csv", sanitize(&stem), sanitize(column))
}

pub fn format_percentage(percentage: f64, precision: usize) -> String {
    format!("{:.*}%", precision, percentage)
}

fn sanitize(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "column".to_string()
    } else {
        cleaned
    }
}

fn render_csv(result: &AnalysisResult, precision: usize) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Category", "Count", "Percentage"])?;
    for item in &result.items {
        writer.write_record([
            item.display_name.clone(),
            item.count.to_string(),
            format_percentage(item.percentage, precision),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn render_table(result: &AnalysisResult, precision: usize) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Category", "Count", "Percentage"]);

    for (rank, item) in result.items.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            item.display_name.clone(),
            item.count.to_string(),
            format_percentage(item.percentage, precision),
        ]);
    }
    for idx in [0, 2, 3] {
        if let Some(column) = table.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    format!(
        "{table}\n{} rows, {} categories",
        result.total_rows, result.unique_categories
    )
}
