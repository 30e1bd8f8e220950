// Dataset loading: CSV/TSV and JSON files into rows
use crate::error::DatasetError;
use crate::models::{CellValue, Row};
use indexmap::IndexSet;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows of one uploaded file together with its inferred header
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Columns are inferred as the union of row keys in first-seen order
    pub fn from_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        let columns = infer_columns(&rows);
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Load a file, picking the parser from its extension
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());

        let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = match extension.as_str() {
            "csv" => Self::parse_csv(name, &content, b',')?,
            "tsv" => Self::parse_csv(name, &content, b'\t')?,
            "json" => Self::parse_json(name, &content)?,
            "jsonl" | "ndjson" => Self::parse_json_lines(name, &content)?,
            other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
        };

        info!(
            "Loaded {} rows, {} columns from {}",
            dataset.rows.len(),
            dataset.columns.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parse delimited text with a header row.
    ///
    /// Records may be shorter or longer than the header; extra fields are
    /// dropped and empty fields are left unset.
    pub fn parse_csv(
        name: impl Into<String>,
        content: &str,
        delimiter: u8,
    ) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .trim(csv::Trim::All)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let raw_headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if raw_headers.is_empty() {
            return Err(DatasetError::NoHeaders);
        }
        let headers = header_names(&raw_headers);

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (line, result) in reader.records().enumerate() {
            match result {
                Ok(record) => {
                    let mut row = Row::new();
                    for (header, field) in headers.iter().zip(record.iter()) {
                        if !field.is_empty() {
                            row.insert(header.clone(), Value::String(field.to_string()));
                        }
                    }
                    rows.push(row);
                }
                Err(e) => {
                    skipped += 1;
                    // +2: 1-based and the header line
                    warn!("Skipping malformed record {}: {}", line + 2, e);
                }
            }
        }
        if skipped > 0 {
            debug!("{} malformed records skipped", skipped);
        }

        Ok(Self {
            name: name.into(),
            columns: headers,
            rows,
        })
    }

    /// Parse a JSON array of objects; non-object entries are skipped
    pub fn parse_json(name: impl Into<String>, content: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Array(entries) = value else {
            return Err(DatasetError::NotAnArray);
        };

        let rows = entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| into_row(entry, idx + 1))
            .collect();

        Ok(Self::from_rows(name, rows))
    }

    /// Parse one JSON object per line; blank and malformed lines are skipped
    pub fn parse_json_lines(name: impl Into<String>, content: &str) -> Result<Self, DatasetError> {
        let mut rows = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(entry) => rows.extend(into_row(entry, idx + 1)),
                Err(e) => warn!("Skipping malformed line {}: {}", idx + 1, e),
            }
        }
        Ok(Self::from_rows(name, rows))
    }

    /// Swap in a new rowset, re-deriving the column list
    pub fn replace_rows(&mut self, rows: Vec<Row>) {
        self.columns = infer_columns(&rows);
        self.rows = rows;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of rows with a non-blank value in `column`
    pub fn coverage(&self, column: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| !crate::analysis::normalize_value(row.get(column)).is_empty())
            .count()
    }
}

fn into_row(entry: CellValue, position: usize) -> Option<Row> {
    match entry {
        Value::Object(map) => Some(map),
        other => {
            warn!("Skipping entry {}: expected an object, got {}", position, kind(&other));
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn infer_columns(rows: &[Row]) -> Vec<String> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    for row in rows {
        for key in row.keys() {
            seen.insert(key.as_str());
        }
    }
    seen.into_iter().map(str::to_string).collect()
}

/// Blank headers become `Column N`; repeats get a ` (2)`, ` (3)` suffix
fn header_names(raw: &[String]) -> Vec<String> {
    let mut taken: IndexSet<String> = IndexSet::new();
    for (idx, header) in raw.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            header.clone()
        };

        let mut candidate = base.clone();
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = format!("{} ({})", base, n);
            n += 1;
        }
        taken.insert(candidate);
    }
    taken.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_csv() {
        let content = "name, color\nann,Red\nbob , \ncid,blue,extra\ndee\n";
        let dataset = Dataset::parse_csv("people.csv", content, b',').unwrap();

        assert_eq!(dataset.columns, vec!["name", "color"]);
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.rows[0]["color"], Value::String("Red".into()));
        assert!(dataset.rows[1].get("color").is_none());
        assert_eq!(dataset.rows[2].len(), 2);
        assert!(dataset.rows[3].get("color").is_none());
        assert_eq!(dataset.coverage("color"), 2);
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let content = "a,,a,a\n1,2,3,4\n";
        let dataset = Dataset::parse_csv("x.csv", content, b',').unwrap();
        assert_eq!(dataset.columns, vec!["a", "Column 2", "a (2)", "a (3)"]);
        assert_eq!(dataset.rows[0]["a (3)"], Value::String("4".into()));
    }

    #[test]
    fn test_empty_csv_has_no_headers() {
        assert!(matches!(
            Dataset::parse_csv("x.csv", "", b','),
            Err(DatasetError::NoHeaders)
        ));
    }

    #[test]
    fn test_parse_json() {
        let content = r#"[{"fruit": "apple", "n": 1}, 7, {"fruit": "pear", "kind": null}]"#;
        let dataset = Dataset::parse_json("f.json", content).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.columns, vec!["fruit", "n", "kind"]);
        assert_eq!(dataset.coverage("kind"), 0);

        assert!(matches!(
            Dataset::parse_json("f.json", r#"{"a": 1}"#),
            Err(DatasetError::NotAnArray)
        ));
    }

    #[test]
    fn test_parse_json_lines() {
        let content = "{\"a\": \"x\"}\n\nnot json\n{\"b\": 2}\n";
        let dataset = Dataset::parse_json_lines("f.jsonl", content).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.columns, vec!["a", "b"]);
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let tsv = dir.path().join("data.TSV");
        let mut file = fs::File::create(&tsv).unwrap();
        writeln!(file, "k\tv\nx\t1\ny\t2").unwrap();
        let dataset = Dataset::load(&tsv).unwrap();
        assert_eq!(dataset.name, "data.TSV");
        assert_eq!(dataset.columns, vec!["k", "v"]);
        assert_eq!(dataset.len(), 2);

        let xls = dir.path().join("data.xls");
        fs::write(&xls, "whatever").unwrap();
        assert!(matches!(
            Dataset::load(&xls),
            Err(DatasetError::UnsupportedFormat(ext)) if ext == "xls"
        ));

        assert!(matches!(
            Dataset::load(&dir.path().join("missing.csv")),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_replace_rows_reinfers_columns() {
        let mut dataset = Dataset::parse_csv("x.csv", "a,b\n1,2\n", b',').unwrap();
        let mut row = Row::new();
        row.insert("z".into(), Value::from(1));
        dataset.replace_rows(vec![row]);
        assert_eq!(dataset.columns, vec!["z"]);
        assert!(dataset.has_column("z"));
        assert!(!dataset.has_column("a"));
    }
}
