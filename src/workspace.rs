// Workspace: single owner of the active dataset, column and edit history
use crate::analysis::{analyze, normalize_value};
use crate::dataset::Dataset;
use crate::error::{TransformError, WorkspaceError};
use crate::history::EditHistory;
use crate::models::{AnalysisResult, CellValue, Row};
use tracing::{debug, info, warn};

/// A rowset rewrite supplied from outside the core.
///
/// The workspace only runs it and reacts to the outcome; how the function
/// was produced is not its concern.
pub trait Transform {
    fn apply(&self, rows: &[Row]) -> Result<Vec<Row>, TransformError>;
}

impl<F> Transform for F
where
    F: Fn(&[Row]) -> Result<Vec<Row>, TransformError>,
{
    fn apply(&self, rows: &[Row]) -> Result<Vec<Row>, TransformError> {
        self(rows)
    }
}

/// The state of one analysis session.
///
/// Loading a dataset, choosing a column, or a successful transform all start
/// a fresh history; there is never more than one history alive.
#[derive(Debug, Default)]
pub struct Workspace {
    dataset: Option<Dataset>,
    column: Option<String>,
    history: Option<EditHistory>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dataset. Any column selection and history are dropped.
    pub fn load(&mut self, dataset: Dataset) {
        info!("Workspace loaded '{}' ({} rows)", dataset.name, dataset.len());
        self.dataset = Some(dataset);
        self.column = None;
        self.history = None;
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.dataset = None;
        self.column = None;
        self.history = None;
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn history(&self) -> Option<&EditHistory> {
        self.history.as_ref()
    }

    /// Analyze `column` and seed a new history with the result.
    ///
    /// A column the dataset does not have is not an error; it simply
    /// produces an empty table.
    pub fn select_column(&mut self, column: &str) -> Result<AnalysisResult, WorkspaceError> {
        let dataset = self.dataset.as_ref().ok_or(WorkspaceError::NoDataset)?;
        if !dataset.has_column(column) {
            warn!("Column '{}' not found in '{}'", column, dataset.name);
        }

        let result = analyze(&dataset.rows, column);
        self.column = Some(column.to_string());
        self.history = Some(EditHistory::from_result(result.clone()));
        Ok(result)
    }

    pub fn current(&self) -> Result<AnalysisResult, WorkspaceError> {
        Ok(self.active_history()?.current())
    }

    pub fn delete_category(&mut self, display_name: &str) -> Result<AnalysisResult, WorkspaceError> {
        Ok(self.active_history_mut()?.delete_category(display_name))
    }

    pub fn undo(&mut self) -> Result<Option<AnalysisResult>, WorkspaceError> {
        Ok(self.active_history_mut()?.undo())
    }

    pub fn redo(&mut self) -> Result<Option<AnalysisResult>, WorkspaceError> {
        Ok(self.active_history_mut()?.redo())
    }

    pub fn reset_to_origin(&mut self) -> Result<AnalysisResult, WorkspaceError> {
        Ok(self.active_history_mut()?.reset_to_origin())
    }

    /// Run `transform` over the dataset.
    ///
    /// On failure nothing changes. On success the rows are replaced and, if a
    /// column is selected, it is re-analyzed with a fresh history; the new
    /// table is returned.
    pub fn apply_transform(
        &mut self,
        transform: &dyn Transform,
    ) -> Result<Option<AnalysisResult>, WorkspaceError> {
        let dataset = self.dataset.as_mut().ok_or(WorkspaceError::NoDataset)?;

        let rows = transform.apply(&dataset.rows).map_err(|e| {
            warn!("{}", e);
            WorkspaceError::from(e)
        })?;
        debug!("Transform produced {} rows (was {})", rows.len(), dataset.len());
        dataset.replace_rows(rows);

        match self.column.clone() {
            Some(column) => self.select_column(&column).map(Some),
            None => Ok(None),
        }
    }

    fn active_history(&self) -> Result<&EditHistory, WorkspaceError> {
        self.history.as_ref().ok_or(WorkspaceError::NoColumnSelected)
    }

    fn active_history_mut(&mut self) -> Result<&mut EditHistory, WorkspaceError> {
        self.history.as_mut().ok_or(WorkspaceError::NoColumnSelected)
    }
}

/// Keep rows whose `column` normalizes to the same key as `value`
pub fn keep_matching(column: &str, value: &str) -> impl Fn(&[Row]) -> Result<Vec<Row>, TransformError> {
    let column = column.to_string();
    let key = normalize_value(Some(&CellValue::String(value.to_string())));
    move |rows: &[Row]| {
        Ok(rows
            .iter()
            .filter(|row| normalize_value(row.get(&column)) == key)
            .cloned()
            .collect())
    }
}

/// Drop rows whose `column` normalizes to the same key as `value`
pub fn drop_matching(column: &str, value: &str) -> impl Fn(&[Row]) -> Result<Vec<Row>, TransformError> {
    let column = column.to_string();
    let key = normalize_value(Some(&CellValue::String(value.to_string())));
    move |rows: &[Row]| {
        Ok(rows
            .iter()
            .filter(|row| normalize_value(row.get(&column)) != key)
            .cloned()
            .collect())
    }
}

/// Rewrite every `column` value matching `from` to `to`.
/// Fails when no row has the column at all.
pub fn rename_value(
    column: &str,
    from: &str,
    to: &str,
) -> impl Fn(&[Row]) -> Result<Vec<Row>, TransformError> {
    let column = column.to_string();
    let key = normalize_value(Some(&CellValue::String(from.to_string())));
    let replacement = CellValue::String(to.to_string());
    move |rows: &[Row]| {
        if !rows.iter().any(|row| row.contains_key(&column)) {
            return Err(TransformError::new(format!("no column named '{}'", column)));
        }
        Ok(rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if normalize_value(row.get(&column)) == key {
                    row.insert(column.clone(), replacement.clone());
                }
                row
            })
            .collect())
    }
}
