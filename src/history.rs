// Undo/redo history over frequency-table snapshots
use crate::analysis::recompute_percentages;
use crate::models::{AnalysisResult, FrequencyItem};
use tracing::debug;

type Snapshot = Vec<FrequencyItem>;

/// Linear edit history for one (dataset, column) analysis.
///
/// Snapshots live in a vector with a cursor pointing at the active one.
/// Index 0 is the origin and keeps the percentages it was created with.
/// A new edit made after an undo discards everything past the cursor.
#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl EditHistory {
    pub fn new(initial: Vec<FrequencyItem>) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    pub fn from_result(result: AnalysisResult) -> Self {
        Self::new(result.items)
    }

    /// Discard all history and start over from `initial`
    pub fn init(&mut self, initial: &[FrequencyItem]) {
        self.snapshots = vec![initial.to_vec()];
        self.cursor = 0;
    }

    /// Remove the category named `display_name` from the active snapshot.
    ///
    /// A name not present in the active snapshot leaves the history
    /// untouched, including any redo branch.
    pub fn delete_category(&mut self, display_name: &str) -> AnalysisResult {
        if !self.contains(display_name) {
            debug!("Delete of unknown category '{}' ignored", display_name);
            return self.current();
        }

        let mut next: Snapshot = self
            .active()
            .iter()
            .filter(|item| item.display_name != display_name)
            .cloned()
            .collect();
        recompute_percentages(&mut next);

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(next);
        self.cursor += 1;

        debug!(
            "Deleted '{}', history now {} snapshots",
            display_name,
            self.snapshots.len()
        );
        self.current()
    }

    /// Step back one snapshot. `None` when already at the origin.
    pub fn undo(&mut self) -> Option<AnalysisResult> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one snapshot. `None` when already at the newest.
    pub fn redo(&mut self) -> Option<AnalysisResult> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Go back to the origin and forget every edit. Cannot be redone.
    pub fn reset_to_origin(&mut self) -> AnalysisResult {
        self.snapshots.truncate(1);
        self.cursor = 0;
        self.current()
    }

    pub fn current(&self) -> AnalysisResult {
        AnalysisResult::from_items(self.active().to_vec())
    }

    pub fn origin(&self) -> AnalysisResult {
        AnalysisResult::from_items(self.snapshots[0].clone())
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.active()
            .iter()
            .any(|item| item.display_name == display_name)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of snapshots, origin included. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn active(&self) -> &[FrequencyItem] {
        &self.snapshots[self.cursor]
    }
}
