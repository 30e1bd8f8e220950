// Shared data types for frequency analysis
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single raw cell. Strings, numbers, booleans and null all occur in
/// uploaded data; a key missing from the row means the cell is unset.
pub type CellValue = Value;

/// One row of the dataset, keyed by column name in header order.
pub type Row = Map<String, CellValue>;

/// One category in a frequency table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyItem {
    /// Grouping identity (trimmed, lowercased). Never displayed.
    pub normalized_key: String,
    /// Trimmed form of the first raw value seen for this key
    pub display_name: String,
    pub count: usize,
    /// Share of the owning table's total, 0-100
    pub percentage: f64,
}

impl FrequencyItem {
    pub fn new(normalized_key: String, display_name: String) -> Self {
        Self {
            normalized_key,
            display_name,
            count: 0,
            percentage: 0.0,
        }
    }
}

/// Public shape of a frequency table.
///
/// `total_rows` and `unique_categories` are always derived from `items`,
/// use [`AnalysisResult::from_items`] rather than building one by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_rows: usize,
    pub unique_categories: usize,
    pub items: Vec<FrequencyItem>,
}

impl AnalysisResult {
    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    pub fn from_items(items: Vec<FrequencyItem>) -> Self {
        Self {
            total_rows: items.iter().map(|i| i.count).sum(),
            unique_categories: items.len(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn percentage_sum(&self) -> f64 {
        self.items.iter().map(|i| i.percentage).sum()
    }

    pub fn find(&self, display_name: &str) -> Option<&FrequencyItem> {
        self.items.iter().find(|i| i.display_name == display_name)
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self::empty()
    }
}
