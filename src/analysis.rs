// Frequency analysis of a single dataset column
use crate::models::*;
use indexmap::IndexMap;
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use tracing::debug;

/// Build the frequency table for `column`.
///
/// Rows without the column, or whose value is blank once trimmed, are not
/// counted. Values are grouped case- and whitespace-insensitively; each
/// category keeps the trimmed spelling of its first occurrence. Items come
/// back sorted by count (descending), then display name.
pub fn analyze(rows: &[Row], column: &str) -> AnalysisResult {
    let mut tallies: IndexMap<String, FrequencyItem> = IndexMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let Some(raw) = row.get(column) else {
            skipped += 1;
            continue;
        };

        let display = display_value(raw);
        if display.is_empty() {
            skipped += 1;
            continue;
        }

        let key = display.to_lowercase();
        tallies
            .entry(key)
            .or_insert_with_key(|key| FrequencyItem::new(key.clone(), display))
            .count += 1;
    }

    let mut items: Vec<FrequencyItem> = tallies.into_values().collect();
    recompute_percentages(&mut items);
    sort_items(&mut items);

    let result = AnalysisResult::from_items(items);
    debug!(
        "Analyzed column '{}': {} rows counted, {} skipped, {} categories",
        column, result.total_rows, skipped, result.unique_categories
    );
    result
}

/// Grouping key for a raw value: stringified, trimmed, lowercased.
/// Null and unset both normalize to the empty string.
pub fn normalize_value(value: Option<&CellValue>) -> String {
    value
        .map(|v| display_value(v).to_lowercase())
        .unwrap_or_default()
}

/// Trimmed string form of a raw value, casing untouched
pub fn display_value(value: &CellValue) -> String {
    stringify(value).trim().to_string()
}

fn stringify(value: &CellValue) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        // Shortest decimal form, so 5, 5.0 and "5" land in the same bucket
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cow::Owned(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Cow::Owned(u.to_string())
            } else {
                // -0.0 prints as "-0"; fold it onto 0
                let float = |f: f64| if f == 0.0 { 0.0 } else { f };
                Cow::Owned(n.as_f64().map(|f| float(f).to_string()).unwrap_or_default())
            }
        }
        Value::Array(_) | Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

/// `count / total * 100`, or 0 for an empty table
pub fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Recompute every percentage against the sum of the given counts
pub fn recompute_percentages(items: &mut [FrequencyItem]) {
    let total: usize = items.iter().map(|i| i.count).sum();
    for item in items.iter_mut() {
        item.percentage = percentage_of(item.count, total);
    }
}

pub fn sort_items(items: &mut [FrequencyItem]) {
    items.sort_by(compare_items);
}

fn compare_items(a: &FrequencyItem, b: &FrequencyItem) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| compare_display_names(&a.display_name, &b.display_name))
}

// Case-insensitive first, bytes as the tiebreak so only identical names are equal
fn compare_display_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| {
                let mut row = Row::new();
                row.insert("c".to_string(), v);
                row
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(analyze(&[], "c"), AnalysisResult::empty());

        let mut row = Row::new();
        row.insert("other".to_string(), json!("x"));
        let result = analyze(&[row.clone(), row], "c");
        assert_eq!(result.total_rows, 0);
        assert_eq!(result.unique_categories, 0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_normalization_equivalence() {
        let result = analyze(&rows(vec![json!("  Red "), json!("red"), json!("RED")]), "c");
        assert_eq!(result.unique_categories, 1);
        let item = &result.items[0];
        assert_eq!(item.count, 3);
        assert_eq!(item.display_name, "Red");
        assert_eq!(item.normalized_key, "red");
        assert_eq!(item.percentage, 100.0);
    }

    #[test]
    fn test_tie_break_is_alphabetical() {
        let result = analyze(
            &rows(vec![json!("B"), json!("A"), json!("B"), json!("A")]),
            "c",
        );
        let names: Vec<_> = result.items.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(result.items.iter().all(|i| i.count == 2 && i.percentage == 50.0));
    }

    #[test]
    fn test_sorted_by_count_descending() {
        let result = analyze(
            &rows(vec![json!("b"), json!("a"), json!("c"), json!("c"), json!("c"), json!("a")]),
            "c",
        );
        let counts: Vec<_> = result.items.iter().map(|i| i.count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
        assert_eq!(result.items[0].display_name, "c");
    }

    #[test]
    fn test_blank_and_null_cells_are_skipped() {
        let result = analyze(
            &rows(vec![json!("   "), json!(null), json!(""), json!("x")]),
            "c",
        );
        assert_eq!(result.total_rows, 1);
        assert_eq!(result.items[0].percentage, 100.0);
    }

    #[test]
    fn test_numbers_and_strings_share_a_key() {
        let result = analyze(&rows(vec![json!(5), json!("5"), json!(5.0), json!(" 5 ")]), "c");
        assert_eq!(result.unique_categories, 1);
        assert_eq!(result.items[0].count, 4);
        assert_eq!(result.items[0].display_name, "5");
    }

    #[test]
    fn test_negative_zero_shares_the_zero_key() {
        let result = analyze(&rows(vec![json!(0), json!(-0.0), json!("0")]), "c");
        assert_eq!(result.unique_categories, 1);
        assert_eq!(result.items[0].display_name, "0");
        assert_eq!(result.items[0].count, 3);
    }

    #[test]
    fn test_first_display_name_wins() {
        let result = analyze(&rows(vec![json!("apple "), json!("APPLE"), json!("Apple")]), "c");
        assert_eq!(result.items[0].display_name, "apple");
    }

    #[test]
    fn test_percentage_conservation() {
        let values: Vec<Value> = (0..97).map(|i| json!(format!("v{}", i % 7))).collect();
        let result = analyze(&rows(values), "c");
        let sum = result.percentage_sum();
        assert!((99.999..=100.001).contains(&sum), "sum was {}", sum);
        assert_eq!(result.total_rows, 97);
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(None), "");
        assert_eq!(normalize_value(Some(&json!(null))), "");
        assert_eq!(normalize_value(Some(&json!("  MiXeD "))), "mixed");
        assert_eq!(normalize_value(Some(&json!(true))), "true");
        assert_eq!(normalize_value(Some(&json!(2.5))), "2.5");
    }

    #[test]
    fn test_display_name_ordering_is_total() {
        assert_eq!(compare_display_names("a", "B"), Ordering::Less);
        assert_eq!(compare_display_names("B", "b"), Ordering::Less);
        assert_eq!(compare_display_names("b", "b"), Ordering::Equal);
    }
}
