//! ASCII bar chart for frequency tables.
//!
//! One row per category: a colored bullet, the label with count and share,
//! and a bar scaled against the table total. Long tables are cut at `top_n`
//! with a summary line for the remainder.

use crate::export::format_percentage;
use crate::models::AnalysisResult;
use colored::Colorize;

/// Color palette cycled across bars
const COLORS: [&str; 6] = ["cyan", "magenta", "yellow", "green", "blue", "red"];

const BAR_FULL: &str = "█";
const BAR_EMPTY: &str = "░";

#[derive(Clone, Debug)]
pub struct BarItem {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
    pub color: &'static str,
}

pub struct BarChart {
    pub title: String,
    pub items: Vec<BarItem>,
    pub width: usize,
    pub precision: usize,
    /// Categories and rows left out by `top_n`
    pub hidden: Option<(usize, usize, f64)>,
}

impl BarChart {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
            width: 40,
            precision: 1,
            hidden: None,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Chart the first `top_n` items of `result` (all of them when `None`)
    pub fn from_result(title: &str, result: &AnalysisResult, top_n: Option<usize>) -> Self {
        let mut chart = Self::new(title);
        let shown = top_n.unwrap_or(result.items.len()).min(result.items.len());

        for (idx, item) in result.items.iter().take(shown).enumerate() {
            chart.items.push(BarItem {
                label: item.display_name.clone(),
                count: item.count,
                percentage: item.percentage,
                color: COLORS[idx % COLORS.len()],
            });
        }

        let rest = &result.items[shown..];
        if !rest.is_empty() {
            chart.hidden = Some((
                rest.len(),
                rest.iter().map(|i| i.count).sum(),
                rest.iter().map(|i| i.percentage).sum(),
            ));
        }
        chart
    }

    pub fn render(&self) -> String {
        let mut output = String::new();

        if !self.title.is_empty() {
            output.push_str(&format!("  {}\n\n", self.title.bold()));
        }

        if self.items.is_empty() && self.hidden.is_none() {
            output.push_str("  No data available\n");
            return output;
        }

        let max_label_len = self
            .items
            .iter()
            .map(|i| i.label.chars().count())
            .max()
            .unwrap_or(10);

        for item in &self.items {
            let filled = filled_cells(item.percentage, self.width);
            let bar = format!(
                "{}{}",
                BAR_FULL.repeat(filled),
                BAR_EMPTY.repeat(self.width - filled)
            );

            output.push_str(&format!(
                "  {} {:width$} {:>6} ({})\n",
                colorize("●", item.color),
                item.label,
                item.count,
                format_percentage(item.percentage, self.precision),
                width = max_label_len
            ));
            output.push_str(&format!("    {}\n", colorize(&bar, item.color)));
        }

        if let Some((categories, rows, percentage)) = self.hidden {
            let note = format!(
                "… {} more categories, {} rows ({})",
                categories,
                rows,
                format_percentage(percentage, self.precision)
            );
            output.push_str(&format!("  {}\n", note.dimmed()));
        }

        output
    }
}

fn filled_cells(percentage: f64, width: usize) -> usize {
    (((percentage / 100.0) * width as f64).round() as usize).min(width)
}

fn colorize(text: &str, color: &str) -> colored::ColoredString {
    match color {
        "cyan" => text.cyan(),
        "magenta" => text.magenta(),
        "yellow" => text.yellow(),
        "green" => text.green(),
        "blue" => text.blue(),
        "red" => text.red(),
        _ => text.white(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrequencyItem;

    fn result(counts: &[(&str, usize)]) -> AnalysisResult {
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        AnalysisResult::from_items(
            counts
                .iter()
                .map(|(name, count)| FrequencyItem {
                    normalized_key: name.to_lowercase(),
                    display_name: name.to_string(),
                    count: *count,
                    percentage: *count as f64 / total as f64 * 100.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_bar_chart() {
        let chart = BarChart::from_result("Colors", &result(&[("Red", 3), ("Blue", 1)]), None);
        let rendered = chart.render();
        assert!(rendered.contains("Red"));
        assert!(rendered.contains("75.0%"));
        assert!(rendered.contains("25.0%"));
        assert!(!rendered.contains("more categories"));
    }

    #[test]
    fn test_top_n_summarises_the_rest() {
        let chart = BarChart::from_result(
            "",
            &result(&[("a", 4), ("b", 3), ("c", 2), ("d", 1)]),
            Some(2),
        );
        assert_eq!(chart.items.len(), 2);
        assert_eq!(chart.hidden.map(|(n, rows, _)| (n, rows)), Some((2, 3)));
        assert!(chart.render().contains("2 more categories, 3 rows (30.0%)"));
    }

    #[test]
    fn test_top_zero_summarises_everything() {
        let chart = BarChart::from_result("", &result(&[("a", 3)]), Some(0));
        assert!(chart.items.is_empty());
        let rendered = chart.render();
        assert!(!rendered.contains("No data available"));
        assert!(rendered.contains("1 more categories, 3 rows (100.0%)"));
    }

    #[test]
    fn test_empty_chart() {
        let chart = BarChart::from_result("Empty", &AnalysisResult::empty(), Some(5));
        assert!(chart.render().contains("No data available"));
    }

    #[test]
    fn test_filled_cells() {
        assert_eq!(filled_cells(100.0, 20), 20);
        assert_eq!(filled_cells(50.0, 20), 10);
        assert_eq!(filled_cells(0.0, 20), 0);
    }
}
