// Interactive editing session over a workspace
use crate::cli_output::{OutputMode, OutputWriter, ResultStyle};
use crate::config::Settings;
use crate::export::{self, ExportFormat};
use crate::models::AnalysisResult;
use crate::workspace::{drop_matching, keep_matching, rename_value, Workspace};
use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Columns,
    Use(String),
    Show,
    Delete(String),
    Undo,
    Redo,
    Reset,
    Keep { column: String, value: String },
    Drop { column: String, value: String },
    Rename { column: String, from: String, to: String },
    Export(Option<PathBuf>),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub const HELP: &[(&str, &str)] = &[
    ("columns", "list columns and how many rows fill them"),
    ("use <column>", "analyze a column (starts a new history)"),
    ("show", "print the current table"),
    ("delete <category>", "remove a category from the table"),
    ("undo / redo", "step through edits"),
    ("reset", "back to the original table, forgetting all edits"),
    ("keep <column> <value>", "keep only rows where column matches value"),
    ("drop <column> <value>", "remove rows where column matches value"),
    ("rename <column> <from> <to>", "rewrite matching values"),
    ("export [path]", "write the current table as CSV"),
    ("quit", "leave the session"),
];

/// Parse one input line. Arguments containing spaces can be double-quoted;
/// the last argument of a command takes the rest of the line as-is.
pub fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim();
    if line.is_empty() {
        return SessionCommand::Empty;
    }

    let (verb, rest) = split_arg(line);
    let rest = rest.trim();
    match verb.to_lowercase().as_str() {
        "columns" | "cols" => SessionCommand::Columns,
        "show" | "ls" => SessionCommand::Show,
        "undo" | "u" => SessionCommand::Undo,
        "redo" | "r" => SessionCommand::Redo,
        "reset" => SessionCommand::Reset,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        "use" if !rest.is_empty() => SessionCommand::Use(unquote(rest)),
        "use" => SessionCommand::Invalid("usage: use <column>".to_string()),
        "delete" | "del" | "rm" if !rest.is_empty() => SessionCommand::Delete(unquote(rest)),
        "delete" | "del" | "rm" => SessionCommand::Invalid("usage: delete <category>".to_string()),
        "export" => SessionCommand::Export((!rest.is_empty()).then(|| PathBuf::from(unquote(rest)))),
        "keep" | "drop" => {
            let (column, value) = split_arg(rest);
            let value = value.trim();
            if column.is_empty() || value.is_empty() {
                return SessionCommand::Invalid(format!("usage: {} <column> <value>", verb));
            }
            let (column, value) = (column, unquote(value));
            if verb.eq_ignore_ascii_case("keep") {
                SessionCommand::Keep { column, value }
            } else {
                SessionCommand::Drop { column, value }
            }
        }
        "rename" => {
            let (column, rest) = split_arg(rest);
            let (from, to) = split_arg(rest.trim());
            let to = to.trim();
            if column.is_empty() || from.is_empty() || to.is_empty() {
                return SessionCommand::Invalid("usage: rename <column> <from> <to>".to_string());
            }
            SessionCommand::Rename {
                column,
                from,
                to: unquote(to),
            }
        }
        _ => SessionCommand::Invalid(format!("unknown command '{}'", line)),
    }
}

/// Split off the first argument, honoring double quotes
fn split_arg(s: &str) -> (String, &str) {
    let s = s.trim_start();
    if let Some(quoted) = s.strip_prefix('"') {
        if let Some(end) = quoted.find('"') {
            return (quoted[..end].to_string(), &quoted[end + 1..]);
        }
    }
    match s.find(char::is_whitespace) {
        Some(idx) => (s[..idx].to_string(), &s[idx..]),
        None => (s.to_string(), ""),
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
        .to_string()
}

/// Whether the session keeps reading after a command
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    workspace: Workspace,
    output: OutputWriter,
    settings: Settings,
}

impl Session {
    pub fn new(workspace: Workspace, output: OutputWriter, settings: Settings) -> Self {
        Self {
            workspace,
            output,
            settings,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Read commands from `input` until `quit` or end of input
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let interactive = self.output.mode() == OutputMode::Human;
        if interactive {
            self.output.info("Type 'help' for commands.");
        }

        let mut lines = input.lines();
        loop {
            if interactive {
                print!("coltally> ");
                io::stdout().flush()?;
            }
            let Some(line) = lines.next() else { break };
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    self.output.error("Input line is not valid UTF-8, ignored");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let command = parse_command(&line);
            debug!("Session command: {:?}", command);

            if let Flow::Quit = self.execute(command)? {
                break;
            }
        }
        Ok(())
    }

    /// Apply one command. Workspace errors are reported and the session goes on.
    pub fn execute(&mut self, command: SessionCommand) -> Result<Flow> {
        match command {
            SessionCommand::Empty => {}
            SessionCommand::Quit => return Ok(Flow::Quit),
            SessionCommand::Help => self.print_help(),
            SessionCommand::Invalid(message) => {
                self.output.warning(&message);
                self.output.info("Type 'help' for commands.");
            }
            SessionCommand::Columns => self.print_columns(),
            SessionCommand::Use(column) => match self.workspace.select_column(&column) {
                Ok(result) => self.print_result(&result),
                Err(e) => self.output.error(&e.to_string()),
            },
            SessionCommand::Show => match self.workspace.current() {
                Ok(result) => self.print_result(&result),
                Err(e) => self.output.error(&e.to_string()),
            },
            SessionCommand::Delete(name) => {
                let known = self
                    .workspace
                    .history()
                    .is_some_and(|history| history.contains(&name));
                match self.workspace.delete_category(&name) {
                    Ok(result) if known => self.print_result(&result),
                    Ok(_) => self
                        .output
                        .warning(&format!("No category named '{}' (names are case-sensitive)", name)),
                    Err(e) => self.output.error(&e.to_string()),
                }
            }
            SessionCommand::Undo => match self.workspace.undo() {
                Ok(Some(result)) => self.print_result(&result),
                Ok(None) => self.output.warning("Nothing to undo"),
                Err(e) => self.output.error(&e.to_string()),
            },
            SessionCommand::Redo => match self.workspace.redo() {
                Ok(Some(result)) => self.print_result(&result),
                Ok(None) => self.output.warning("Nothing to redo"),
                Err(e) => self.output.error(&e.to_string()),
            },
            SessionCommand::Reset => match self.workspace.reset_to_origin() {
                Ok(result) => self.print_result(&result),
                Err(e) => self.output.error(&e.to_string()),
            },
            SessionCommand::Keep { column, value } => {
                self.transform(&keep_matching(&column, &value), "Filtered dataset")
            }
            SessionCommand::Drop { column, value } => {
                self.transform(&drop_matching(&column, &value), "Filtered dataset")
            }
            SessionCommand::Rename { column, from, to } => {
                self.transform(&rename_value(&column, &from, &to), "Renamed values")
            }
            SessionCommand::Export(path) => self.export(path)?,
        }
        Ok(Flow::Continue)
    }

    fn transform(&mut self, transform: &dyn crate::workspace::Transform, done: &str) {
        match self.workspace.apply_transform(transform) {
            Ok(result) => {
                let rows = self.workspace.dataset().map(|d| d.len()).unwrap_or(0);
                self.output.success(&format!("{} ({} rows remain)", done, rows));
                if let Some(result) = result {
                    self.print_result(&result);
                }
            }
            Err(e) => self.output.error(&e.to_string()),
        }
    }

    fn export(&self, path: Option<PathBuf>) -> Result<()> {
        let (Some(dataset), Some(column)) = (self.workspace.dataset(), self.workspace.column())
        else {
            self.output.error("No column selected");
            return Ok(());
        };
        let path =
            path.unwrap_or_else(|| PathBuf::from(export::default_file_name(&dataset.name, column)));

        let result = self.workspace.current()?;
        match export::write(&path, &result, ExportFormat::Csv, self.settings.precision) {
            Ok(()) => self
                .output
                .success(&format!("Exported {} categories to {}", result.unique_categories, path.display())),
            Err(e) => self.output.error(&e.to_string()),
        }
        Ok(())
    }

    fn print_columns(&self) {
        let Some(dataset) = self.workspace.dataset() else {
            self.output.error("No dataset loaded");
            return;
        };
        let rows: Vec<(&str, String)> = dataset
            .columns
            .iter()
            .map(|c| (c.as_str(), format!("{} / {} rows", dataset.coverage(c), dataset.len())))
            .collect();
        self.output.section(&format!("Columns in {}", dataset.name));
        self.output.table(&rows);
    }

    fn print_result(&self, result: &AnalysisResult) {
        let title = match self.workspace.column() {
            Some(column) => format!("Frequency of '{}'", column),
            None => "Frequency".to_string(),
        };
        self.output.result(
            &title,
            result,
            ResultStyle {
                chart_width: self.settings.chart_width,
                top_n: self.settings.top_n,
                precision: self.settings.precision,
                show_chart: self.settings.show_chart,
            },
        );
        if let Some(history) = self.workspace.history() {
            self.output.history_status(history);
        }
    }

    fn print_help(&self) {
        let rows: Vec<(&str, String)> = HELP
            .iter()
            .map(|(usage, about)| (*usage, about.to_string()))
            .collect();
        self.output.section("Commands");
        self.output.table(&rows);
    }
}
