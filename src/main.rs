use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use coltally::cli_output::{OutputMode, OutputWriter, ResultStyle};
use coltally::config::Settings;
use coltally::dataset::Dataset;
use coltally::export::{self, ExportFormat};
use coltally::session::Session;
use coltally::workspace::Workspace;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "coltally")]
#[command(about = "Frequency breakdowns of spreadsheet columns", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the columns of a file and how many rows fill each
    Columns {
        /// CSV, TSV, JSON or JSON Lines file
        file: PathBuf,
    },

    /// Print the frequency table of one column
    Analyze {
        /// CSV, TSV, JSON or JSON Lines file
        file: PathBuf,

        /// Column to analyze
        #[arg(short, long)]
        column: String,

        /// Remove a category before printing (repeatable, exact display name)
        #[arg(short, long)]
        delete: Vec<String>,

        /// Output format (table, csv, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write the table to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of categories shown in the chart
        #[arg(long)]
        top: Option<usize>,

        /// Skip the bar chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Interactive session: delete categories, undo, redo, export
    Session {
        /// CSV, TSV, JSON or JSON Lines file
        file: PathBuf,

        /// Column to start with
        #[arg(short, long)]
        column: Option<String>,
    },

    /// Inspect or create the settings file
    Config {
        /// Action: show, path, init
        #[arg(default_value = "show")]
        action: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging (stderr, so exports on stdout stay clean)
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Columns { file } => {
            let dataset = Dataset::load(&file)?;
            let output = OutputWriter::auto();

            output.section(&format!("Columns in {}", dataset.name));
            let rows: Vec<(&str, String)> = dataset
                .columns
                .iter()
                .map(|c| (c.as_str(), format!("{} / {} rows", dataset.coverage(c), dataset.len())))
                .collect();
            output.table(&rows);
            Ok(())
        }

        Commands::Analyze {
            file,
            column,
            delete,
            format,
            output: output_path,
            top,
            no_chart,
        } => {
            let settings = Settings::load()?;
            let format = match format {
                Some(f) => f.parse::<ExportFormat>()?,
                None if output_path.is_some() => ExportFormat::Csv,
                None => settings.default_format,
            };

            let mut workspace = Workspace::new();
            workspace.load(Dataset::load(&file)?);
            workspace.select_column(&column)?;

            let output = OutputWriter::auto();
            for name in &delete {
                let known = workspace.history().is_some_and(|h| h.contains(name));
                if !known {
                    output.warning(&format!("No category named '{}'", name));
                }
                workspace.delete_category(name)?;
            }
            let result = workspace.current()?;

            if let Some(path) = output_path {
                export::write(&path, &result, format, settings.precision)?;
                output.success(&format!(
                    "Wrote {} categories to {}",
                    result.unique_categories,
                    path.display()
                ));
                return Ok(());
            }

            match format {
                ExportFormat::Table if output.mode() != OutputMode::Json => {
                    output.result(
                        &format!("Frequency of '{}'", column),
                        &result,
                        ResultStyle {
                            chart_width: settings.chart_width,
                            top_n: top.or(settings.top_n),
                            precision: settings.precision,
                            show_chart: settings.show_chart && !no_chart,
                        },
                    );
                    println!();
                    println!("{}", export::render(&result, format, settings.precision)?);
                }
                ExportFormat::Table => println!("{}", serde_json::to_string(&result)?),
                _ => print!("{}", export::render(&result, format, settings.precision)?),
            }
            Ok(())
        }

        Commands::Session { file, column } => {
            info!("Starting session on {}", file.display());
            let settings = Settings::load()?;
            let mut workspace = Workspace::new();
            workspace.load(Dataset::load(&file)?);

            let mut session = Session::new(workspace, OutputWriter::auto(), settings);
            if let Some(column) = column {
                session.execute(coltally::session::SessionCommand::Use(column))?;
            }
            session.run(io::stdin().lock())
        }

        Commands::Config { action } => {
            let path = Settings::config_file_path()?;
            config_command(&action, &path, &OutputWriter::auto())
        }
    }
}

/// `config show|path|init` against the settings file at `path`.
/// Only `show` reads the file.
fn config_command(action: &str, path: &Path, output: &OutputWriter) -> Result<()> {
    match action {
        "show" => {
            let settings = Settings::load_from(path)?;
            output.section("Settings");
            output.table(&[
                ("default_format", settings.default_format.to_string()),
                ("chart_width", settings.chart_width.to_string()),
                (
                    "top_n",
                    settings
                        .top_n
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "all".to_string()),
                ),
                ("precision", settings.precision.to_string()),
                ("show_chart", settings.show_chart.to_string()),
                ("file", path.display().to_string()),
            ]);
            Ok(())
        }
        "path" => {
            println!("{}", path.display());
            Ok(())
        }
        "init" => {
            if path.exists() {
                output.warning(&format!("{} already exists", path.display()));
            } else {
                Settings::default().save_to(path)?;
                output.success(&format!("Wrote defaults to {}", path.display()));
            }
            Ok(())
        }
        other => Err(anyhow!("Unknown config action: {}. Supported: show, path, init", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_broken_settings_file_only_blocks_show() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let output = OutputWriter::new(OutputMode::Plain);

        assert!(config_command("path", &path, &output).is_ok());
        assert!(config_command("init", &path, &output).is_ok());
        assert!(config_command("show", &path, &output).is_err());
    }

    #[test]
    fn test_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let output = OutputWriter::new(OutputMode::Plain);

        config_command("init", &path, &output).unwrap();
        assert!(path.exists());
        assert!(config_command("show", &path, &output).is_ok());
        assert!(config_command("frobnicate", &path, &output).is_err());
    }
}
