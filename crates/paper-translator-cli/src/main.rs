//! Paper Translator CLI - Translate English paper PDFs into Korean and manage
//! the translation history from the command line.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use paper_translator_core::{
    AppConfig, DeleteOutcome, ExportKind, Provider, RecordId, TranslationRecord, Workflow,
    WorkflowState, workflow_from_config,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderOption {
    Gemini,
    Openai,
}

impl From<ProviderOption> for Provider {
    fn from(opt: ProviderOption) -> Self {
        match opt {
            ProviderOption::Gemini => Self::Gemini,
            ProviderOption::Openai => Self::OpenAi,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "paper-translate")]
#[command(author, version, about = "Translate English research papers into Korean", long_about = None)]
struct Args {
    /// Translation history database (default: ~/.local/share/paper-translator/translations.db)
    #[arg(long, global = true, env = "PAPER_TRANSLATOR_DB")]
    db: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Translation API provider
    #[arg(long, global = true, value_enum)]
    provider: Option<ProviderOption>,

    /// API base URL (default depends on the provider)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// API key (default: GOOGLE_API_KEY or OPENAI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Translate in chunks of at most this many characters
    #[arg(long, global = true)]
    max_chunk_chars: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract, translate and save a PDF
    Translate {
        /// Input PDF file
        input: PathBuf,

        /// Also write both Markdown exports into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List saved translations, newest first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a saved translation
    Show {
        id: RecordId,

        /// Print the original English text instead
        #[arg(long)]
        original: bool,
    },

    /// Write a Markdown export of a saved translation
    Export {
        id: RecordId,

        /// Original followed by the translation
        #[arg(long)]
        combined: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Change the title of a saved translation
    Rename { id: RecordId, title: String },

    /// Delete a saved translation
    Delete {
        id: RecordId,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },

    /// Write the stored original PDF back to disk
    Pdf {
        id: RecordId,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// `list --json` row. The PDF itself is left out.
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    id: RecordId,
    title: &'a str,
    created_at: String,
    updated_at: String,
    has_pdf: bool,
}

impl<'a> From<&'a TranslationRecord> for ListEntry<'a> {
    fn from(record: &'a TranslationRecord) -> Self {
        Self {
            id: record.id,
            title: &record.title,
            created_at: record.created_at.format(TIME_FORMAT).to_string(),
            updated_at: record.updated_at.format(TIME_FORMAT).to_string(),
            has_pdf: record.has_pdf(),
        }
    }
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    if let Some(provider) = args.provider {
        config.translator.provider = provider.into();
    }
    if let Some(api_base) = &args.api_base {
        config.translator.api_base = Some(api_base.clone());
    }
    if let Some(api_key) = &args.api_key {
        config.translator.api_key = Some(api_key.clone());
    }
    if let Some(model) = &args.model {
        config.translator.model = Some(model.clone());
    }
    if args.max_chunk_chars.is_some() {
        config.translator.max_chunk_chars = args.max_chunk_chars;
    }
    if let Some(db) = &args.db {
        config.store.path = Some(db.clone());
    }

    Ok(config)
}

fn get_record(workflow: &Workflow, id: RecordId) -> Result<TranslationRecord> {
    workflow
        .store()
        .get(id)
        .context("Failed to read translation history")?
        .with_context(|| format!("No translation with id {id}"))
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    std::fs::write(path, contents).context(format!("Failed to write {}", path.display()))
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

async fn translate(workflow: &Workflow, input: &Path, output_dir: Option<&Path>) -> Result<()> {
    info!("Loading PDF: {}", input.display());
    let bytes =
        std::fs::read(input).context(format!("Failed to read PDF: {}", input.display()))?;

    let mut state = WorkflowState::new();
    workflow
        .upload(&mut state, bytes)
        .context(format!("Failed to extract text from {}", input.display()))?;
    info!("Extracted {} chars", state.original_text.len());

    let pb = spinner("Translating...");
    let result = workflow.translate(&mut state).await;
    pb.finish_and_clear();
    let saved = result.context("Translation failed")?;

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).context(format!("Failed to create {}", dir.display()))?;
        for kind in [ExportKind::Translation, ExportKind::Combined] {
            let path = dir.join(kind.file_name());
            write_file(&path, kind.render(&state.original_text, &state.translated_text))?;
            info!("Wrote {}", path.display());
        }
    }

    #[allow(clippy::print_stdout)]
    {
        println!("Saved translation {}: {}", saved.id, saved.title);
        if !saved.pdf_stored {
            println!("Note: the original PDF was not stored");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn list(workflow: &Workflow, json: bool) -> Result<()> {
    let records = workflow.history().context("Failed to read translation history")?;

    if json {
        let entries: Vec<ListEntry<'_>> = records.iter().map(ListEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No saved translations");
        return Ok(());
    }
    for record in &records {
        println!(
            "{:>5}  {}  {}{}",
            record.id,
            record.created_at.format(TIME_FORMAT),
            record.title,
            if record.has_pdf() { "" } else { "  (no PDF)" }
        );
    }
    let total = workflow.store().count().context("Failed to count translations")?;
    println!("\n{total} saved translation(s)");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn delete(workflow: &Workflow, id: RecordId, yes: bool) -> Result<()> {
    println!("{}", delete_message(workflow, id, yes)?);
    Ok(())
}

/// Run the two-step delete, confirming at once with `yes`. An id that is
/// already gone is reported, not an error.
fn delete_message(workflow: &Workflow, id: RecordId, yes: bool) -> Result<String> {
    let title = workflow
        .store()
        .get(id)
        .context("Failed to read translation history")?
        .map(|record| record.title);
    let mut state = WorkflowState::new();

    let mut outcome = workflow.request_delete(&mut state, id)?;
    if outcome == DeleteOutcome::ConfirmPending {
        if !yes {
            let Some(title) = title else {
                return Ok(format!("Translation {id} does not exist, nothing to delete"));
            };
            return Ok(format!(
                "Delete translation {id} \"{title}\"? Run again with --yes to confirm."
            ));
        }
        outcome = workflow.request_delete(&mut state, id)?;
    }

    Ok(match outcome {
        DeleteOutcome::Deleted { .. } => match title {
            Some(title) => format!("Deleted translation {id} \"{title}\""),
            None => format!("Deleted translation {id}"),
        },
        DeleteOutcome::NotFound => format!("Translation {id} was already deleted"),
        DeleteOutcome::ConfirmPending => String::new(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let workflow =
        workflow_from_config(&config).context("Failed to initialize translation workflow")?;

    match args.command {
        Command::Translate { input, output_dir } => {
            translate(&workflow, &input, output_dir.as_deref()).await?;
        }
        Command::List { json } => list(&workflow, json)?,
        Command::Show { id, original } => {
            let record = get_record(&workflow, id)?;
            let text = if original {
                &record.original_text
            } else {
                &record.translated_text
            };
            #[allow(clippy::print_stdout)]
            {
                println!("{text}");
            }
        }
        Command::Export {
            id,
            combined,
            output,
        } => {
            let record = get_record(&workflow, id)?;
            let kind = if combined {
                ExportKind::Combined
            } else {
                ExportKind::Translation
            };
            let markdown = kind.render(&record.original_text, &record.translated_text);
            match output {
                Some(path) => {
                    write_file(&path, markdown)?;
                    info!("Wrote {}", path.display());
                }
                #[allow(clippy::print_stdout)]
                None => print!("{markdown}"),
            }
        }
        Command::Rename { id, title } => {
            if !workflow.rename(id, &title)? {
                bail!("Translation {id} not renamed (unknown id or blank title)");
            }
            info!("Renamed translation {} to {:?}", id, title.trim());
        }
        Command::Delete { id, yes } => delete(&workflow, id, yes)?,
        Command::Pdf { id, output } => {
            let record = get_record(&workflow, id)?;
            let bytes = record
                .decode_pdf()
                .context("Stored PDF is corrupt")?
                .with_context(|| format!("Translation {id} has no stored PDF"))?;
            write_file(&output, bytes)?;
            #[allow(clippy::print_stdout)]
            {
                println!("PDF saved to: {}", output.display());
            }
        }
    }

    Ok(())
}
