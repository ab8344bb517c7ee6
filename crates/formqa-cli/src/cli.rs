use clap::{Parser, Subcommand};
use formqa_core::config::BackendKind;
use formqa_core::models::TaskMode;
use std::path::PathBuf;

/// FormQA - Question answering over insurance form spreadsheets
#[derive(Parser, Debug)]
#[command(name = "formqa")]
#[command(about = "Question answering over insurance form spreadsheets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./formqa.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Retrieval backend to use (overrides configuration)
    #[arg(long, global = true)]
    pub backend: Option<BackendArg>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Retrieval backend selection
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum BackendArg {
    /// Embed rows locally and answer with Azure OpenAI chat
    Local,
    /// Upload the corpus to the hosted vector store and ask its QA endpoint
    Hosted,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Local => BackendKind::Local,
            BackendArg::Hosted => BackendKind::Hosted,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten a spreadsheet into the text corpus
    Convert(ConvertArgs),

    /// Upload a spreadsheet's corpus to the hosted vector store
    Upload(UploadArgs),

    /// Ask a question about a spreadsheet
    Ask(AskArgs),

    /// Show the resolved configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Spreadsheet to convert (xlsx, xlsm, xls, xlsb, ods)
    pub path: PathBuf,

    /// Output file for the corpus
    #[arg(long, short = 'o', default_value = "converted.txt")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Spreadsheet to upload
    pub path: PathBuf,

    /// Target vector store (overrides configuration)
    #[arg(long)]
    pub store_id: Option<String>,
}

/// Answer mode selection
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ModeArg {
    /// Pick from the wording of the question
    #[default]
    Auto,
    /// Plain prose answer
    Free,
    /// JSON record exported to a spreadsheet
    Structured,
}

impl ModeArg {
    pub fn task_mode(self) -> Option<TaskMode> {
        match self {
            ModeArg::Auto => None,
            ModeArg::Free => Some(TaskMode::FreeForm),
            ModeArg::Structured => Some(TaskMode::Structured),
        }
    }
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Spreadsheet to answer from
    pub path: PathBuf,

    /// The question (prompted for when omitted)
    pub question: Option<String>,

    /// Answer mode
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    pub mode: ModeArg,

    /// Number of rows to retrieve as context (overrides configuration)
    #[arg(long, short = 'k')]
    pub top_k: Option<usize>,

    /// Directory for exported record workbooks
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Export every JSON object in a structured reply instead of the first
    #[arg(long)]
    pub all_records: bool,

    /// Keep asking questions against the same index
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Hosted backend only: reuse the corpus already in the store
    #[arg(long)]
    pub skip_upload: bool,

    /// Target vector store (overrides configuration)
    #[arg(long)]
    pub store_id: Option<String>,
}
