use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bitacora")]
#[command(about = "Personal clinical journal: notes, images, and PDF reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Owner id of the note collection
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,
}

/// Form fields settable from the command line.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldArgs {
    /// Note title (Asunto)
    #[arg(short, long)]
    pub title: Option<String>,
    /// Note body (Detalles)
    #[arg(short, long)]
    pub body: Option<String>,
    /// Entry date: YYYY-MM-DD, YYYY-MM-DD HH:MM, or RFC 3339
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,
    /// Medical area label, see `bitacora areas`
    #[arg(short, long, value_name = "AREA")]
    pub area: Option<String>,
    /// Remove the medical area
    #[arg(long, conflicts_with = "area")]
    pub clear_area: bool,
    /// Patient national ID
    #[arg(long)]
    pub dni: Option<String>,
}

impl FieldArgs {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.date.is_none()
            && self.area.is_none()
            && !self.clear_area
            && self.dni.is_none()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "add")]
    New {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// List notes, most recent first
    List {
        /// Only show notes whose title contains this text
        #[arg(short, long)]
        query: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search note titles
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a note
    Show {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Edit an existing note; opens $EDITOR on the body when no field is given
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an existing note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Upload images and attach them to a note
    Attach {
        /// Note ID or unique ID prefix
        id: String,
        /// Files to upload
        files: Vec<PathBuf>,
    },
    /// Render a note report
    Report {
        /// Note ID or unique ID prefix
        id: String,
        /// Report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Pdf)]
        format: ReportFormat,
        /// Output path (PDF defaults to a file in the current directory,
        /// text to stdout)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Export notes
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// List the medical areas
    Areas,
    /// Sync local replica with remote Turso database
    Sync,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReportFormat {
    Pdf,
    Text,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for bitacora_core::export::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
