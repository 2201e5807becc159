use clap::{Parser, Subcommand};

use formbuilder::models::SubmissionId;

#[derive(Parser)]
#[command(name = "formbuilder")]
#[command(about = "Terminal form builder with live preview and locally saved submissions")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides FORMBUILDER_DB_PATH)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive builder (default)
    Tui,

    /// List saved submissions, newest first
    List {
        /// Maximum number of submissions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Print one submission: title, timestamp and each answer
    Show {
        /// Submission id
        id: SubmissionId,
    },

    /// Use a submission's fields as the template for the next new form
    Template {
        /// Submission id
        id: SubmissionId,
    },

    /// Delete all saved submissions
    Clear,
}
