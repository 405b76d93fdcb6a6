use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dlrename_core::{AppConfig, NameStyle};

#[derive(Debug, Parser)]
#[command(name = "dlrename")]
#[command(about = "Rename purchase folders after their titles from a CSV export", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Plan and apply folder renames and purchase-date timestamps
    Rename(RenameArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Directory containing the folders to rename
    pub directory: PathBuf,

    /// CSV file with identifiers, titles and purchase dates
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Preview changes without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long, short)]
    pub yes: bool,

    /// Output format for the preview
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Maximum folder name length in characters
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Drop .partN when only one folder exists for an identifier
    #[arg(long)]
    pub remove_suffix: bool,

    /// Leave modification times alone
    #[arg(long)]
    pub no_mtime: bool,

    /// Also update folders that are already named after a title
    #[arg(long)]
    pub match_titles: bool,

    /// How target names are composed
    #[arg(long, value_enum)]
    pub naming: Option<NamingArg>,

    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    Auto,
    Title,
    IdentifierTitle,
}

impl From<NamingArg> for NameStyle {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Auto => NameStyle::Auto,
            NamingArg::Title => NameStyle::Title,
            NamingArg::IdentifierTitle => NameStyle::IdentifierTitle,
        }
    }
}

impl RenameArgs {
    /// Flags win over file and environment configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(csv) = &self.csv {
            config.data_file = csv.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = log_dir.clone();
        }
        if let Some(max_length) = self.max_length {
            config.max_length = max_length;
        }
        if let Some(naming) = self.naming {
            config.naming = naming.into();
        }
        if self.remove_suffix {
            config.remove_suffix = true;
        }
        if self.no_mtime {
            config.set_mtime = false;
        }
        if self.match_titles {
            config.match_titles = true;
        }
    }
}
