use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "dlsite_purchases.csv";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_MAX_LENGTH: usize = 200;
pub const DEFAULT_IDENTIFIER_PREFIX: &str = "RJ";

/// How the target folder name is composed from a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameStyle {
    /// Bare folders (`RJ01234567[.partN]`) get the title alone; folders that
    /// already carry text after the identifier keep the identifier in front.
    #[default]
    Auto,
    /// `<title>[.partN]`
    Title,
    /// `<IDENTIFIER>_<title>[.partN]`
    IdentifierTitle,
}

impl NameStyle {
    /// Whether the identifier is kept in front of the title for a folder whose
    /// name had `base_part` after its identifier.
    pub fn keeps_identifier(self, base_part: &str) -> bool {
        match self {
            NameStyle::Auto => !base_part.is_empty(),
            NameStyle::Title => false,
            NameStyle::IdentifierTitle => true,
        }
    }
}

/// Resolution of repeated identifiers in the data file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Exports are appended chronologically, so the later row is the newer one.
    #[default]
    LastWins,
    FirstWins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub log_dir: PathBuf,
    pub max_length: usize,
    pub remove_suffix: bool,
    pub set_mtime: bool,
    pub identifier_prefix: String,
    pub naming: NameStyle,
    pub duplicate_policy: DuplicatePolicy,
    pub match_titles: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_length: DEFAULT_MAX_LENGTH,
            remove_suffix: false,
            set_mtime: true,
            identifier_prefix: DEFAULT_IDENTIFIER_PREFIX.to_string(),
            naming: NameStyle::Auto,
            duplicate_policy: DuplicatePolicy::LastWins,
            match_titles: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_length == 0 {
            return Err(Error::InvalidInput(
                "max_length must be greater than zero".to_string(),
            ));
        }
        if self.identifier_prefix.is_empty()
            || !self
                .identifier_prefix
                .chars()
                .all(|c| c.is_ascii_alphabetic())
        {
            return Err(Error::InvalidInput(format!(
                "identifier_prefix must be ASCII letters, got {:?}",
                self.identifier_prefix
            )));
        }
        Ok(())
    }
}

/// Load configuration from an optional `Config.*` file in the working
/// directory, overlaid with `DLRENAME_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    build_configuration(ConfigFile::with_name("Config").required(false))
}

/// Same as [`load_configuration`] but reads the given file, which must exist.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    build_configuration(ConfigFile::from(path).required(true))
}

fn build_configuration<S>(file: S) -> Result<AppConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("data_file", defaults.data_file.to_string_lossy().into_owned())?
        .set_default("log_dir", defaults.log_dir.to_string_lossy().into_owned())?
        .set_default("max_length", defaults.max_length as u64)?
        .set_default("remove_suffix", defaults.remove_suffix)?
        .set_default("set_mtime", defaults.set_mtime)?
        .set_default("identifier_prefix", defaults.identifier_prefix)?
        .set_default("naming", "auto")?
        .set_default("duplicate_policy", "last_wins")?
        .set_default("match_titles", defaults.match_titles)?
        .add_source(file)
        .add_source(Environment::with_prefix("DLRENAME").try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
