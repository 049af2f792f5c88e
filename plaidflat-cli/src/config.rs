use anyhow::{bail, Context, Result};
use plaidflat_client::{ApiSettings, Credentials, InstitutionQuery, TransactionWindow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "configs/plaidflat.toml";

const CLIENT_ID_VAR: &str = "PLAID_CLIENT_ID";
const SECRET_VAR: &str = "PLAID_CLIENT_SECRET";
const USERNAME_VAR: &str = "PLAID_LINK_USERNAME";
const PASSWORD_VAR: &str = "PLAID_LINK_PASSWORD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional dotenv file holding the API credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
    pub data_dir: PathBuf,
    /// Seed file name, relative to `data_dir`
    pub institutions_csv: String,
    pub api: ApiSettings,
    pub institutions: InstitutionQuery,
    pub transactions: TransactionWindow,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Bytes; a larger log file is cleared at startup
    pub file_size_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_file: Some(PathBuf::from(".env")),
            data_dir: PathBuf::from("data"),
            institutions_csv: "institutions.csv".to_string(),
            api: ApiSettings::default(),
            institutions: InstitutionQuery::default(),
            transactions: TransactionWindow::default(),
            logging: LoggingSection::default(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            file_size_limit: 1_048_576,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.transactions.validate()?;
        if self.institutions_csv.trim().is_empty() {
            bail!("institutions_csv is empty");
        }
        Ok(())
    }

    pub fn seed_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.institutions_csv)
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load the config file. A missing default file means built-in defaults; a
/// missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = config_path(explicit);
    if !p.exists() {
        if explicit.is_some() {
            bail!("config file not found: {}", p.display());
        }
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = config_path(explicit);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// Read credentials from the environment after loading the dotenv file.
/// Variables already set in the process win over the file.
pub fn load_credentials(env_file: Option<&Path>) -> Result<Credentials> {
    match env_file {
        Some(path) if path.exists() => {
            dotenvy::from_path(path).with_context(|| format!("load {}", path.display()))?;
            info!(path = %path.display(), "loaded environment file");
        }
        Some(path) => warn!(path = %path.display(), "environment file not found, using process environment"),
        None => {}
    }
    credentials_from(|name| std::env::var(name).ok())
}

fn credentials_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let required = |name: &str| {
        lookup(name)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{name} is not set"))
    };
    Ok(Credentials {
        client_id: required(CLIENT_ID_VAR)?,
        secret: required(SECRET_VAR)?,
        override_username: lookup(USERNAME_VAR).unwrap_or_else(|| "user_good".to_string()),
        override_password: lookup(PASSWORD_VAR).unwrap_or_else(|| "pass_good".to_string()),
    })
}
