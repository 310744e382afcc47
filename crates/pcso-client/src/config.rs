use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::ENV_GUARD;

const CONFIG_FILE: &str = "pcso.toml";
const CONFIG_PATH_ENV: &str = "PCSO_CONFIG";

pub const ANY_ORIGIN: &str = "*";

pub const DEFAULT_RESULTS_URL: &str = "https://www.pcso.gov.ph/SearchLottoResult.aspx";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PcsoConfig {
    pub http: HttpConfig,
    pub scrape: ScrapeConfig,
    pub output: OutputConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Budget for one update trigger, retrieval included
    pub trigger_timeout_secs: u64,
    /// Origins allowed to call the API from a browser; `*` allows any, empty disables CORS
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 5000,
            trigger_timeout_secs: 120,
            cors_origins: vec![ANY_ORIGIN.to_owned()],
        }
    }
}

impl HttpConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("http.host is not an IP address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_secs(self.trigger_timeout_secs)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == ANY_ORIGIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Pause before each request to the results site
    pub request_delay_ms: u64,
    pub days_back: u32,
    /// Generate sample rows when the results site cannot be used
    pub fallback_to_sample: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RESULTS_URL.to_owned(),
            timeout_secs: 30,
            request_delay_ms: 2000,
            days_back: 3650,
            fallback_to_sample: true,
        }
    }
}

impl ScrapeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub dataset_file: String,
    pub statistics_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            dataset_file: "pcso_lotto_data.json".to_owned(),
            statistics_file: "pcso_statistics.json".to_owned(),
        }
    }
}

impl OutputConfig {
    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(&self.dataset_file)
    }

    pub fn statistics_path(&self) -> PathBuf {
        self.dir.join(&self.statistics_file)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportConfig {
    /// CSV imported after each fetch triggered over HTTP
    pub csv_path: Option<PathBuf>,
}

impl PcsoConfig {
    /// Load `PCSO_CONFIG`, else `pcso.toml` next to `.env`, else defaults; then apply env overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            log::debug!("Loading config from {}", path.display());
            Self::from_file(&path)?
        } else {
            log::debug!("Config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        match ENV_GUARD.as_ref() {
            Ok(env_file) => env_file
                .parent()
                .map(|dir| dir.join(CONFIG_FILE))
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE)),
            Err(_) => PathBuf::from(CONFIG_FILE),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PCSO_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("PCSO_HTTP_HOST") {
            self.http.host = host;
        }
        if let Some(port) = lookup("PCSO_HTTP_PORT") {
            self.http.port = port
                .parse()
                .with_context(|| format!("PCSO_HTTP_PORT is not a port number: {port}"))?;
        }
        if let Some(dir) = lookup("PCSO_DATA_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
        if let Some(csv) = lookup("PCSO_CSV_PATH") {
            self.import.csv_path = Some(PathBuf::from(csv));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.http.socket_addr()?;
        for origin in &self.http.cors_origins {
            axum::http::HeaderValue::from_str(origin)
                .with_context(|| format!("http.cors_origins has an invalid origin: {origin:?}"))?;
        }
        if self.http.trigger_timeout_secs == 0 {
            anyhow::bail!("http.trigger_timeout_secs must be greater than zero");
        }
        if self.scrape.timeout_secs == 0 {
            anyhow::bail!("scrape.timeout_secs must be greater than zero");
        }
        if self.output.dataset_file == self.output.statistics_file {
            anyhow::bail!(
                "output.dataset_file and output.statistics_file must differ (both {})",
                self.output.dataset_file
            );
        }
        Ok(())
    }
}
