use anyhow::{Context, bail};
use colored::{Color, ColoredString, Style};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{collections::BTreeMap, fmt::Display, io};

const DEFAULT_PROFILE: &str = "local";
const DEFAULT_SERVER: &str = "http://localhost:8080";
pub const SERVER_ENV: &str = "SENSOR_EDGE_SERVER";

fn default_color() -> String {
    "green".to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Profile {
    server: String,
    #[serde(default = "default_color")]
    color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub current_profile: String,
    profile: BTreeMap<String, Profile>,
    #[serde(skip)]
    server_override: Option<String>,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .context("Could not locate the home directory")?
            .join(".sensor-edge"))
    }

    /// Loads `~/.sensor-edge/config.toml`, falling back to a single `local`
    /// profile when the file does not exist yet.
    pub async fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(Self::config_dir()?.join("config.toml")).await?;
        config.apply_server_env(std::env::var(SERVER_ENV).ok());
        Ok(config)
    }

    pub async fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let config_str = match tokio::fs::read_to_string(path).await {
            Ok(config_str) => config_str,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::with_path(path.to_owned()));
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !config.profile.contains_key(&config.current_profile) {
            bail!(
                "Current profile '{}' is not defined in {}",
                config.current_profile,
                path.display()
            );
        }

        config.path = path.to_owned();
        Ok(config)
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        let save_file = self.path.with_extension("toml.save");
        let config_str = toml::to_string(&self)?;
        tokio::fs::write(&save_file, config_str).await?;
        tokio::fs::rename(save_file, &self.path).await?;
        Ok(())
    }

    pub async fn change_profile(&mut self, profile: String) -> anyhow::Result<()> {
        if !self.profile.contains_key(&profile) {
            bail!("Profile '{}' does not exist", profile);
        }

        self.current_profile = profile;
        self.save().await?;

        Ok(())
    }

    pub fn profiles(&self) -> impl Iterator<Item = &str> {
        self.profile.keys().map(String::as_str)
    }

    /// Applies the value of `SENSOR_EDGE_SERVER`. An unset or empty variable
    /// leaves the profile's server in place.
    pub fn apply_server_env(&mut self, value: Option<String>) {
        if let Some(server) = value
            && !server.is_empty()
        {
            self.set_server_override(server);
        }
    }

    pub fn set_server_override(&mut self, server: impl Into<String>) {
        self.server_override = Some(server.into());
    }

    pub fn current_domain(&self) -> String {
        match &self.server_override {
            Some(server) => server.clone(),
            None => self.current().server.clone(),
        }
    }

    /// Request timeout for the active profile. `None` keeps the HTTP client's
    /// own default.
    pub fn timeout(&self) -> Option<Duration> {
        self.current().timeout_secs.map(Duration::from_secs)
    }

    fn current(&self) -> &Profile {
        // load_from and change_profile both reject unknown profiles
        &self.profile[&self.current_profile]
    }

    fn with_path(path: PathBuf) -> Self {
        let mut profile = BTreeMap::new();
        profile.insert(
            DEFAULT_PROFILE.to_owned(),
            Profile {
                server: DEFAULT_SERVER.to_owned(),
                color: default_color(),
                timeout_secs: None,
            },
        );

        Self {
            current_profile: DEFAULT_PROFILE.to_owned(),
            profile,
            server_override: None,
            path,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current_profile = self.current();
        let color = Color::from(current_profile.color.as_str());
        let mut colored_string = ColoredString::from(self.current_profile.as_str());
        colored_string.fgcolor = Some(color);
        colored_string.style = Style::default().bold();
        let mut colored_server = ColoredString::from(self.current_domain().as_str());
        colored_server.fgcolor = Some(color);
        write!(f, "{} {}", colored_string, colored_server)
    }
}
