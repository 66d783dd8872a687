use std::{
    collections::BTreeMap,
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{errors::Error, Result};

/// Model identifiers offered as `/ai` choices and returned by `/models` when the
/// catalog endpoint is unusable.
pub const DEFAULT_MODELS: [&str; 4] = ["gpt-4o-mini", "gpt-4o", "gemini", "grok-3-mini-beta"];

/// Display names for [`DEFAULT_MODELS`] in the `/ai` model picker.
const DEFAULT_MODEL_LABELS: [(&str, &str); 4] = [
    ("gpt-4o-mini", "GPT-4o Mini"),
    ("gpt-4o", "GPT-4o"),
    ("gemini", "Gemini"),
    ("grok-3-mini-beta", "Grok 3 Mini Beta"),
];

/// Discord rejects the whole command payload past these bounds.
pub const MAX_MODEL_CHOICES: usize = 25;
pub const MAX_CHOICE_LEN: usize = 100;

pub const DEFAULT_BASE_URL: &str = "https://api.claude.gg/v1";

/// Value shipped in `config.example.json`; treated the same as an absent id.
const PLACEHOLDER_SUFFIX: &str = "_HERE";

const CONFIG_PATH_ENV: &str = "CDB_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Typed configuration, loaded once at startup and shared read-only.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default)]
    pub cortex_api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout: u64,
    pub models: Vec<String>,
    /// Optional display name per model id; ids without one are shown as-is.
    pub model_labels: BTreeMap<String, String>,
    pub startup_check: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODELS[0].to_string(),
            max_tokens: 2000,
            temperature: 0.7,
            timeout: 30_000,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            model_labels: DEFAULT_MODEL_LABELS
                .iter()
                .map(|(id, label)| (id.to_string(), label.to_string()))
                .collect(),
            startup_check: false,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    pub fn model_label<'a>(&'a self, id: &'a str) -> &'a str {
        self.model_labels
            .get(id)
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(id)
    }
}

/// Where slash commands get registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandScope {
    /// Visible everywhere; Discord may take up to an hour to propagate.
    Global,
    /// Visible in a single guild immediately.
    Guild(u64),
}

impl Config {
    /// Load `.env` (if present), then the JSON config file named by `CDB_CONFIG`
    /// (default `./config.json`), then apply env overrides.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;

        let path = env_str(CONFIG_PATH_ENV)
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&path, |key| env_str(key))
    }

    pub fn load_from(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "cannot read {}: {e} (copy config.example.json to config.json and fill it in)",
                path.display()
            ))
        })?;

        let mut cfg = Self::parse(&raw)?;
        cfg.apply_env_overrides(lookup);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON document without touching the environment.
    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg = Self::parse(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Config(format!("invalid config json: {e}")))
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("DISCORD_BOT_TOKEN").and_then(non_empty) {
            self.bot.token = token;
        }
        if let Some(key) = lookup("CORTEX_API_KEY").and_then(non_empty) {
            self.api.cortex_api_key = key;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.bot.token.trim().is_empty() {
            return Err(Error::Config("bot.token is required".to_string()));
        }
        if self.api.cortex_api_key.trim().is_empty() {
            return Err(Error::Config("api.cortexApiKey is required".to_string()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("api.baseUrl must not be empty".to_string()));
        }
        if self.settings.default_model.trim().is_empty() {
            return Err(Error::Config(
                "settings.defaultModel must not be empty".to_string(),
            ));
        }
        if self.settings.models.is_empty() {
            return Err(Error::Config("settings.models must not be empty".to_string()));
        }
        if self.settings.models.len() > MAX_MODEL_CHOICES {
            return Err(Error::Config(format!(
                "settings.models has {} entries; at most {MAX_MODEL_CHOICES} are allowed",
                self.settings.models.len()
            )));
        }
        for id in &self.settings.models {
            let label = self.settings.model_label(id);
            if id.trim().is_empty() || id.chars().count() > MAX_CHOICE_LEN {
                return Err(Error::Config(format!(
                    "settings.models entry {id:?} must be 1-{MAX_CHOICE_LEN} characters"
                )));
            }
            if label.chars().count() > MAX_CHOICE_LEN {
                return Err(Error::Config(format!(
                    "settings.modelLabels entry for {id:?} exceeds {MAX_CHOICE_LEN} characters"
                )));
            }
        }
        if self.settings.timeout == 0 {
            return Err(Error::Config("settings.timeout must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn command_scope(&self) -> CommandScope {
        match parse_snowflake(self.bot.guild_id.as_deref()) {
            Some(id) => CommandScope::Guild(id),
            None => CommandScope::Global,
        }
    }

    pub fn application_id(&self) -> Option<u64> {
        parse_snowflake(Some(&self.bot.client_id))
    }

    /// Channel the bot is pinned to, if any.
    pub fn allowed_channel(&self) -> Option<u64> {
        parse_snowflake(self.bot.channel_id.as_deref())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn parse_snowflake(v: Option<&str>) -> Option<u64> {
    let v = v?.trim();
    if v.is_empty() || v.ends_with(PLACEHOLDER_SUFFIX) {
        return None;
    }
    v.parse::<u64>().ok().filter(|id| *id != 0)
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Existing process variables win over `.env` entries.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Config(format!("cannot load {}: {e}", path.display()))),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
