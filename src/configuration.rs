use std::env;
use std::env::current_dir;
use std::fmt::Display;

use anyhow::Context;
use config::Config;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::telegram_client::BotCredentials;
use crate::telegram_client::TelegramClient;

/// Global configuration, loaded from `configuration/*.yaml`. See
/// `get_configuration`.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub telegram: TelegramSettings,
    pub contact: ContactSettings,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Bot API configuration. The two secrets are optional here; a missing secret
/// is not a startup error, it only disables the relay (see
/// `TelegramSettings::credentials`).
#[derive(Deserialize, Clone)]
pub struct TelegramSettings {
    /// `https://api.telegram.org` in production, a mock server in tests
    pub base_url: String,
    #[serde(default)]
    pub bot_token: Option<Secret<String>>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

/// Which of the two bot secrets were found. Only ever constructed when at
/// least one is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingCredentials {
    pub bot_token: bool,
    pub chat_id: bool,
}

impl TelegramSettings {
    /// Empty strings count as absent, so `APP_TELEGRAM__BOT_TOKEN=` does not
    /// produce a client that is doomed to fail.
    pub fn credentials(&self) -> Result<BotCredentials, MissingCredentials> {
        let token = self
            .bot_token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty());
        let chat_id = self
            .chat_id
            .as_ref()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty());

        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Ok(BotCredentials {
                token: token.clone(),
                chat_id: chat_id.to_string(),
            }),
            (token, chat_id) => Err(MissingCredentials {
                bot_token: token.is_some(),
                chat_id: chat_id.is_some(),
            }),
        }
    }

    pub fn client(&self) -> Result<TelegramClient, MissingCredentials> {
        let creds = self.credentials()?;
        Ok(TelegramClient::new(self.base_url.clone(), creds))
    }
}

/// Where visitors are pointed when the relay is unavailable
#[derive(Deserialize, Clone)]
pub struct ContactSettings {
    pub mailbox: String,
    pub telegram_link: String,
}

pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`.
///
/// Bot secrets are expected to come from env vars rather than files:
///
/// `APP_TELEGRAM__BOT_TOKEN=123:abc` -> `Settings.telegram.bot_token`
pub fn get_configuration() -> Result<Settings, anyhow::Error> {
    let cfg_dir = current_dir()
        .context("could not get current dir")?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or("local".to_string())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, `serde-aux` is required to parse other types
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("could not load config for {env} env"))?;

    settings
        .try_deserialize::<Settings>()
        .context("invalid configuration")
}
