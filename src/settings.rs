use std::path::Path;

use config::{Config, ConfigError, Environment, File, Source};
use serde::Deserialize;

const ENV_PREFIX: &str = "FCM_RELAY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct WebserverSettings {
    pub host: String,
    pub port: u16,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Push delivery backend. Missing FCM credentials are not a configuration
/// error; they make the backend fail to initialize at startup instead.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum PushSettings {
    Fcm {
        #[serde(default)]
        project_id: String,
        #[serde(default)]
        client_email: String,
        /// PEM text, literal `\n` sequences allowed
        #[serde(default)]
        private_key: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    Dummy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub webserver: WebserverSettings,
    pub push: PushSettings,
}

impl Settings {
    pub fn load() -> Result<Settings, ConfigError> {
        Self::build(File::with_name("settings").required(false), environment())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
        Self::build(File::from(path.as_ref()), environment())
    }

    fn build<S>(file: S, env: Environment) -> Result<Settings, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .set_default("webserver.host", "0.0.0.0")?
            .set_default("webserver.port", 3000)?
            .set_default("push.type", "fcm")?
            .add_source(file)
            .add_source(env)
            .build()?;

        settings.try_deserialize()
    }
}

// Values are parsed so that numbers reach the tagged `push` section typed; it
// is buffered before deserialization and cannot convert strings itself.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
