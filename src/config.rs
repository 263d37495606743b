use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for member onboarding
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Deployment environment settings
    pub deployment: DeploymentConfig,
    /// Identity verification provider settings
    pub verification: VerificationConfig,
    /// Client authentication settings
    pub auth: AuthConfig,
    /// Registration record storage
    pub storage: StorageConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Production deployments never allow the payment bypass
    pub production: bool,
    /// Allow the development payment bypass outside production
    pub allow_payment_bypass: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Shared secret the provider signs callbacks with
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret for locally issued bearer tokens
    pub token_secret: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend
    pub state_dir: PathBuf,
    /// SQLite URL for the sqlite backend (requires the `database` feature)
    pub database_url: String,
    /// Run migrations on connect
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            production: false,
            allow_payment_bypass: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            state_dir: PathBuf::from(".member-onboarding/registrations"),
            database_url: "sqlite://.member-onboarding/onboarding.db".to_string(),
            auto_migrate: true,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

fn env_flags_production(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("production")
}

impl OnboardingConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (member-onboarding.toml)
    /// 3. Environment variables (prefixed with MEMBER_ONBOARDING, `__` between sections)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("member-onboarding.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        if path.exists() {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEMBER_ONBOARDING")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut onboarding_config: OnboardingConfig = builder.build()?.try_deserialize()?;
        onboarding_config.apply_conventional_env(|key| std::env::var(key).ok());

        Ok(onboarding_config)
    }

    /// Honour the environment variable names hosting platforms set
    fn apply_conventional_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.verification.webhook_secret.is_none() {
            self.verification.webhook_secret = var("VERIFICATION_WEBHOOK_SECRET");
        }

        if ["APP_ENV", "NODE_ENV"]
            .iter()
            .filter_map(|key| var(key))
            .any(|value| env_flags_production(&value))
        {
            self.deployment.production = true;
        }
    }

    /// Whether the development payment bypass may be used
    pub fn payment_bypass_permitted(&self) -> bool {
        !self.deployment.production && self.deployment.allow_payment_bypass
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
