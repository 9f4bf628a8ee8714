use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "insight-nexus", about = "Survey and voting API server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Path to the document database file
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Secret used to sign access tokens
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Stripe secret key
    #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
    pub stripe_secret_key: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub token_secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PaymentsConfig {
    pub secret_key: String,
    pub currency: String,
    pub api_base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "https://insight-nexus.web.app".to_string(),
            ],
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_minutes: 60,
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            currency: "usd".to_string(),
            api_base: "https://api.stripe.com".to_string(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI and environment overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref path) = cli.db_path {
            config.database.path = Some(path.clone());
        }
        if let Some(ref secret) = cli.token_secret {
            config.auth.token_secret = secret.clone();
        }
        if let Some(ref key) = cli.stripe_secret_key {
            config.payments.secret_key = key.clone();
        }

        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("insight-nexus.db"));
        }

        if config.auth.token_secret.is_empty() {
            tracing::warn!("ACCESS_TOKEN_SECRET is not set; tokens are signed with an empty key");
        }
        if config.payments.secret_key.is_empty() {
            tracing::warn!("STRIPE_SECRET_KEY is not set; payment intents will be rejected");
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".insight-nexus")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("insight-nexus.db"))
    }
}
