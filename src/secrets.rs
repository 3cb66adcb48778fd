// secrets
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use tracing::info;
pub static SECRET_MANAGER: Lazy<SecretManager> = Lazy::new(SecretManager::new);

enum MODE {
    DEV,
    PROD,
}

const KEYS: &[&str] = &[
    "MONGODB_SERVICE",
    "MONGODB_USERNAME",
    "MONGODB_PASSWORD",
    "MONGODB_PORT",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing MongoDB server in the MONGODB_SERVICE variable")]
    MissingMongoService,
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),
    #[error("STORE must be `mongodb` or `memory`, got {0:?}")]
    InvalidStore(String),
}

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    MongoDb,
    Memory,
}

pub struct SecretManager {
    secrets: HashMap<String, String>,
}

impl SecretManager {
    fn new() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the secrets from any variable lookup; `new` uses the process environment.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut secrets: HashMap<String, String> = HashMap::new();
        let mode = match lookup("MODE") {
            Some(mode) if mode.to_lowercase() == "prod" => MODE::PROD,
            _ => MODE::DEV,
        };
        match mode {
            MODE::DEV => {
                secrets.insert(
                    "PORT".to_string(),
                    lookup("PORT").unwrap_or("8000".to_string()),
                );
            }
            MODE::PROD => {
                secrets.insert("PORT".to_string(), lookup("PORT").unwrap_or_default());
            }
        }
        let port = secrets["PORT"].clone();
        secrets.insert(
            "BACKEND_URL".to_string(),
            lookup("BACKEND_URL").unwrap_or(format!("http://localhost:{}", port)),
        );
        secrets.insert(
            "STORE".to_string(),
            lookup("STORE").unwrap_or("mongodb".to_string()),
        );
        secrets.insert(
            "SEED_FILE".to_string(),
            lookup("SEED_FILE").unwrap_or("data/songs.json".to_string()),
        );

        // MongoDB
        for key in KEYS {
            secrets.insert(key.to_string(), lookup(key).unwrap_or_default());
        }

        // Log which secrets are configured (NOT their values!)
        let configured: Vec<&str> = secrets
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| k.as_str())
            .collect();
        info!("Secrets configured: {:?}", configured);

        SecretManager { secrets }
    }

    pub fn get(&self, key: &str) -> String {
        self.secrets.get(key).cloned().unwrap_or_default()
    }

    pub fn port(&self) -> Result<u16, ConfigError> {
        let port = self.get("PORT");
        port.parse().map_err(|_| ConfigError::InvalidPort(port))
    }

    pub fn store_kind(&self) -> Result<StoreKind, ConfigError> {
        match self.get("STORE").to_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreKind::MongoDb),
            "memory" => Ok(StoreKind::Memory),
            other => Err(ConfigError::InvalidStore(other.to_string())),
        }
    }

    /// Connection string for the songs database. Credentials are only used
    /// when both the username and the password are set.
    pub fn mongodb_url(&self) -> Result<String, ConfigError> {
        let mut service = self.get("MONGODB_SERVICE");
        if service.is_empty() {
            return Err(ConfigError::MissingMongoService);
        }
        let port = self.get("MONGODB_PORT");
        if !port.is_empty() && !service.contains(':') {
            service = format!("{}:{}", service, port);
        }

        let username = self.get("MONGODB_USERNAME");
        let password = self.get("MONGODB_PASSWORD");
        if !username.is_empty() && !password.is_empty() {
            Ok(format!("mongodb://{}:{}@{}", username, password, service))
        } else {
            Ok(format!("mongodb://{}", service))
        }
    }
}
