// ============================================================================
// Configuration
// ============================================================================
// Lue depuis les variables d'environnement, avec des valeurs par défaut
// adaptées au serveur local de développement.
//
// | Variable                 | Défaut                                  |
// |--------------------------|-----------------------------------------|
// | PRICEPULSE_API_URL       | http://localhost:5000/api               |
// | PRICEPULSE_PAGE_SIZE     | 9                                       |
// | PRICEPULSE_TIMEOUT_SECS  | 30                                      |
// | PRICEPULSE_LOG_DIR       | <data_local_dir>/pricepulse/logs        |
//
// Le niveau de log se règle avec RUST_LOG.
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_PAGE_SIZE: usize = 9;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Valeur de configuration invalide
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} invalide : {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL de base de l'API (sans slash final)
    pub api_url: String,

    /// Nombre de produits par page
    pub page_size: usize,

    /// Timeout des requêtes HTTP
    pub request_timeout: Duration,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Lit la configuration depuis une fonction de recherche
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - Les tests passent une HashMap au lieu de modifier l'environnement global
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("PRICEPULSE_API_URL") {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    name: "PRICEPULSE_API_URL",
                    value: url,
                    reason: "doit commencer par http:// ou https://",
                });
            }
            config.api_url = url;
        }

        if let Some(raw) = lookup("PRICEPULSE_PAGE_SIZE") {
            config.page_size = match raw.trim().parse::<usize>() {
                Ok(size) if size >= 1 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "PRICEPULSE_PAGE_SIZE",
                        value: raw,
                        reason: "entier >= 1 attendu",
                    })
                }
            };
        }

        if let Some(raw) = lookup("PRICEPULSE_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "PRICEPULSE_TIMEOUT_SECS",
                value: raw.clone(),
                reason: "nombre de secondes attendu",
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(dir) = lookup("PRICEPULSE_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

/// Répertoire de logs par défaut
///
/// - Linux : ~/.local/share/pricepulse/logs
/// - macOS : ~/Library/Application Support/pricepulse/logs
/// - Repli : ./logs
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("pricepulse").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
