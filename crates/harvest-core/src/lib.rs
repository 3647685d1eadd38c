pub mod app_config;
pub mod categories;
pub mod config;
pub mod items;

pub use app_config::AppConfig;
pub use categories::{
    load_categories, parse_categories, CardSelectors, CategoriesFile, CategoryTarget, PageMarkers,
    CONFLICTS_KEY,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{Item, NOT_AVAILABLE, ZERO};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[source] serde_yaml::Error),

    #[error("invalid categories configuration: {0}")]
    Validation(String),
}
