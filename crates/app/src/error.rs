use thiserror::Error;

use cashless_core::DomainError;
use cashless_marketplace::BoardLoadError;
use cashless_merch::CatalogLoadError;

use crate::config::ConfigError;

/// Errors surfaced by the session shell.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog load failed: {0}")]
    Catalog(#[from] CatalogLoadError),

    #[error("listings load failed: {0}")]
    Listings(#[from] BoardLoadError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
