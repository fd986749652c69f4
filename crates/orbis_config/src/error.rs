use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid [{section}] settings: {reason}")]
    Invalid {
        section: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(section: &'static str) -> impl FnOnce(&'static str) -> Self {
        move |reason| Self::Invalid { section, reason }
    }
}
