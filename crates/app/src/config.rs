//! Environment configuration.
//!
//! | variable                 | format                     | default                          |
//! |--------------------------|----------------------------|----------------------------------|
//! | `CASHLESS_INVITE_CODES`  | `CODE=mode,CODE=mode`      | `SOUNDWAVE2024=fan,FUNNELMARKET2024=marketplace` |
//! | `CASHLESS_CATALOG_PATH`  | path to a merch JSON array | none (empty store)               |
//! | `CASHLESS_LISTINGS_PATH` | path to a listings array   | none (empty board)               |

use std::path::PathBuf;

use thiserror::Error;

use cashless_access::{AppMode, InviteCodes};

pub const INVITE_CODES_VAR: &str = "CASHLESS_INVITE_CODES";
pub const CATALOG_PATH_VAR: &str = "CASHLESS_CATALOG_PATH";
pub const LISTINGS_PATH_VAR: &str = "CASHLESS_LISTINGS_PATH";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: entry {entry:?} is not CODE=mode")]
    MalformedEntry { var: &'static str, entry: String },

    #[error("{var}: unknown mode {mode:?} (expected fan or marketplace)")]
    UnknownMode { var: &'static str, mode: String },

    #[error("{var}: no invite codes configured")]
    NoCodes { var: &'static str },

    #[error("{var} is set but empty")]
    EmptyPath { var: &'static str },
}

/// Defaults to the stock invite codes and no catalog or listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub invite_codes: InviteCodes,
    pub catalog_path: Option<PathBuf>,
    pub listings_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let invite_codes = match lookup(INVITE_CODES_VAR) {
            Some(raw) => parse_invite_codes(&raw)?,
            None => InviteCodes::default(),
        };

        Ok(Self {
            invite_codes,
            catalog_path: optional_path(&lookup, CATALOG_PATH_VAR)?,
            listings_path: optional_path(&lookup, LISTINGS_PATH_VAR)?,
        })
    }
}

fn optional_path<F>(lookup: &F, var: &'static str) -> Result<Option<PathBuf>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::EmptyPath { var }),
        Some(raw) => Ok(Some(PathBuf::from(raw.trim()))),
    }
}

fn parse_invite_codes(raw: &str) -> Result<InviteCodes, ConfigError> {
    let var = INVITE_CODES_VAR;
    let mut codes = InviteCodes::none();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, mode) = entry
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedEntry {
                var,
                entry: entry.to_string(),
            })?;

        let mode: AppMode = mode.parse().map_err(|_| ConfigError::UnknownMode {
            var,
            mode: mode.trim().to_string(),
        })?;

        codes
            .insert(code, mode)
            .map_err(|_| ConfigError::MalformedEntry {
                var,
                entry: entry.to_string(),
            })?;
    }

    if codes.is_empty() {
        return Err(ConfigError::NoCodes { var });
    }
    Ok(codes)
}
