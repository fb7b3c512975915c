use std::str::FromStr;

use thiserror::Error;

use crate::env::get_env_var_opt;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable is set but its value cannot be parsed.
    #[error("Invalid value for environment variable {name}: {value:?} ({message})")]
    InvalidEnvVar {
        name: String,
        value: String,
        message: String,
    },
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank, and
/// [`ConfigError::InvalidEnvVar`] when it is set to something `T` cannot parse.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = get_env_var_opt(name) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        })
}
