//! Container options.
//!
//! Options are fixed when the provider is built. They can be set in code,
//! read from the environment, or (with the `config` feature) loaded from
//! JSON.

use std::env;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Prefix of every environment variable read by [`ContainerOptions::from_env`].
pub const ENV_PREFIX: &str = "FERROUS_ACTIVATOR";

/// Default limit on nested resolutions before [`DiError::DepthExceeded`].
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Behaviour switches for a container.
///
/// # Examples
///
/// ```
/// use ferrous_activator::ContainerOptions;
///
/// let options = ContainerOptions::default()
///     .with_max_depth(64)
///     .with_validate_scopes(true);
///
/// assert_eq!(options.max_depth, 64);
/// assert!(options.case_insensitive_names);
/// assert!(options.validate_scopes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Deepest chain of nested service resolutions allowed
    pub max_depth: usize,
    /// Whether named arguments match parameter names ignoring ASCII case
    pub case_insensitive_names: bool,
    /// Reject Scoped services resolved from the root provider
    pub validate_scopes: bool,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            case_insensitive_names: true,
            validate_scopes: false,
        }
    }
}

impl ContainerOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_case_insensitive_names(mut self, enabled: bool) -> Self {
        self.case_insensitive_names = enabled;
        self
    }

    pub fn with_validate_scopes(mut self, enabled: bool) -> Self {
        self.validate_scopes = enabled;
        self
    }

    /// Defaults overridden by `FERROUS_ACTIVATOR_*` environment variables.
    ///
    /// Unset variables keep their default.
    ///
    /// # Errors
    ///
    /// [`DiError::Config`] when a variable is set but cannot be parsed.
    pub fn from_env() -> DiResult<Self> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Like [`from_env`](Self::from_env) with a custom variable prefix.
    pub fn from_env_with_prefix(prefix: &str) -> DiResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_depth: read_env(prefix, "max_depth")?.unwrap_or(defaults.max_depth),
            case_insensitive_names: read_env(prefix, "case_insensitive_names")?
                .unwrap_or(defaults.case_insensitive_names),
            validate_scopes: read_env(prefix, "validate_scopes")?.unwrap_or(defaults.validate_scopes),
        })
    }

    /// Parses options from JSON; missing fields keep their default.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|err| DiError::Config(err.to_string()))
    }
}

fn read_env<T: FromStr>(prefix: &str, key: &str) -> DiResult<Option<T>> {
    let env_key = format!("{}_{}", prefix.to_uppercase(), key.to_uppercase());
    match env::var(&env_key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DiError::Config(format!("{env_key}: cannot parse {raw:?}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(DiError::Config(format!("{env_key}: not valid unicode"))),
    }
}
