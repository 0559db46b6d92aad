use std::env;

use thiserror::Error;

pub const TOKEN_VAR: &str = "TELOXIDE_TOKEN";
pub const SEED_VAR: &str = "ARENA_RNG_SEED";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("ARENA_RNG_SEED must be an unsigned integer, got {value:?}")]
    InvalidSeed {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// Fixes the opponent draws, so a whole run can be replayed.
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional
        dotenv::dotenv().ok();
        Self::from_vars(env::var(TOKEN_VAR).ok(), env::var(SEED_VAR).ok())
    }

    pub fn from_vars(
        bot_token: Option<String>,
        rng_seed: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bot_token = bot_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingVar(TOKEN_VAR))?;

        let rng_seed = match rng_seed.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(value.parse().map_err(|source| ConfigError::InvalidSeed {
                value: value.to_string(),
                source,
            })?),
        };

        Ok(Self {
            bot_token,
            rng_seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_only() {
        let config = Config::from_vars(Some("123:abc".into()), None).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_seed_is_parsed() {
        let config = Config::from_vars(Some("123:abc".into()), Some(" 42 ".into())).unwrap();
        assert_eq!(config.rng_seed, Some(42));
    }

    #[test]
    fn test_blank_seed_means_unseeded() {
        let config = Config::from_vars(Some("123:abc".into()), Some("".into())).unwrap();
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_missing_token() {
        let result = Config::from_vars(None, None);
        assert!(matches!(result, Err(ConfigError::MissingVar(TOKEN_VAR))));

        let result = Config::from_vars(Some("  ".into()), None);
        assert!(matches!(result, Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn test_bad_seed() {
        let result = Config::from_vars(Some("123:abc".into()), Some("-1".into()));
        assert!(matches!(result, Err(ConfigError::InvalidSeed { .. })));
    }
}
