use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("invalid environment configuration: {0}")]
    Env(#[from] envy::Error),
}

/// Load `.env` from the working directory. A missing file is fine; an
/// unreadable or malformed one is an error.
pub fn load_dotenv() -> Result<(), ConfigError> {
    dotenv_outcome(dotenvy::dotenv().map(|_| ()))
}

fn dotenv_outcome(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => Ok(other?),
    }
}

/// Service configuration deserialized from environment variables.
///
/// Field names map to upper-cased env vars (`supabase_url` → `SUPABASE_URL`).
/// Implementors derive `serde::Deserialize` and use `#[serde(default = ...)]`
/// for optional settings.
pub trait Config: Sized + DeserializeOwned {
    /// Load a `.env` file from the working directory (if any), then read the
    /// process environment. Variables already set in the environment win over
    /// `.env` entries.
    fn from_env() -> Result<Self, ConfigError> {
        load_dotenv()?;
        Ok(envy::from_env()?)
    }

    /// Deserialize from explicit key/value pairs instead of the process environment.
    fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
