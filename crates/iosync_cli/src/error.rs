//! CLI failure classification.

use iosync_core::SyncError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Config(String),
    Logging(String),
    Output(String),
    Sync(SyncError),
}

impl CliError {
    /// Stable code printed as `error[<code>]`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Logging(_) => "logging_error",
            Self::Output(_) => "output_error",
            Self::Sync(err) => err.kind().code(),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(message) | Self::Logging(message) | Self::Output(message) => {
                write!(f, "{message}")
            }
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SyncError> for CliError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

#[cfg(test)]
mod tests {
    use super::CliError;
    use iosync_core::{Category, InstrumentKey, SyncError};

    #[test]
    fn sync_errors_keep_engine_codes() {
        let err = CliError::from(SyncError::UnknownKey {
            section: Category::AnalogInput,
            row: 3,
            key: InstrumentKey::new(9, "TT-9"),
        });
        assert_eq!(err.code(), "unknown_key");
        assert_eq!(CliError::Config("bad".to_string()).code(), "config_error");
    }
}
