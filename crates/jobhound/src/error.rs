use crate::config::ConfigError;
use crate::net::TransportError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::{ApplyError, ProfileError, StoreError};
use crate::workflows::listings::{CollectError, HistoryError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Transport(TransportError),
    Profile(ProfileError),
    Store(StoreError),
    History(HistoryError),
    Collect(CollectError),
    Apply(ApplyError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Transport(err) => write!(f, "http error: {}", err),
            AppError::Profile(err) => write!(f, "profile error: {}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::History(err) => write!(f, "history error: {}", err),
            AppError::Collect(err) => write!(f, "collection error: {}", err),
            AppError::Apply(err) => write!(f, "application error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Transport(err) => Some(err),
            AppError::Profile(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::History(err) => Some(err),
            AppError::Collect(err) => Some(err),
            AppError::Apply(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TransportError> for AppError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<ProfileError> for AppError {
    fn from(value: ProfileError) -> Self {
        Self::Profile(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<HistoryError> for AppError {
    fn from(value: HistoryError) -> Self {
        Self::History(value)
    }
}

impl From<CollectError> for AppError {
    fn from(value: CollectError) -> Self {
        Self::Collect(value)
    }
}

impl From<ApplyError> for AppError {
    fn from(value: ApplyError) -> Self {
        Self::Apply(value)
    }
}
