// Error type shared by the SPF engine, the route manager and the configuration loader

use std::error::Error as StdError;
use std::fmt;
use std::net::Ipv4Addr;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    IOError(std::io::Error),
    SerializationError(serde_json::Error),
    RoutingError(String),
    /// SPF was requested for a root that has no advertisement in the LSDB.
    UnknownRoot(Ipv4Addr),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::IOError(err) => write!(f, "IO error: {}", err),
            AppError::SerializationError(err) => write!(f, "Serialization error: {}", err),
            AppError::RoutingError(msg) => write!(f, "Routing error: {}", msg),
            AppError::UnknownRoot(root) => write!(f, "No advertisement for root router {}", root),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AppError::IOError(err) => Some(err),
            AppError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IOError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
