//! # geotype
//!
//! A typed, lazily-loaded facade over the Google Maps platform.
//!
//! The provider runtime is fetched on first use through a single-flight
//! [`LoadGate`]; every facade operation waits on that gate, delegates to the
//! loaded [`MapsProvider`], and reshapes what comes back. Geocoding,
//! directions, place details, markers and autocomplete are exposed through
//! [`MapsService`].

pub mod core;
pub mod host;
pub mod loader;
pub mod prelude;
pub mod provider;
pub mod runtime;
pub mod service;

use std::fmt;

// Re-export public API
pub use crate::core::{
    config::MapsConfig,
    geo::{LatLng, LatLngBounds},
};

pub use host::{Document, Element, ElementTarget, ScriptTag};

pub use loader::{
    HttpLoader, LoadFailure, LoadGate, LoadSignal, LoadState, ReadyLoader, ScriptLoader,
};

pub use provider::{
    AutocompleteHandle, MapHandle, MapsProvider, MarkerHandle, RendererHandle, Reply,
    ServiceStatus, TransportFailure, WebServiceProvider,
};

pub use service::{AddressComponent, GeocodingResult, MapsService, MapsServiceBuilder};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, GeoError>;

/// The remote lookups a [`GeoError::Remote`] can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Geocode,
    ReverseGeocode,
    Directions,
    PlaceDetails,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Geocode => "Geocoding",
            Self::ReverseGeocode => "Reverse geocoding",
            Self::Directions => "Directions request",
            Self::PlaceDetails => "Place details request",
        })
    }
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Google Maps can only be loaded in a browser environment")]
    Environment,

    #[error("Google Maps script failed to load: {0}")]
    Load(#[from] LoadFailure),

    #[error("{kind} element not found: {target}")]
    ElementNotFound { kind: &'static str, target: String },

    #[error("{0}")]
    Precondition(String),

    #[error("{operation} failed: {status}")]
    Remote {
        operation: Operation,
        status: ServiceStatus,
    },

    #[error("{operation} failed: {failure}")]
    Transport {
        operation: Operation,
        #[source]
        failure: TransportFailure,
    },

    #[error("{operation} reply was dropped before it settled")]
    ReplyDropped { operation: Operation },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GeoError {
    /// Provider status carried by a remote failure
    pub fn status(&self) -> Option<&ServiceStatus> {
        match self {
            Self::Remote { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Whether re-invoking the operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Load(_) | Self::ReplyDropped { .. } => true,
            Self::Transport { failure, .. } => matches!(failure, TransportFailure::Network(_)),
            Self::Remote { status, .. } => matches!(
                status,
                ServiceStatus::OverQueryLimit | ServiceStatus::UnknownError
            ),
            _ => false,
        }
    }
}

/// Error type alias for convenience
pub type Error = GeoError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeoError::Remote {
            operation: Operation::Geocode,
            status: ServiceStatus::ZeroResults,
        };
        assert_eq!(err.to_string(), "Geocoding failed: ZERO_RESULTS");
        assert_eq!(err.status(), Some(&ServiceStatus::ZeroResults));
        assert!(!err.is_retryable());

        let err = GeoError::ElementNotFound {
            kind: "Map",
            target: "no-such-id".to_string(),
        };
        assert_eq!(err.to_string(), "Map element not found: no-such-id");

        let err = GeoError::from(LoadFailure::new("connection refused"));
        assert!(err.to_string().contains("connection refused"));
        assert!(err.is_retryable());

        let err = GeoError::Transport {
            operation: Operation::Directions,
            failure: TransportFailure::Malformed("expected value at line 1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Directions request failed: malformed response: expected value at line 1"
        );
        assert_eq!(err.status(), None);
        assert!(!err.is_retryable());

        let err = GeoError::Transport {
            operation: Operation::Geocode,
            failure: TransportFailure::Network("connection reset".to_string()),
        };
        assert!(err.is_retryable());
    }
}
