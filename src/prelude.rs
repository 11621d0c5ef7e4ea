//! Prelude module for common geotype types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use geotype::prelude::*;`

pub use crate::core::{
    config::MapsConfig,
    geo::{LatLng, LatLngBounds},
};

pub use crate::host::{Document, Element, ElementTarget};

pub use crate::loader::{HttpLoader, LoadGate, LoadSignal, LoadState, ReadyLoader, ScriptLoader};

pub use crate::provider::{
    AutocompleteOptions, DirectionsOptions, DirectionsRendererOptions, DirectionsResult,
    MapHandle, MapOptions, MapsProvider, MarkerHandle, MarkerOptions, PlaceDetails,
    ServiceStatus, TravelMode, Waypoint,
};

pub use crate::service::{GeocodingResult, MapsService};

pub use crate::{Error as GeoError, Result};

pub use std::{future::Future, pin::Pin, sync::Arc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
