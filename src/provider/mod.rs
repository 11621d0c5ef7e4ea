//! The external mapping runtime, as seen from the facade
//!
//! Once the loader has bootstrapped the provider, the facade talks to it
//! exclusively through [`MapsProvider`]. Object construction is synchronous;
//! remote lookups keep the provider's callback shape and settle through a
//! one-shot [`Reply`].

pub mod handles;
pub mod reply;
pub mod status;
pub mod types;
pub mod web;

pub use handles::{AutocompleteHandle, MapHandle, MarkerHandle, RendererHandle};
pub use reply::{PendingReply, Reply, ReplyOutcome, Settlement, TransportFailure};
pub use status::ServiceStatus;
pub use types::*;
pub use web::WebServiceProvider;

use crate::host::Element;

/// A loaded provider runtime
pub trait MapsProvider: Send + Sync {
    /// Constructs a map on the given host element
    fn create_map(&self, element: &Element, options: &MapOptions) -> MapHandle;

    /// Constructs a marker, attached to `options.map` when set
    fn create_marker(&self, options: &MarkerOptions) -> MarkerHandle;

    /// Attaches a marker to a map, or detaches it with `None`
    fn set_marker_map(&self, marker: MarkerHandle, map: Option<MapHandle>);

    /// Address-to-location or location-to-address lookup
    fn geocode(&self, request: GeocoderRequest, reply: Reply<Vec<GeocoderResult>>);

    /// Route computation
    fn route(&self, request: DirectionsRequest, reply: Reply<DirectionsResult>);

    fn create_directions_renderer(&self, options: &DirectionsRendererOptions) -> RendererHandle;

    fn set_directions(&self, renderer: RendererHandle, directions: &DirectionsResult);

    /// Attaches place text-completion to an input element
    fn create_autocomplete(
        &self,
        input: &Element,
        options: &AutocompleteOptions,
    ) -> AutocompleteHandle;

    fn place_details(
        &self,
        attribution: PlacesAttribution,
        request: PlaceDetailsRequest,
        reply: Reply<PlaceDetails>,
    );
}
