//! Provider runtime backed by the platform's HTTP web services
//!
//! Lookups (geocoding, directions, place details) go over the wire with
//! `reqwest`. Maps, markers, renderers and autocompletes have nothing to
//! draw on outside a browser, so they are kept as in-memory overlays that
//! can be inspected.

use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{
    AutocompleteHandle, AutocompleteOptions, DirectionsRendererOptions, DirectionsRequest,
    DirectionsResult, GeocoderRequest, GeocoderResult, MapHandle, MapOptions, MapsProvider,
    MarkerHandle, MarkerOptions, PlaceDetails, PlaceDetailsRequest, PlacesAttribution,
    RendererHandle, Reply, ServiceStatus, TransportFailure,
};
use crate::core::config::MapsConfig;
use crate::host::Element;
use crate::prelude::HashMap;
use crate::runtime;

/// Root of the JSON web services
pub const WEB_SERVICE_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Shared async HTTP client for the web services and the script loader.
/// Only connecting is bounded; a request the server never answers stays
/// pending.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("geotype/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(std::time::Duration::from_secs(10))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
});

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: ServiceStatus,
    #[serde(default)]
    results: Vec<GeocoderResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: ServiceStatus,
    #[serde(flatten)]
    result: DirectionsResult,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    status: ServiceStatus,
    #[serde(default)]
    result: Option<PlaceDetails>,
    #[serde(default)]
    error_message: Option<String>,
}

/// A web-service payload that carries a status and an optional payload
trait Envelope: DeserializeOwned + Send + 'static {
    type Payload: Send + 'static;

    fn settle(self) -> (Option<Self::Payload>, ServiceStatus, Option<String>);
}

impl Envelope for GeocodeResponse {
    type Payload = Vec<GeocoderResult>;

    fn settle(self) -> (Option<Self::Payload>, ServiceStatus, Option<String>) {
        let payload = self.status.is_ok().then_some(self.results);
        (payload, self.status, self.error_message)
    }
}

impl Envelope for DirectionsResponse {
    type Payload = DirectionsResult;

    fn settle(self) -> (Option<Self::Payload>, ServiceStatus, Option<String>) {
        let payload = self.status.is_ok().then_some(self.result);
        (payload, self.status, self.error_message)
    }
}

impl Envelope for PlaceDetailsResponse {
    type Payload = PlaceDetails;

    fn settle(self) -> (Option<Self::Payload>, ServiceStatus, Option<String>) {
        let payload = if self.status.is_ok() { self.result } else { None };
        (payload, self.status, self.error_message)
    }
}

#[derive(Debug, Clone)]
struct MapOverlay {
    element: Element,
    options: MapOptions,
}

#[derive(Debug, Clone)]
struct MarkerOverlay {
    options: MarkerOptions,
    map: Option<MapHandle>,
}

#[derive(Debug, Clone)]
struct RendererOverlay {
    options: DirectionsRendererOptions,
    directions: Option<DirectionsResult>,
}

#[derive(Debug, Clone)]
struct AutocompleteOverlay {
    input: Element,
    options: AutocompleteOptions,
}

#[derive(Debug, Default)]
struct Overlays {
    next_id: u64,
    maps: HashMap<MapHandle, MapOverlay>,
    markers: HashMap<MarkerHandle, MarkerOverlay>,
    renderers: HashMap<RendererHandle, RendererOverlay>,
    autocompletes: HashMap<AutocompleteHandle, AutocompleteOverlay>,
}

impl Overlays {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct WebServiceProvider {
    client: reqwest::Client,
    api_key: String,
    language: Option<String>,
    region: Option<String>,
    base_url: String,
    overlays: Mutex<Overlays>,
}

impl WebServiceProvider {
    /// Creates a provider scoped to the key, language and region of `config`
    pub fn new(config: &MapsConfig) -> Self {
        Self::with_client(HTTP_CLIENT.clone(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &MapsConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            region: config.region.clone(),
            base_url: WEB_SERVICE_BASE_URL.to_string(),
            overlays: Mutex::new(Overlays::default()),
        }
    }

    /// Points the provider at a different web-service root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn overlays(&self) -> MutexGuard<'_, Overlays> {
        self.overlays.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint(&self, service: &str) -> String {
        format!("{}/{}/json", self.base_url, service)
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("key", self.api_key.clone())];
        if let Some(language) = self.language.as_ref().filter(|l| !l.is_empty()) {
            params.push(("language", language.clone()));
        }
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            params.push(("region", region.clone()));
        }
        params
    }

    /// Issues the request on the global runtime and settles `reply` with
    /// whatever the service answers. Transport and decoding errors abort
    /// the reply without a status.
    fn dispatch<E: Envelope>(
        &self,
        operation: &'static str,
        service: &str,
        params: Vec<(&'static str, String)>,
        reply: Reply<E::Payload>,
    ) {
        let client = self.client.clone();
        let url = self.endpoint(service);

        runtime::spawn(async move {
            log::debug!("{} request to {}", operation, url);
            match fetch::<E>(&client, &url, &params).await {
                Ok(envelope) => {
                    let (payload, status, message) = envelope.settle();
                    if !status.is_ok() {
                        log::warn!(
                            "{} returned {}{}",
                            operation,
                            status,
                            message.map(|m| format!(": {}", m)).unwrap_or_default()
                        );
                    }
                    reply.send(payload, status);
                }
                Err(e) => {
                    log::warn!("{} request failed: {}", operation, e);
                    let failure = if e.is_decode() {
                        TransportFailure::Malformed(e.to_string())
                    } else {
                        TransportFailure::Network(e.to_string())
                    };
                    reply.abort(failure);
                }
            }
        });
    }

    pub fn map_count(&self) -> usize {
        self.overlays().maps.len()
    }

    pub fn map_options(&self, map: MapHandle) -> Option<MapOptions> {
        self.overlays().maps.get(&map).map(|m| m.options.clone())
    }

    pub fn map_element(&self, map: MapHandle) -> Option<Element> {
        self.overlays().maps.get(&map).map(|m| m.element.clone())
    }

    pub fn marker_count(&self) -> usize {
        self.overlays().markers.len()
    }

    pub fn marker_options(&self, marker: MarkerHandle) -> Option<MarkerOptions> {
        self.overlays().markers.get(&marker).map(|m| m.options.clone())
    }

    /// The map a marker is attached to, `None` when detached or unknown
    pub fn marker_map(&self, marker: MarkerHandle) -> Option<MapHandle> {
        self.overlays().markers.get(&marker).and_then(|m| m.map)
    }

    pub fn renderer_options(&self, renderer: RendererHandle) -> Option<DirectionsRendererOptions> {
        self.overlays()
            .renderers
            .get(&renderer)
            .map(|r| r.options.clone())
    }

    pub fn renderer_directions(&self, renderer: RendererHandle) -> Option<DirectionsResult> {
        self.overlays()
            .renderers
            .get(&renderer)
            .and_then(|r| r.directions.clone())
    }

    pub fn autocomplete_input(&self, autocomplete: AutocompleteHandle) -> Option<Element> {
        self.overlays()
            .autocompletes
            .get(&autocomplete)
            .map(|a| a.input.clone())
    }

    pub fn autocomplete_options(
        &self,
        autocomplete: AutocompleteHandle,
    ) -> Option<AutocompleteOptions> {
        self.overlays()
            .autocompletes
            .get(&autocomplete)
            .map(|a| a.options.clone())
    }
}

async fn fetch<E: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    params: &[(&'static str, String)],
) -> std::result::Result<E, reqwest::Error> {
    // Requests carry the key in the query string; keep it out of errors.
    client
        .get(url)
        .query(params)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| e.without_url())?
        .json::<E>()
        .await
        .map_err(|e| e.without_url())
}

impl MapsProvider for WebServiceProvider {
    fn create_map(&self, element: &Element, options: &MapOptions) -> MapHandle {
        let mut overlays = self.overlays();
        let handle = MapHandle(overlays.next_id());
        overlays.maps.insert(
            handle,
            MapOverlay {
                element: element.clone(),
                options: options.clone(),
            },
        );
        handle
    }

    fn create_marker(&self, options: &MarkerOptions) -> MarkerHandle {
        let mut overlays = self.overlays();
        let handle = MarkerHandle(overlays.next_id());
        overlays.markers.insert(
            handle,
            MarkerOverlay {
                options: options.clone(),
                map: options.map,
            },
        );
        handle
    }

    /// Detaching a marker releases its overlay; nothing can draw it again.
    fn set_marker_map(&self, marker: MarkerHandle, map: Option<MapHandle>) {
        let mut overlays = self.overlays();
        let known = match map {
            Some(map) => overlays
                .markers
                .get_mut(&marker)
                .map(|overlay| overlay.map = Some(map))
                .is_some(),
            None => overlays.markers.remove(&marker).is_some(),
        };
        if !known {
            log::debug!("set_marker_map on unknown {}", marker);
        }
    }

    fn geocode(&self, request: GeocoderRequest, reply: Reply<Vec<GeocoderResult>>) {
        let mut params = self.common_params();
        match request {
            GeocoderRequest::Address(address) => params.push(("address", address)),
            GeocoderRequest::Location(location) => params.push(("latlng", location.to_string())),
        }
        self.dispatch::<GeocodeResponse>("geocode", "geocode", params, reply);
    }

    fn route(&self, request: DirectionsRequest, reply: Reply<DirectionsResult>) {
        let mut params = self.common_params();
        params.push(("origin", request.origin.to_query()));
        params.push(("destination", request.destination.to_query()));
        params.push(("mode", request.travel_mode.as_query().to_string()));
        if let Some(waypoints) = request.waypoints_query() {
            params.push(("waypoints", waypoints));
        }
        if let Some(avoid) = request.avoid_query() {
            params.push(("avoid", avoid));
        }
        if request.alternatives {
            params.push(("alternatives", "true".to_string()));
        }
        self.dispatch::<DirectionsResponse>("directions", "directions", params, reply);
    }

    fn create_directions_renderer(&self, options: &DirectionsRendererOptions) -> RendererHandle {
        let mut overlays = self.overlays();
        let handle = RendererHandle(overlays.next_id());
        overlays.renderers.insert(
            handle,
            RendererOverlay {
                options: options.clone(),
                directions: None,
            },
        );
        handle
    }

    fn set_directions(&self, renderer: RendererHandle, directions: &DirectionsResult) {
        match self.overlays().renderers.get_mut(&renderer) {
            Some(overlay) => overlay.directions = Some(directions.clone()),
            None => log::debug!("set_directions on unknown {}", renderer),
        }
    }

    fn create_autocomplete(
        &self,
        input: &Element,
        options: &AutocompleteOptions,
    ) -> AutocompleteHandle {
        let mut overlays = self.overlays();
        let handle = AutocompleteHandle(overlays.next_id());
        overlays.autocompletes.insert(
            handle,
            AutocompleteOverlay {
                input: input.clone(),
                options: options.clone(),
            },
        );
        handle
    }

    fn place_details(
        &self,
        attribution: PlacesAttribution,
        request: PlaceDetailsRequest,
        reply: Reply<PlaceDetails>,
    ) {
        log::debug!("place details attributed to {:?}", attribution);
        let mut params = self.common_params();
        params.push(("place_id", request.place_id));
        if !request.fields.is_empty() {
            params.push(("fields", request.fields.join(",")));
        }
        self.dispatch::<PlaceDetailsResponse>("place details", "place/details", params, reply);
    }
}
