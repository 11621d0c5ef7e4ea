use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::markers::MarkerRegistry;
use super::results::GeocodingResult;
use crate::core::config::MapsConfig;
use crate::core::geo::LatLng;
use crate::host::{Document, ElementTarget, ScriptTag};
use crate::loader::{HttpLoader, LoadGate, LoadState, ScriptLoader};
use crate::provider::{
    AutocompleteHandle, AutocompleteOptions, DirectionsOptions, DirectionsRendererOptions,
    DirectionsRequest, DirectionsResult, GeocoderRequest, MapHandle, MapOptions, MapsProvider,
    MarkerHandle, MarkerOptions, PendingReply, PlaceDetails, PlaceDetailsRequest,
    PlacesAttribution, Reply, ServiceStatus, Waypoint, DEFAULT_PLACE_FIELDS,
};
use crate::{GeoError, Operation, Result};

const NO_MAP_FOR_MARKERS: &str = "Map must be initialized before creating markers";
const NO_MAP_AVAILABLE: &str =
    "No map instance available. Initialize a map first or provide a map in options.";

/// Builder for [`MapsService`]
pub struct MapsServiceBuilder {
    config: MapsConfig,
    document: Option<Document>,
    loader: Option<Arc<dyn ScriptLoader>>,
}

impl MapsServiceBuilder {
    /// Host document to load into. Without one the service behaves as if
    /// it runs outside a browser and every load fails with
    /// [`GeoError::Environment`].
    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    /// Loader used to bootstrap the runtime; defaults to [`HttpLoader`]
    pub fn with_loader<L: ScriptLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn with_shared_loader(mut self, loader: Arc<dyn ScriptLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn build(self) -> MapsService {
        MapsService {
            config: self.config,
            document: self.document,
            loader: self
                .loader
                .unwrap_or_else(|| Arc::new(HttpLoader::default())),
            gate: LoadGate::new(),
            map: Mutex::new(None),
            markers: Mutex::new(MarkerRegistry::new()),
        }
    }
}

/// Lazily-loading facade over the Google Maps runtime.
///
/// Nothing is fetched at construction. The first operation that needs the
/// runtime triggers exactly one load; concurrent callers share it.
pub struct MapsService {
    config: MapsConfig,
    document: Option<Document>,
    loader: Arc<dyn ScriptLoader>,
    gate: LoadGate,
    map: Mutex<Option<MapHandle>>,
    markers: Mutex<MarkerRegistry>,
}

impl MapsService {
    /// Creates a service hosted in `document` that loads over HTTP
    pub fn new(config: MapsConfig, document: Document) -> Self {
        Self::builder(config).with_document(document).build()
    }

    pub fn builder(config: MapsConfig) -> MapsServiceBuilder {
        MapsServiceBuilder {
            config,
            document: None,
            loader: None,
        }
    }

    pub fn config(&self) -> &MapsConfig {
        &self.config
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        self.gate.state()
    }

    pub fn is_loaded(&self) -> bool {
        self.gate.is_loaded()
    }

    pub fn gate(&self) -> &LoadGate {
        &self.gate
    }

    /// The map created by the last successful [`init_map`](Self::init_map)
    pub fn map(&self) -> Option<MapHandle> {
        *lock(&self.map)
    }

    /// Markers created through this service, in creation order
    pub fn markers(&self) -> Vec<MarkerHandle> {
        lock(&self.markers).handles().to_vec()
    }

    /// Loads the runtime if it is not loaded yet
    pub async fn load_api(&self) -> Result<()> {
        self.runtime().await.map(|_| ())
    }

    async fn runtime(&self) -> Result<Arc<dyn MapsProvider>> {
        let document = self.document.as_ref().ok_or(GeoError::Environment)?;

        let provider = self
            .gate
            .ensure_loaded(|signal| match self.config.script_url() {
                Ok(src) => {
                    document.append_script(ScriptTag::deferred(src));
                    self.loader.load(&self.config, signal);
                }
                Err(e) => signal.fail(e.to_string()),
            })
            .await?;
        Ok(provider)
    }

    fn resolve(&self, kind: &'static str, target: &ElementTarget) -> Result<crate::host::Element> {
        self.document
            .as_ref()
            .and_then(|document| document.resolve(target))
            .ok_or_else(|| GeoError::ElementNotFound {
                kind,
                target: target.describe(),
            })
    }

    /// Constructs a map on the target element and makes it the current map
    pub async fn init_map(
        &self,
        target: impl Into<ElementTarget>,
        options: MapOptions,
    ) -> Result<MapHandle> {
        let target = target.into();
        let provider = self.runtime().await?;
        let element = self.resolve("Map", &target)?;

        let map = provider.create_map(&element, &options);
        *lock(&self.map) = Some(map);
        log::debug!("created {} on {}", map, target.describe());
        Ok(map)
    }

    /// Creates a marker on the current map. Requires a prior
    /// [`init_map`](Self::init_map); never suspends.
    pub fn create_marker(&self, mut options: MarkerOptions) -> Result<MarkerHandle> {
        let map = self
            .map()
            .ok_or_else(|| GeoError::Precondition(NO_MAP_FOR_MARKERS.to_string()))?;
        let provider = self
            .gate
            .provider()
            .ok_or_else(|| GeoError::Precondition(NO_MAP_FOR_MARKERS.to_string()))?;

        options.map = Some(map);
        Ok(self.register_marker(provider.create_marker(&options)))
    }

    /// Creates a marker on `options.map`, or on the current map when unset
    pub async fn add_marker(&self, mut options: MarkerOptions) -> Result<MarkerHandle> {
        let provider = self.runtime().await?;
        let map = options
            .map
            .or_else(|| self.map())
            .ok_or_else(|| GeoError::Precondition(NO_MAP_AVAILABLE.to_string()))?;

        options.map = Some(map);
        Ok(self.register_marker(provider.create_marker(&options)))
    }

    fn register_marker(&self, marker: MarkerHandle) -> MarkerHandle {
        lock(&self.markers).insert(marker);
        log::debug!("registered {}", marker);
        marker
    }

    /// Detaches and forgets a marker created by this service. Returns false
    /// without touching anything for markers it does not know.
    pub fn remove_marker(&self, marker: MarkerHandle) -> bool {
        if !lock(&self.markers).remove(marker) {
            return false;
        }
        if let Some(provider) = self.gate.provider() {
            provider.set_marker_map(marker, None);
        }
        true
    }

    /// Detaches every registered marker and empties the registry. Returns
    /// how many were removed.
    pub fn clear_markers(&self) -> usize {
        let markers = lock(&self.markers).drain();
        if let Some(provider) = self.gate.provider() {
            for marker in &markers {
                provider.set_marker_map(*marker, None);
            }
        }
        markers.len()
    }

    /// Address to location lookup
    pub async fn geocode_address(&self, address: &str) -> Result<Vec<GeocodingResult>> {
        let provider = self.runtime().await?;
        let (reply, pending) = Reply::channel();
        provider.geocode(GeocoderRequest::Address(address.to_string()), reply);

        let results = settle(Operation::Geocode, pending).await?;
        if results.is_empty() {
            return Err(remote_error(Operation::Geocode, ServiceStatus::ZeroResults));
        }
        Ok(results
            .into_iter()
            .map(|raw| GeocodingResult::from_address_lookup(address, raw))
            .collect())
    }

    /// Location to address lookup
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Vec<GeocodingResult>> {
        let location = LatLng::new(lat, lng);
        let provider = self.runtime().await?;
        let (reply, pending) = Reply::channel();
        provider.geocode(GeocoderRequest::Location(location), reply);

        let results = settle(Operation::ReverseGeocode, pending).await?;
        if results.is_empty() {
            return Err(remote_error(
                Operation::ReverseGeocode,
                ServiceStatus::ZeroResults,
            ));
        }
        Ok(results
            .into_iter()
            .map(|raw| GeocodingResult::from_location_lookup(location, raw))
            .collect())
    }

    /// Computes a route; travel mode defaults to driving
    pub async fn get_directions(
        &self,
        origin: impl Into<Waypoint>,
        destination: impl Into<Waypoint>,
        options: DirectionsOptions,
    ) -> Result<DirectionsResult> {
        let request = DirectionsRequest::new(origin.into(), destination.into(), options);
        let provider = self.runtime().await?;
        let (reply, pending) = Reply::channel();
        provider.route(request, reply);

        settle(Operation::Directions, pending).await
    }

    /// Draws a route on `options.map`, or on the current map when unset
    pub async fn display_directions(
        &self,
        directions: &DirectionsResult,
        mut options: DirectionsRendererOptions,
    ) -> Result<crate::provider::RendererHandle> {
        let provider = self.runtime().await?;
        let map = options
            .map
            .or_else(|| self.map())
            .ok_or_else(|| GeoError::Precondition(NO_MAP_AVAILABLE.to_string()))?;

        options.map = Some(map);
        let renderer = provider.create_directions_renderer(&options);
        provider.set_directions(renderer, directions);
        Ok(renderer)
    }

    /// Attaches place autocompletion to an input element
    pub async fn create_autocomplete(
        &self,
        target: impl Into<ElementTarget>,
        options: AutocompleteOptions,
    ) -> Result<AutocompleteHandle> {
        let target = target.into();
        let provider = self.runtime().await?;
        let input = self.resolve("Input", &target)?;

        Ok(provider.create_autocomplete(&input, &options))
    }

    /// Fetches details for a place. `None` requests the address components,
    /// geometry, name and formatted address.
    pub async fn get_place_details(
        &self,
        place_id: &str,
        fields: Option<&[&str]>,
    ) -> Result<PlaceDetails> {
        let provider = self.runtime().await?;
        let fields = fields
            .unwrap_or(DEFAULT_PLACE_FIELDS)
            .iter()
            .map(|field| field.to_string())
            .collect();

        let attribution = match (self.map(), self.document.as_ref()) {
            (Some(map), _) => PlacesAttribution::Map(map),
            (None, Some(document)) => PlacesAttribution::Element(document.create_element("div")),
            (None, None) => return Err(GeoError::Environment),
        };

        let (reply, pending) = Reply::channel();
        provider.place_details(
            attribution,
            PlaceDetailsRequest {
                place_id: place_id.to_string(),
                fields,
            },
            reply,
        );
        settle(Operation::PlaceDetails, pending).await
    }
}

impl std::fmt::Debug for MapsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsService")
            .field("config", &self.config)
            .field("hosted", &self.document.is_some())
            .field("gate", &self.gate)
            .field("map", &self.map())
            .field("markers", &self.markers().len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remote_error(operation: Operation, status: ServiceStatus) -> GeoError {
    log::warn!("{} failed: {}", operation, status);
    GeoError::Remote { operation, status }
}

/// Waits for a provider callback and maps its status onto the error
/// taxonomy. `OK` without a payload counts as `ZERO_RESULTS`; calls that
/// never got a status surface as [`GeoError::Transport`].
async fn settle<T>(operation: Operation, pending: PendingReply<T>) -> Result<T> {
    match pending.await {
        Ok(Ok((Some(result), status))) if status.is_ok() => Ok(result),
        Ok(Ok((_, status))) if status.is_ok() => {
            Err(remote_error(operation, ServiceStatus::ZeroResults))
        }
        Ok(Ok((_, status))) => Err(remote_error(operation, status)),
        Ok(Err(failure)) => {
            log::warn!("{} failed before the provider answered: {}", operation, failure);
            Err(GeoError::Transport { operation, failure })
        }
        Err(_) => Err(GeoError::ReplyDropped { operation }),
    }
}
