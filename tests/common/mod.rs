#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use geotype::provider::{
    AutocompleteOptions, DirectionsRendererOptions, DirectionsRequest, DirectionsResult,
    GeocoderGeometry, GeocoderRequest, GeocoderResult, MapOptions, MarkerOptions, PlaceDetails,
    PlaceDetailsRequest, PlacesAttribution, Settlement,
};
use geotype::{
    AutocompleteHandle, Document, Element, LatLng, LoadSignal, MapHandle, MapsConfig,
    MapsProvider, MapsService, MarkerHandle, RendererHandle, Reply, ScriptLoader, ServiceStatus,
};

/// Provider double that records every call and answers remote lookups with
/// scripted settlements.
pub struct FakeProvider {
    next_id: AtomicU64,
    pub maps: Mutex<Vec<(MapHandle, Element, MapOptions)>>,
    pub markers: Mutex<HashMap<MarkerHandle, Option<MapHandle>>>,
    pub marker_options: Mutex<Vec<MarkerOptions>>,
    pub geocode_requests: Mutex<Vec<GeocoderRequest>>,
    pub geocode_reply: Mutex<Settlement<Vec<GeocoderResult>>>,
    pub route_requests: Mutex<Vec<DirectionsRequest>>,
    pub route_reply: Mutex<Settlement<DirectionsResult>>,
    pub renderers: Mutex<Vec<(RendererHandle, DirectionsRendererOptions, Option<DirectionsResult>)>>,
    pub autocompletes: Mutex<Vec<(AutocompleteHandle, Element, AutocompleteOptions)>>,
    pub place_requests: Mutex<Vec<(PlacesAttribution, PlaceDetailsRequest)>>,
    pub place_reply: Mutex<Settlement<PlaceDetails>>,
    /// When set, remote calls drop their reply instead of settling it
    pub drop_replies: AtomicBool,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            maps: Mutex::new(Vec::new()),
            markers: Mutex::new(HashMap::new()),
            marker_options: Mutex::new(Vec::new()),
            geocode_requests: Mutex::new(Vec::new()),
            geocode_reply: Mutex::new((Some(vec![geocoder_result("Somewhere", 1.0, 2.0)]), ServiceStatus::Ok)),
            route_requests: Mutex::new(Vec::new()),
            route_reply: Mutex::new((Some(DirectionsResult::default()), ServiceStatus::Ok)),
            renderers: Mutex::new(Vec::new()),
            autocompletes: Mutex::new(Vec::new()),
            place_requests: Mutex::new(Vec::new()),
            place_reply: Mutex::new((Some(PlaceDetails::default()), ServiceStatus::Ok)),
            drop_replies: AtomicBool::new(false),
        })
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn script_geocode(&self, results: Option<Vec<GeocoderResult>>, status: ServiceStatus) {
        *self.geocode_reply.lock().unwrap() = (results, status);
    }

    pub fn script_route(&self, result: Option<DirectionsResult>, status: ServiceStatus) {
        *self.route_reply.lock().unwrap() = (result, status);
    }

    pub fn script_place(&self, result: Option<PlaceDetails>, status: ServiceStatus) {
        *self.place_reply.lock().unwrap() = (result, status);
    }

    /// The map a marker is attached to; `None` when detached
    pub fn marker_map(&self, marker: MarkerHandle) -> Option<MapHandle> {
        self.markers.lock().unwrap().get(&marker).copied().flatten()
    }

    fn answer<T: Clone>(&self, reply: Reply<T>, scripted: &Mutex<Settlement<T>>) {
        if self.drop_replies.load(Ordering::SeqCst) {
            drop(reply);
            return;
        }
        let (result, status) = scripted.lock().unwrap().clone();
        reply.send(result, status);
    }
}

impl MapsProvider for FakeProvider {
    fn create_map(&self, element: &Element, options: &MapOptions) -> MapHandle {
        let handle = MapHandle(self.next_id());
        self.maps
            .lock()
            .unwrap()
            .push((handle, element.clone(), options.clone()));
        handle
    }

    fn create_marker(&self, options: &MarkerOptions) -> MarkerHandle {
        let handle = MarkerHandle(self.next_id());
        self.markers.lock().unwrap().insert(handle, options.map);
        self.marker_options.lock().unwrap().push(options.clone());
        handle
    }

    fn set_marker_map(&self, marker: MarkerHandle, map: Option<MapHandle>) {
        if let Some(slot) = self.markers.lock().unwrap().get_mut(&marker) {
            *slot = map;
        }
    }

    fn geocode(&self, request: GeocoderRequest, reply: Reply<Vec<GeocoderResult>>) {
        self.geocode_requests.lock().unwrap().push(request);
        self.answer(reply, &self.geocode_reply);
    }

    fn route(&self, request: DirectionsRequest, reply: Reply<DirectionsResult>) {
        self.route_requests.lock().unwrap().push(request);
        self.answer(reply, &self.route_reply);
    }

    fn create_directions_renderer(&self, options: &DirectionsRendererOptions) -> RendererHandle {
        let handle = RendererHandle(self.next_id());
        self.renderers
            .lock()
            .unwrap()
            .push((handle, options.clone(), None));
        handle
    }

    fn set_directions(&self, renderer: RendererHandle, directions: &DirectionsResult) {
        for entry in self.renderers.lock().unwrap().iter_mut() {
            if entry.0 == renderer {
                entry.2 = Some(directions.clone());
            }
        }
    }

    fn create_autocomplete(
        &self,
        input: &Element,
        options: &AutocompleteOptions,
    ) -> AutocompleteHandle {
        let handle = AutocompleteHandle(self.next_id());
        self.autocompletes
            .lock()
            .unwrap()
            .push((handle, input.clone(), options.clone()));
        handle
    }

    fn place_details(
        &self,
        attribution: PlacesAttribution,
        request: PlaceDetailsRequest,
        reply: Reply<PlaceDetails>,
    ) {
        self.place_requests
            .lock()
            .unwrap()
            .push((attribution, request));
        self.answer(reply, &self.place_reply);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadMode {
    /// Settle successfully inside `load`
    Succeed,
    /// Fail inside `load`
    Fail(String),
    /// Keep the signal until the test releases it
    Hold,
}

/// Loader double counting load requests
pub struct FakeLoader {
    provider: Arc<FakeProvider>,
    mode: Mutex<LoadMode>,
    loads: AtomicUsize,
    held: Mutex<Vec<LoadSignal>>,
}

impl FakeLoader {
    pub fn new(provider: Arc<FakeProvider>, mode: LoadMode) -> Arc<Self> {
        Arc::new(Self {
            provider,
            mode: Mutex::new(mode),
            loads: AtomicUsize::new(0),
            held: Mutex::new(Vec::new()),
        })
    }

    pub fn set_mode(&self, mode: LoadMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn held_count(&self) -> usize {
        self.held.lock().unwrap().len()
    }

    /// Settles the oldest held signal successfully
    pub fn release(&self) {
        let signal = self.held.lock().unwrap().remove(0);
        signal.succeed(self.provider.clone());
    }

    /// Fails the oldest held signal
    pub fn fail_held(&self, reason: &str) {
        let signal = self.held.lock().unwrap().remove(0);
        signal.fail(reason);
    }
}

impl ScriptLoader for FakeLoader {
    fn load(&self, _config: &MapsConfig, signal: LoadSignal) {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            LoadMode::Succeed => signal.succeed(self.provider.clone()),
            LoadMode::Fail(reason) => signal.fail(reason),
            LoadMode::Hold => self.held.lock().unwrap().push(signal),
        }
    }
}

pub fn geocoder_result(address: &str, lat: f64, lng: f64) -> GeocoderResult {
    GeocoderResult {
        formatted_address: Some(address.to_string()),
        place_id: Some(format!("place-{}", address.to_lowercase().replace(' ', "-"))),
        address_components: None,
        geometry: GeocoderGeometry {
            location: LatLng::new(lat, lng),
            location_type: None,
            viewport: None,
            bounds: None,
        },
        types: vec![],
        partial_match: None,
    }
}

/// A service over a fresh document using `loader`
pub fn hosted_service(loader: Arc<FakeLoader>) -> (MapsService, Document) {
    let document = Document::new();
    let service = MapsService::builder(MapsConfig::new("test-api-key"))
        .with_document(document.clone())
        .with_shared_loader(loader)
        .build();
    (service, document)
}

/// A loaded service with a map on `#map`
pub async fn service_with_map() -> (MapsService, Arc<FakeProvider>, MapHandle) {
    let provider = FakeProvider::new();
    let (service, document) = hosted_service(FakeLoader::new(provider.clone(), LoadMode::Succeed));
    document.append_element("div", "map");
    let map = service
        .init_map("map", MapOptions::new(LatLng::new(40.7128, -74.0060), 12.0))
        .await
        .unwrap();
    (service, provider, map)
}

/// Local HTTP server answering one connection at a time with the next
/// canned `(status, body)`. Returns its base URL and the request lines it
/// has seen.
pub async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let head = String::from_utf8_lossy(&head);
            seen.lock()
                .unwrap()
                .push(head.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                if status < 400 { "OK" } else { "Error" },
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (base_url, requests)
}

/// Local server that accepts connections and never answers
pub async fn serve_silently() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    base_url
}

/// A base URL nothing is listening on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
