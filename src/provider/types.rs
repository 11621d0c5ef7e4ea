//! Request records, construction options and raw payloads exchanged with
//! the provider runtime.
//!
//! Payload field names follow the provider's wire format so the same types
//! decode the web-service JSON directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};

use super::handles::MapHandle;
use crate::core::geo::{LatLng, LatLngBounds};
use crate::host::Element;

/// Fields requested from place details when the caller names none
pub const DEFAULT_PLACE_FIELDS: &[&str] =
    &["address_components", "geometry", "name", "formatted_address"];

// ---------------------------------------------------------------------------
// Construction options
// ---------------------------------------------------------------------------

/// Options for constructing a map. Unknown provider options ride along in
/// `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<Value>,
    #[serde(default, rename = "disableDefaultUI", skip_serializing_if = "Option::is_none")]
    pub disable_default_ui: Option<bool>,
    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}

impl MapOptions {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            map_type_id: None,
            styles: Vec::new(),
            disable_default_ui: None,
            extra: JsonMap::new(),
        }
    }

    pub fn with_map_type(mut self, map_type_id: impl Into<String>) -> Self {
        self.map_type_id = Some(map_type_id.into());
        self
    }

    pub fn with_default_ui_disabled(mut self, disabled: bool) -> Self {
        self.disable_default_ui = Some(disabled);
        self
    }

    /// Passes an arbitrary provider option through
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOptions {
    pub position: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    /// Map to attach to. The facade fills this in from its current map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapHandle>,
    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}

impl MarkerOptions {
    pub fn new(position: LatLng) -> Self {
        Self {
            position,
            title: None,
            label: None,
            draggable: None,
            map: None,
            extra: JsonMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_map(mut self, map: MapHandle) -> Self {
        self.map = Some(map);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsRendererOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_markers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_viewport: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_index: Option<usize>,
    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentRestrictions {
    pub country: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_restrictions: Option<ComponentRestrictions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LatLngBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_bounds: Option<bool>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum GeocoderRequest {
    Address(String),
    Location(LatLng),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// The `mode` query value of the directions web service
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

/// A route endpoint or intermediate stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Waypoint {
    Address(String),
    Location(LatLng),
    PlaceId(String),
}

impl Waypoint {
    pub fn to_query(&self) -> String {
        match self {
            Self::Address(address) => address.clone(),
            Self::Location(location) => location.to_string(),
            Self::PlaceId(place_id) => format!("place_id:{}", place_id),
        }
    }
}

impl From<&str> for Waypoint {
    fn from(address: &str) -> Self {
        Self::Address(address.to_string())
    }
}

impl From<String> for Waypoint {
    fn from(address: String) -> Self {
        Self::Address(address)
    }
}

impl From<LatLng> for Waypoint {
    fn from(location: LatLng) -> Self {
        Self::Location(location)
    }
}

/// Caller overrides for a directions request; unset fields take defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionsOptions {
    pub travel_mode: Option<TravelMode>,
    pub waypoints: Vec<Waypoint>,
    pub optimize_waypoints: Option<bool>,
    pub alternatives: Option<bool>,
    pub avoid_highways: Option<bool>,
    pub avoid_tolls: Option<bool>,
    pub avoid_ferries: Option<bool>,
}

impl DirectionsOptions {
    pub fn travel_mode(mut self, mode: TravelMode) -> Self {
        self.travel_mode = Some(mode);
        self
    }

    pub fn waypoint(mut self, waypoint: impl Into<Waypoint>) -> Self {
        self.waypoints.push(waypoint.into());
        self
    }

    pub fn alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = Some(alternatives);
        self
    }

    pub fn avoid_tolls(mut self, avoid: bool) -> Self {
        self.avoid_tolls = Some(avoid);
        self
    }

    pub fn avoid_highways(mut self, avoid: bool) -> Self {
        self.avoid_highways = Some(avoid);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub travel_mode: TravelMode,
    pub waypoints: Vec<Waypoint>,
    pub optimize_waypoints: bool,
    pub alternatives: bool,
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub avoid_ferries: bool,
}

impl DirectionsRequest {
    /// Merges caller options over the defaults (driving, no avoidance)
    pub fn new(origin: Waypoint, destination: Waypoint, options: DirectionsOptions) -> Self {
        Self {
            origin,
            destination,
            travel_mode: options.travel_mode.unwrap_or_default(),
            waypoints: options.waypoints,
            optimize_waypoints: options.optimize_waypoints.unwrap_or(false),
            alternatives: options.alternatives.unwrap_or(false),
            avoid_highways: options.avoid_highways.unwrap_or(false),
            avoid_tolls: options.avoid_tolls.unwrap_or(false),
            avoid_ferries: options.avoid_ferries.unwrap_or(false),
        }
    }

    /// `avoid` query value, e.g. `tolls|highways`
    pub fn avoid_query(&self) -> Option<String> {
        let avoid: Vec<&str> = [
            (self.avoid_tolls, "tolls"),
            (self.avoid_highways, "highways"),
            (self.avoid_ferries, "ferries"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        (!avoid.is_empty()).then(|| avoid.join("|"))
    }

    /// `waypoints` query value, prefixed with `optimize:true` when asked
    pub fn waypoints_query(&self) -> Option<String> {
        if self.waypoints.is_empty() {
            return None;
        }
        let mut parts: Vec<String> = Vec::with_capacity(self.waypoints.len() + 1);
        if self.optimize_waypoints {
            parts.push("optimize:true".to_string());
        }
        parts.extend(self.waypoints.iter().map(Waypoint::to_query));
        Some(parts.join("|"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDetailsRequest {
    pub place_id: String,
    pub fields: Vec<String>,
}

/// Where the places service renders its attributions
#[derive(Debug, Clone, PartialEq)]
pub enum PlacesAttribution {
    Map(MapHandle),
    Element(Element),
}

// ---------------------------------------------------------------------------
// Raw payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderAddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderGeometry {
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<LatLngBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LatLngBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub address_components: Option<Vec<GeocoderAddressComponent>>,
    pub geometry: GeocoderGeometry,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_match: Option<bool>,
}

/// A distance or duration with its display text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsStep {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default)]
    pub html_instructions: Option<String>,
    #[serde(default)]
    pub travel_mode: Option<String>,
    #[serde(default)]
    pub polyline: Option<Polyline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsLeg {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub start_address: Option<String>,
    #[serde(default)]
    pub end_address: Option<String>,
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default)]
    pub steps: Vec<DirectionsStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
    #[serde(default)]
    pub bounds: Option<LatLngBounds>,
    #[serde(default)]
    pub overview_polyline: Option<Polyline>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub waypoint_order: Vec<usize>,
    #[serde(default)]
    pub copyrights: Option<String>,
}

impl DirectionsRoute {
    /// Sum of leg distances in meters
    pub fn distance_meters(&self) -> f64 {
        self.legs
            .iter()
            .filter_map(|leg| leg.distance.as_ref())
            .map(|d| d.value)
            .sum()
    }

    /// Sum of leg durations in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.legs
            .iter()
            .filter_map(|leg| leg.duration.as_ref())
            .map(|d| d.value)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedWaypoint {
    #[serde(default)]
    pub geocoder_status: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResult {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    #[serde(default)]
    pub geocoded_waypoints: Vec<GeocodedWaypoint>,
}

/// Place details as returned by the provider. Fields that were not
/// requested are absent; anything not modelled here lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Option<Vec<GeocoderAddressComponent>>,
    #[serde(default)]
    pub geometry: Option<GeocoderGeometry>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}
