//! Configuration for the Google Maps loader
//!
//! `MapsConfig` is captured once when a [`MapsService`](crate::MapsService)
//! is built and stays read-only for the lifetime of the service. It carries
//! everything the loader needs to bootstrap the provider runtime and
//! everything the runtime needs to scope its requests (key, language,
//! region).

use serde::{Deserialize, Serialize};

use crate::{GeoError, Result};

/// Base URL of the provider's JavaScript bootstrap
pub const SCRIPT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/js";

pub const DEFAULT_VERSION: &str = "weekly";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_CALLBACK: &str = "initMap";
pub const DEFAULT_LIBRARIES: &[&str] = &["places"];

/// Environment variables read by [`MapsConfig::from_env`]
pub const ENV_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const ENV_VERSION: &str = "GOOGLE_MAPS_VERSION";
pub const ENV_LANGUAGE: &str = "GOOGLE_MAPS_LANGUAGE";
pub const ENV_REGION: &str = "GOOGLE_MAPS_REGION";
pub const ENV_LIBRARIES: &str = "GOOGLE_MAPS_LIBRARIES";

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsConfig {
    pub api_key: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
    #[serde(default = "default_language")]
    pub language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_callback", rename = "callback")]
    pub callback: Option<String>,
    /// Where the bootstrap script is served from
    #[serde(default = "default_script_base_url")]
    pub script_base_url: String,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

fn default_libraries() -> Vec<String> {
    DEFAULT_LIBRARIES.iter().map(|s| s.to_string()).collect()
}

fn default_language() -> Option<String> {
    Some(DEFAULT_LANGUAGE.to_string())
}

fn default_callback() -> Option<String> {
    Some(DEFAULT_CALLBACK.to_string())
}

fn default_script_base_url() -> String {
    SCRIPT_BASE_URL.to_string()
}

impl MapsConfig {
    /// Creates a configuration with the default version, libraries,
    /// language and callback name
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            version: default_version(),
            libraries: default_libraries(),
            language: default_language(),
            region: None,
            callback: default_callback(),
            script_base_url: default_script_base_url(),
        }
    }

    /// Reads the configuration from `GOOGLE_MAPS_*` environment variables.
    /// Only the API key is required.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeoError::Config(format!("{} is not set", ENV_API_KEY)))?;

        let mut config = Self::new(api_key);
        if let Ok(version) = std::env::var(ENV_VERSION) {
            config = config.with_version(version);
        }
        if let Ok(language) = std::env::var(ENV_LANGUAGE) {
            config = config.with_language(language);
        }
        if let Ok(region) = std::env::var(ENV_REGION) {
            config = config.with_region(region);
        }
        if let Ok(libraries) = std::env::var(ENV_LIBRARIES) {
            config = config.with_libraries(
                libraries
                    .split(',')
                    .map(str::trim)
                    .filter(|lib| !lib.is_empty()),
            );
        }
        Ok(config)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_libraries<I, S>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libraries = libraries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Serves the bootstrap script from somewhere other than
    /// [`SCRIPT_BASE_URL`]
    pub fn with_script_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.script_base_url = base_url.into();
        self
    }

    /// Drops the completion hook name; the loader then settles on the
    /// script's own load event.
    pub fn without_callback(mut self) -> Self {
        self.callback = None;
        self
    }

    /// Builds the bootstrap script URL with every value query-encoded.
    /// Optional segments are left out when unset or empty.
    pub fn script_url(&self) -> Result<String> {
        let libraries = self.libraries.join(",");
        let mut params = vec![("key", self.api_key.as_str()), ("v", self.version.as_str())];
        if !libraries.is_empty() {
            params.push(("libraries", libraries.as_str()));
        }
        for (name, value) in [
            ("language", &self.language),
            ("region", &self.region),
            ("callback", &self.callback),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((name, value));
            }
        }

        reqwest::Url::parse_with_params(&self.script_base_url, &params)
            .map(String::from)
            .map_err(|e| {
                GeoError::Config(format!(
                    "invalid script base URL {:?}: {}",
                    self.script_base_url, e
                ))
            })
    }
}

// The key stays out of debug output and therefore out of logs.
impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("api_key", &"<redacted>")
            .field("version", &self.version)
            .field("libraries", &self.libraries)
            .field("language", &self.language)
            .field("region", &self.region)
            .field("callback", &self.callback)
            .field("script_base_url", &self.script_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapsConfig::new("k1");
        assert_eq!(config.api_key, "k1");
        assert_eq!(config.version, "weekly");
        assert_eq!(config.libraries, vec!["places".to_string()]);
        assert_eq!(config.language.as_deref(), Some("en"));
        assert_eq!(config.region, None);
        assert_eq!(config.callback.as_deref(), Some("initMap"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: MapsConfig = serde_json::from_str(r#"{"apiKey":"k1"}"#).unwrap();
        assert_eq!(config, MapsConfig::new("k1"));

        let config: MapsConfig =
            serde_json::from_str(r#"{"apiKey":"k2","region":"nz","libraries":[]}"#).unwrap();
        assert_eq!(config.region.as_deref(), Some("nz"));
        assert!(config.libraries.is_empty());
    }

    #[test]
    fn test_script_url_defaults() {
        let url = MapsConfig::new("k1").script_url().unwrap();
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/js?key=k1&v=weekly&libraries=places&language=en&callback=initMap"
        );
    }

    #[test]
    fn test_script_url_omits_unset_segments() {
        let url = MapsConfig::new("k1")
            .with_version("3.55")
            .with_libraries(Vec::<String>::new())
            .with_region("gb")
            .without_callback()
            .script_url()
            .unwrap();
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/js?key=k1&v=3.55&language=en&region=gb"
        );
    }

    #[test]
    fn test_script_url_encodes_values() {
        let url = MapsConfig::new("a&b=c")
            .with_libraries(["places", "geometry"])
            .with_language("zh TW")
            .script_url()
            .unwrap();
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/js?key=a%26b%3Dc&v=weekly&libraries=places%2Cgeometry&language=zh+TW&callback=initMap"
        );
    }

    #[test]
    fn test_script_base_url_override() {
        let config = MapsConfig::new("k1").with_script_base_url("http://127.0.0.1:8080/maps/api/js");
        assert!(config
            .script_url()
            .unwrap()
            .starts_with("http://127.0.0.1:8080/maps/api/js?key=k1&v=weekly"));

        let err = MapsConfig::new("k1")
            .with_script_base_url("not a url")
            .script_url()
            .unwrap_err();
        assert!(matches!(err, GeoError::Config(_)));
        assert!(!err.to_string().contains("k1"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", MapsConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
