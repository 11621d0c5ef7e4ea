use std::sync::Arc;

use super::gate::LoadSignal;
use crate::core::config::MapsConfig;
use crate::provider::{MapsProvider, WebServiceProvider};
use crate::runtime;

/// Fetches and bootstraps the provider runtime.
///
/// `load` is called once per load attempt and must eventually settle the
/// signal; it should not block the caller.
pub trait ScriptLoader: Send + Sync {
    fn load(&self, config: &MapsConfig, signal: LoadSignal);
}

/// Fetches the bootstrap script over HTTP and, once it is served, opens the
/// gate with a [`WebServiceProvider`] sharing the same client.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    web_service_base_url: Option<String>,
}

impl HttpLoader {
    pub fn new() -> Self {
        Self::with_client(crate::provider::web::HTTP_CLIENT.clone())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            web_service_base_url: None,
        }
    }

    /// Root the loaded provider sends its lookups to
    pub fn with_web_service_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.web_service_base_url = Some(base_url.into());
        self
    }
}

impl Default for HttpLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptLoader for HttpLoader {
    fn load(&self, config: &MapsConfig, signal: LoadSignal) {
        let url = match config.script_url() {
            Ok(url) => url,
            Err(e) => {
                signal.fail(e.to_string());
                return;
            }
        };
        let client = self.client.clone();
        let config = config.clone();
        let base_url = self.web_service_base_url.clone();

        runtime::spawn(async move {
            let fetched = client
                .get(url)
                .send()
                .await
                .and_then(|response| response.error_for_status());

            match fetched {
                Ok(response) => {
                    log::info!(
                        "maps runtime {} fetched ({} bytes)",
                        config.version,
                        response.content_length().unwrap_or(0)
                    );
                    let mut provider = WebServiceProvider::with_client(client, &config);
                    if let Some(base_url) = base_url {
                        provider = provider.with_base_url(base_url);
                    }
                    signal.succeed(Arc::new(provider));
                }
                Err(e) => {
                    let e = e.without_url();
                    log::warn!("maps script fetch failed: {}", e);
                    signal.fail(e.to_string());
                }
            }
        });
    }
}

/// Opens the gate immediately with a runtime constructed elsewhere
#[derive(Clone)]
pub struct ReadyLoader {
    provider: Arc<dyn MapsProvider>,
}

impl ReadyLoader {
    pub fn new(provider: Arc<dyn MapsProvider>) -> Self {
        Self { provider }
    }
}

impl ScriptLoader for ReadyLoader {
    fn load(&self, _config: &MapsConfig, signal: LoadSignal) {
        signal.succeed(self.provider.clone());
    }
}
