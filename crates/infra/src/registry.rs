//! Service registry lookups.
//!
//! [`ServiceRegistry`] is the seam the overlay depends on; [`ConsulCatalog`]
//! talks to a Consul agent over HTTP (`GET <url>/catalog/service/<name>`).

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("undecodable catalog response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Lists the addresses registered under a service name.
pub trait ServiceRegistry {
    /// Instance addresses in registry order. An empty list means "nothing registered".
    fn service_addresses(&self, service: &str) -> Result<Vec<String>, RegistryError>;
}

/// One entry of a catalog response. Only the address fields are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogService {
    #[serde(rename = "ServiceAddress", default)]
    pub service_address: Option<String>,
    #[serde(rename = "Address", default)]
    pub node_address: Option<String>,
}

impl CatalogService {
    /// The service address, or the node address when the service has none.
    pub fn address(&self) -> Option<&str> {
        [&self.service_address, &self.node_address]
            .into_iter()
            .filter_map(|a| a.as_deref())
            .find(|a| !a.is_empty())
    }
}

/// Addresses of `instances`, skipping entries without any address.
pub fn instance_addresses(service: &str, instances: &[CatalogService]) -> Vec<String> {
    instances
        .iter()
        .filter_map(|instance| {
            let address = instance.address();
            if address.is_none() {
                tracing::debug!(service, "catalog entry without an address skipped");
            }
            address.map(str::to_string)
        })
        .collect()
}

/// Consul catalog client.
#[derive(Debug, Clone)]
pub struct ConsulCatalog {
    base: Url,
    client: Client,
}

impl ConsulCatalog {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let base = Url::parse(url).map_err(|e| RegistryError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(RegistryError::InvalidUrl {
                url: url.to_string(),
                message: "not a base url".into(),
            });
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RegistryError::Client)?;
        Ok(Self { base, client })
    }

    /// `<base>/catalog/service/<service>`, with the name percent-encoded.
    pub fn service_url(&self, service: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["catalog", "service", service]);
        }
        url
    }
}

impl ServiceRegistry for ConsulCatalog {
    fn service_addresses(&self, service: &str) -> Result<Vec<String>, RegistryError> {
        let url = self.service_url(service);
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| RegistryError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let instances: Vec<CatalogService> =
            response.json().map_err(|source| RegistryError::Decode {
                url: url.to_string(),
                source,
            })?;
        Ok(instance_addresses(service, &instances))
    }
}
