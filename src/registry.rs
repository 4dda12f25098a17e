//! External NIF registry lookup (Ministry of Finance taxpayer registry).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// What the registry knows about a taxpayer identifier.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub valid: bool,
    pub name: Option<String>,
}

/// Port for the taxpayer registry; production uses HTTP, tests inject mocks.
#[async_trait]
pub trait NifRegistry: Send + Sync {
    async fn lookup(&self, nif: &str) -> anyhow::Result<RegistryEntry>;
}

#[derive(Debug, Deserialize)]
struct RegistryResponse {
    valid: bool,
    #[serde(default)]
    name: Option<String>,
}

pub struct HttpNifRegistry {
    client: Client,
    base_url: String,
}

impl HttpNifRegistry {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl NifRegistry for HttpNifRegistry {
    async fn lookup(&self, nif: &str) -> anyhow::Result<RegistryEntry> {
        let url = format!("{}/nif/{}", self.base_url, nif);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("registry returned status {}", response.status());
        }

        let body: RegistryResponse = response.json().await?;
        Ok(RegistryEntry {
            valid: body.valid,
            name: body.name,
        })
    }
}
