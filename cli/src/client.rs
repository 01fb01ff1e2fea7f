use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use recipebox_core::models::{DeleteAck, NewRecipe, Recipe, RecipeUpdate};

/// HTTP client for the recipe service.
pub struct RecipeClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl RecipeClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("recipebox-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/recipes{path}", self.base_url)
    }

    pub async fn list(&self) -> Result<Vec<Recipe>> {
        let resp = self.client.get(self.url("")).send().await;
        self.decode(resp).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Recipe> {
        let resp = self.client.get(self.url(&format!("/{id}"))).send().await;
        self.decode(resp).await
    }

    pub async fn create(&self, fields: &NewRecipe) -> Result<Recipe> {
        let resp = self.client.post(self.url("/add")).json(fields).send().await;
        self.decode(resp).await
    }

    pub async fn update(&self, id: Uuid, fields: &RecipeUpdate) -> Result<Recipe> {
        let resp = self
            .client
            .put(self.url(&format!("/update/{id}")))
            .json(fields)
            .send()
            .await;
        self.decode(resp).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeleteAck> {
        let resp = self.client.delete(self.url(&format!("/{id}"))).send().await;
        self.decode(resp).await
    }

    // Error responses carry `{error}`; surface that message as the failure.
    async fn decode<T: DeserializeOwned>(
        &self,
        resp: reqwest::Result<reqwest::Response>,
    ) -> Result<T> {
        let resp = resp
            .with_context(|| format!("Failed to reach recipe service at {}", self.base_url))?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => bail!("{} ({status})", body.error),
                Err(_) => bail!("Recipe service returned {status}"),
            }
        }
        resp.json()
            .await
            .context("Failed to parse recipe service response")
    }
}
