use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::AlbumId,
    protocol::{AlbumPageData, GraphqlRequest, GraphqlResponse},
};
use tracing::debug;
use url::Url;

use crate::paginator::RemoteAlbumClient;

/// `RemoteAlbumClient` backed by a GraphQL endpoint over HTTP.
pub struct GraphqlAlbumClient {
    http: Client,
    endpoint: Url,
    auth_token: Option<String>,
}

impl GraphqlAlbumClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid graphql endpoint url: {endpoint}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("graphql endpoint must start with http:// or https://");
        }
        Ok(Self {
            http: Client::new(),
            endpoint,
            auth_token: None,
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteAlbumClient for GraphqlAlbumClient {
    async fn fetch_album_page(
        &self,
        album_id: &AlbumId,
        limit: u32,
        offset: u32,
    ) -> Result<AlbumPageData> {
        debug!(album_id = %album_id, limit, offset, "graphql: fetching album page");
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphqlRequest::album_page(album_id.clone(), limit, offset));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response: GraphqlResponse<AlbumPageData> = request
            .send()
            .await
            .with_context(|| format!("failed to reach graphql endpoint {}", self.endpoint))?
            .error_for_status()?
            .json()
            .await
            .context("failed to parse graphql response")?;

        response
            .into_result()?
            .ok_or_else(|| anyhow!("graphql response carried neither data nor errors"))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
