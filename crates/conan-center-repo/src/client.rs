//! Artifactory REST client
//!
//! Implements [`ArtifactoryServices`] over the REST API: AQL for searches,
//! plain downloads for files and the repository endpoint for existence checks.

use async_trait::async_trait;

use crate::aql;
use crate::config::Server;
use crate::credentials::{ResolvedCredentials, ScopedCredentials, SecureHttpClient};
use crate::error::{RepoError, Result};
use crate::services::{ArtifactoryServices, ResultItem, SearchParams};

/// Client for one Artifactory server
#[derive(Debug)]
pub struct ArtifactoryClient {
    server: Server,
    client: SecureHttpClient,
}

impl ArtifactoryClient {
    pub fn new(server: Server, credentials: Option<ResolvedCredentials>) -> Result<Self> {
        let mut scoped = ScopedCredentials::default();
        if let Some(creds) = credentials {
            scoped.add(&server.url, creds);
        }

        let client = SecureHttpClient::new(scoped)?;
        Ok(Self { server, client })
    }

    /// Client for anonymous access
    pub fn public(server: Server) -> Result<Self> {
        Self::new(server, None)
    }

    pub fn server_id(&self) -> &str {
        &self.server.server_id
    }

    pub fn url(&self) -> &str {
        &self.server.url
    }
}

#[async_trait]
impl ArtifactoryServices for ArtifactoryClient {
    async fn check_repository(&self, repository: &str) -> Result<()> {
        let url = self
            .server
            .endpoint(&format!("api/repositories/{}", repository));
        match self.client.get(&url).await {
            Ok(_) => Ok(()),
            Err(RepoError::HttpError {
                status: 400 | 404, ..
            }) => Err(RepoError::RepositoryNotFound {
                name: repository.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn search_files(&self, params: &SearchParams) -> Result<Vec<ResultItem>> {
        let query = aql::build_query(params)?;
        tracing::debug!("AQL: {}", query);

        let url = self.server.endpoint("api/search/aql");
        let response = self.client.post_text(&url, &query).await?;
        let body = response.bytes().await.map_err(|e| RepoError::NetworkError {
            message: e.to_string(),
        })?;

        let items = aql::parse_response(&body)?;
        tracing::debug!("{} items match '{}'", items.len(), params.pattern);
        Ok(items)
    }

    async fn read_remote_file(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.server.endpoint(path);
        match self.client.get_bytes(&url).await {
            Err(RepoError::HttpError { status: 404, .. }) => Err(RepoError::RemoteFileNotFound {
                path: path.to_string(),
            }),
            other => other,
        }
    }
}
