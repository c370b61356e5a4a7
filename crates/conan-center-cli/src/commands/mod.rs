//! CLI commands

pub mod index_reference;
pub mod properties;
pub mod search;
pub mod server;
pub mod stats;

use conan_center_core::Reference;
use conan_center_repo::{
    ArtifactoryClient, ArtifactoryServices, CredentialStore, ResolvedCredentials, Server,
    ServerConfig,
};

use crate::error::{CliError, Result};

/// Server id used for a `--url` given on the command line
const COMMAND_LINE_SERVER: &str = "cli";

/// Global options selecting the Artifactory server
#[derive(Debug, Clone, Default)]
pub struct ServerArgs {
    pub server_id: Option<String>,
    pub url: Option<String>,
    pub access_token: Option<String>,
}

/// Client for the server selected by the global options
///
/// `--url` bypasses the configuration; otherwise the configured server is
/// used with its stored credentials. `--access-token` overrides them.
pub fn connect(args: &ServerArgs) -> Result<ArtifactoryClient> {
    let token = args
        .access_token
        .as_ref()
        .map(|token| ResolvedCredentials::Bearer {
            token: token.clone(),
        });

    if let Some(url) = &args.url {
        let server = Server::new(COMMAND_LINE_SERVER, url.as_str())?;
        tracing::debug!("Using server {}", server.url);
        return Ok(ArtifactoryClient::new(server, token)?);
    }

    let config = ServerConfig::load()?;
    let server = config.select(args.server_id.as_deref())?.clone();
    tracing::debug!("Using server '{}' ({})", server.server_id, server.url);

    let credentials = match token {
        Some(token) => Some(token),
        None => {
            let store = CredentialStore::load()?;
            let key = server.credential_ref.as_deref().unwrap_or(&server.server_id);
            store.get(key).map(|c| c.resolve()).transpose()?
        }
    };
    Ok(ArtifactoryClient::new(server, credentials)?)
}

/// Check that `repository` exists before working on it
pub async fn open_repository<S>(services: &S, repository: &str) -> Result<()>
where
    S: ArtifactoryServices + ?Sized,
{
    tracing::info!("Work on repository {}", repository);
    services.check_repository(repository).await?;
    Ok(())
}

/// Parse a reference given on the command line
pub fn parse_reference(input: &str) -> Result<Reference> {
    input.parse::<Reference>().map_err(CliError::from)
}
