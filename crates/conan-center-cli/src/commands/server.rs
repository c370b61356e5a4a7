//! Server management commands

use console::style;

use conan_center_repo::{CredentialStore, Credentials, Server, ServerConfig};

use crate::error::{CliError, Result};

/// Credentials given to `server add`, if any
fn credentials_from_args(
    user: Option<&str>,
    password: Option<&str>,
    token: Option<&str>,
    api_key: Option<&str>,
) -> Result<Option<Credentials>> {
    match (user, password, token, api_key) {
        (None, None, None, None) => Ok(None),
        (None, None, Some(token), None) => Ok(Some(Credentials::bearer(token))),
        (None, None, None, Some(key)) => Ok(Some(Credentials::api_key(key))),
        (Some(user), Some(password), None, None) => Ok(Some(Credentials::basic(user, password))),
        _ => Err(CliError::input_with_help(
            "Conflicting credentials",
            "provide both --user and --password, or a --token, or an --api-key",
        )),
    }
}

/// Add a new server
pub fn add(
    server_id: &str,
    url: &str,
    user: Option<&str>,
    password: Option<&str>,
    token: Option<&str>,
    api_key: Option<&str>,
    default: bool,
) -> Result<()> {
    let credentials = credentials_from_args(user, password, token, api_key)?;

    let mut config = ServerConfig::load()?;
    let mut server = Server::new(server_id, url)?;
    server.default = default || config.servers.is_empty();
    config.add(server)?;

    if let Some(credentials) = credentials {
        let mut store = CredentialStore::load()?;
        store.set(server_id, credentials);
        store.save()?;
        println!("Credentials stored securely");
    }
    config.save()?;

    tracing::debug!("Servers saved to {:?}", ServerConfig::default_path().ok());
    println!("\"{}\" has been added to your servers", server_id);
    Ok(())
}

/// List configured servers
pub fn list() -> Result<()> {
    let config = ServerConfig::load()?;

    if config.servers.is_empty() {
        println!("No servers configured.");
        println!();
        println!("Add one with: conan-center server add <server-id> <url>");
        return Ok(());
    }

    let store = CredentialStore::load().unwrap_or_default();

    println!("{:<20} {:<10} {:<50}", "SERVER ID", "AUTH", "URL");
    println!("{}", "-".repeat(80));

    for server in &config.servers {
        let key = server.credential_ref.as_deref().unwrap_or(&server.server_id);
        let auth = if store.has(key) { "yes" } else { "no" };
        let id = if server.default {
            format!("{} {}", server.server_id, style("*").green())
        } else {
            server.server_id.clone()
        };
        println!("{:<20} {:<10} {}", id, auth, server.url);
    }

    Ok(())
}

/// Remove a server and its credentials
pub fn remove(server_id: &str) -> Result<()> {
    let mut config = ServerConfig::load()?;
    let removed = config.remove(server_id)?;
    config.save()?;

    if let Ok(mut store) = CredentialStore::load() {
        let key = removed.credential_ref.as_deref().unwrap_or(server_id);
        if store.remove(key).is_some() {
            store.save()?;
        }
    }

    println!("\"{}\" has been removed from your servers", server_id);
    Ok(())
}
