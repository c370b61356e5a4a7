//! Server configuration management
//!
//! Stores configured Artifactory servers in `~/.config/conan-center/servers.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

/// Server configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub servers: Vec<Server>,
}

impl ServerConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("conan-center").join("servers.yaml"))
    }

    pub fn get(&self, server_id: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.server_id == server_id)
    }

    /// Add a server; a new default server clears the flag on the others
    pub fn add(&mut self, server: Server) -> Result<()> {
        if self.get(&server.server_id).is_some() {
            return Err(RepoError::ServerAlreadyExists {
                server_id: server.server_id.clone(),
            });
        }
        if server.default {
            self.servers.iter_mut().for_each(|s| s.default = false);
        }
        self.servers.push(server);
        Ok(())
    }

    pub fn remove(&mut self, server_id: &str) -> Result<Server> {
        let idx = self
            .servers
            .iter()
            .position(|s| s.server_id == server_id)
            .ok_or_else(|| RepoError::ServerNotFound {
                server_id: server_id.to_string(),
            })?;
        Ok(self.servers.remove(idx))
    }

    /// Server to use: the one named, else the default, else the only one
    pub fn select(&self, server_id: Option<&str>) -> Result<&Server> {
        if let Some(id) = server_id {
            return self.get(id).ok_or_else(|| RepoError::ServerNotFound {
                server_id: id.to_string(),
            });
        }
        if let Some(server) = self.servers.iter().find(|s| s.default) {
            return Ok(server);
        }
        match self.servers.as_slice() {
            [only] => Ok(only),
            [] => Err(RepoError::InvalidConfig {
                message: "No server configured, use 'server add' or --url".to_string(),
            }),
            _ => Err(RepoError::InvalidConfig {
                message: "Several servers configured and none is the default, use --server-id"
                    .to_string(),
            }),
        }
    }
}

/// An Artifactory server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub server_id: String,

    /// Base URL, e.g. `https://example.jfrog.io/artifactory`
    pub url: String,

    #[serde(default)]
    pub default: bool,

    /// Key into the credential store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_ref: Option<String>,
}

impl Server {
    pub fn new(server_id: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;
        Ok(Self {
            server_id: server_id.into(),
            url: url.trim_end_matches('/').to_string(),
            default: false,
            credential_ref: None,
        })
    }

    /// URL of an endpoint below the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn validate_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|e| RepoError::InvalidServerUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(RepoError::InvalidServerUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}', expected http or https", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_new() {
        let server = Server::new("main", "https://example.jfrog.io/artifactory/").unwrap();
        assert_eq!(server.url, "https://example.jfrog.io/artifactory");
        assert_eq!(
            server.endpoint("/api/search/aql"),
            "https://example.jfrog.io/artifactory/api/search/aql"
        );

        assert!(Server::new("bad", "ftp://example.com").is_err());
        assert!(Server::new("bad", "not a url").is_err());
    }

    #[test]
    fn test_config_add_remove() {
        let mut config = ServerConfig::default();
        config
            .add(Server::new("main", "https://example.com").unwrap())
            .unwrap();

        assert!(config.get("main").is_some());
        assert!(matches!(
            config.add(Server::new("main", "https://other.com").unwrap()),
            Err(RepoError::ServerAlreadyExists { .. })
        ));

        let removed = config.remove("main").unwrap();
        assert_eq!(removed.server_id, "main");
        assert!(matches!(
            config.remove("main"),
            Err(RepoError::ServerNotFound { .. })
        ));
    }

    #[test]
    fn test_select() {
        let mut config = ServerConfig::default();
        assert!(matches!(config.select(None), Err(RepoError::InvalidConfig { .. })));

        config
            .add(Server::new("a", "https://a.example.com").unwrap())
            .unwrap();
        assert_eq!(config.select(None).unwrap().server_id, "a");

        config
            .add(Server::new("b", "https://b.example.com").unwrap())
            .unwrap();
        assert!(config.select(None).is_err());
        assert_eq!(config.select(Some("b")).unwrap().server_id, "b");
        assert!(config.select(Some("c")).is_err());

        let mut c = Server::new("c", "https://c.example.com").unwrap();
        c.default = true;
        config.add(c).unwrap();
        assert_eq!(config.select(None).unwrap().server_id, "c");

        let mut a = config.remove("a").unwrap();
        a.default = true;
        config.add(a).unwrap();
        assert_eq!(config.select(None).unwrap().server_id, "a");
        assert_eq!(config.servers.iter().filter(|s| s.default).count(), 1);
    }

    #[test]
    fn test_config_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servers.yaml");

        let mut config = ServerConfig::default();
        let mut server = Server::new("main", "https://example.com/artifactory").unwrap();
        server.credential_ref = Some("main".to_string());
        config.add(server).unwrap();
        config.save_to(&path).unwrap();

        let yaml = std::fs::read_to_string(&path).unwrap();
        assert!(yaml.contains("serverId: main"));

        let loaded = ServerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.servers, config.servers);
        assert_eq!(loaded.servers.len(), 1);
        assert_eq!(loaded.servers[0].server_id, "main");
    }
}
