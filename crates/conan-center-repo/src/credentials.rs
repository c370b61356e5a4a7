//! Server credentials with redirect protection
//!
//! - Credentials are scoped to the URL of the server they belong to
//! - NEVER sent after a cross-origin redirect
//! - Environment variable references for CI jobs

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{RepoError, Result};

/// Header carrying an Artifactory API key
pub const API_KEY_HEADER: &str = "X-JFrog-Art-Api";

const MAX_REDIRECTS: u32 = 10;
const TIMEOUT_SECS: u64 = 30;

/// Credential types supported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Credentials {
    /// Basic authentication (username/password)
    Basic { username: String, password: String },

    /// Access token sent as a bearer token
    Bearer { token: String },

    /// Artifactory API key
    ApiKey { key: String },

    /// Environment variable references (CI/CD friendly)
    Env {
        username_var: String,
        password_var: String,
    },
}

impl Credentials {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Credentials::Bearer {
            token: token.into(),
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey { key: key.into() }
    }

    pub fn from_env(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Credentials::Env {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    /// Resolve credentials to actual values
    pub fn resolve(&self) -> Result<ResolvedCredentials> {
        match self {
            Credentials::Basic { username, password } => Ok(ResolvedCredentials::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            Credentials::Bearer { token } => Ok(ResolvedCredentials::Bearer {
                token: token.clone(),
            }),
            Credentials::ApiKey { key } => Ok(ResolvedCredentials::ApiKey { key: key.clone() }),
            Credentials::Env {
                username_var,
                password_var,
            } => {
                let username = std::env::var(username_var).map_err(|_| RepoError::AuthFailed {
                    message: format!("Environment variable {} not set", username_var),
                })?;
                let password = std::env::var(password_var).map_err(|_| RepoError::AuthFailed {
                    message: format!("Environment variable {} not set", password_var),
                })?;
                Ok(ResolvedCredentials::Basic { username, password })
            }
        }
    }
}

/// Resolved credentials ready for use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCredentials {
    Basic { username: String, password: String },
    Bearer { token: String },
    ApiKey { key: String },
}

impl ResolvedCredentials {
    /// Header name and value authenticating a request
    pub fn auth_header(&self) -> (&'static str, String) {
        match self {
            ResolvedCredentials::Basic { username, password } => {
                let encoded = base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    format!("{}:{}", username, password),
                );
                ("Authorization", format!("Basic {}", encoded))
            }
            ResolvedCredentials::Bearer { token } => {
                ("Authorization", format!("Bearer {}", token))
            }
            ResolvedCredentials::ApiKey { key } => (API_KEY_HEADER, key.clone()),
        }
    }
}

/// Credential store - credentials by server id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default)]
    credentials: HashMap<String, Credentials>,
}

impl CredentialStore {
    /// Load credential store from default location
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
        let store: Self = serde_yaml::from_str(&content)?;
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save to specific path, readable by the owner only on Unix
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true).mode(0o600);
            std::io::Write::write_all(&mut options.open(path)?, content.as_bytes())?;
        }

        #[cfg(not(unix))]
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("conan-center").join("credentials.yaml"))
    }

    pub fn set(&mut self, server_id: &str, credentials: Credentials) {
        self.credentials.insert(server_id.to_string(), credentials);
    }

    pub fn get(&self, server_id: &str) -> Option<&Credentials> {
        self.credentials.get(server_id)
    }

    pub fn remove(&mut self, server_id: &str) -> Option<Credentials> {
        self.credentials.remove(server_id)
    }

    pub fn has(&self, server_id: &str) -> bool {
        self.credentials.contains_key(server_id)
    }
}

/// Scoped credentials - maps URL prefixes to credentials
/// SECURITY: Never sends credentials to URLs outside the scope
#[derive(Debug, Clone, Default)]
pub struct ScopedCredentials {
    scopes: HashMap<String, ResolvedCredentials>,
}

impl ScopedCredentials {
    pub fn add(&mut self, url_prefix: &str, credentials: ResolvedCredentials) {
        let prefix = url_prefix.trim_end_matches('/').to_string();
        self.scopes.insert(prefix, credentials);
    }

    /// Credentials for a URL (by longest matching prefix)
    pub fn for_url(&self, url: &str) -> Option<&ResolvedCredentials> {
        self.scopes
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, creds)| creds)
    }

    /// Check if two URLs are same-origin (for redirect safety)
    pub fn same_origin(url1: &str, url2: &str) -> bool {
        match (Url::parse(url1), Url::parse(url2)) {
            (Ok(u1), Ok(u2)) => {
                u1.scheme() == u2.scheme()
                    && u1.host() == u2.host()
                    && u1.port_or_known_default() == u2.port_or_known_default()
            }
            _ => false,
        }
    }
}

/// HTTP client wrapper with redirect protection
pub struct SecureHttpClient {
    client: reqwest::Client,
    credentials: ScopedCredentials,
}

impl std::fmt::Debug for SecureHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials stay out of debug output
        f.debug_struct("SecureHttpClient").finish_non_exhaustive()
    }
}

impl SecureHttpClient {
    pub fn new(credentials: ScopedCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            // Redirects are followed by hand so credentials never leak
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| RepoError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
        })
    }

    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        self.send(Method::GET, url, None).await
    }

    /// POST a plain-text body
    pub async fn post_text(&self, url: &str, body: &str) -> Result<reqwest::Response> {
        self.send(Method::POST, url, Some(body)).await
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|e| RepoError::NetworkError {
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn send(&self, method: Method, url: &str, body: Option<&str>) -> Result<reqwest::Response> {
        let mut current_url = url.to_string();
        let mut redirects = 0;

        loop {
            let mut request = self.client.request(method.clone(), &current_url);
            if let Some(body) = body {
                request = request
                    .header(reqwest::header::CONTENT_TYPE, "text/plain")
                    .body(body.to_string());
            }

            // Auth ONLY if same origin as the requested URL
            if ScopedCredentials::same_origin(url, &current_url) {
                if let Some(creds) = self.credentials.for_url(&current_url) {
                    let (name, value) = creds.auth_header();
                    request = request.header(name, value);
                }
            } else {
                tracing::warn!(
                    "Cross-origin redirect from {} to {} - credentials not forwarded",
                    url,
                    current_url
                );
            }

            tracing::trace!("{} {}", method, current_url);
            let response = request.send().await?;
            let status = response.status();

            if status.is_redirection() {
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    return Err(RepoError::NetworkError {
                        message: format!("Too many redirects (max {})", MAX_REDIRECTS),
                    });
                }

                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| RepoError::NetworkError {
                        message: "Redirect without Location header".to_string(),
                    })?;

                let base = Url::parse(&current_url)?;
                current_url = base.join(location)?.to_string();
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(RepoError::AuthRequired { url: current_url });
            }
            if status == reqwest::StatusCode::FORBIDDEN {
                return Err(RepoError::AuthFailed {
                    message: format!("Access denied to {}", current_url),
                });
            }

            if !status.is_success() {
                return Err(RepoError::HttpError {
                    status: status.as_u16(),
                    message: format!("{} {} failed", method, current_url),
                });
            }

            return Ok(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_origin() {
        assert!(ScopedCredentials::same_origin(
            "https://example.com/foo",
            "https://example.com/bar"
        ));
        assert!(ScopedCredentials::same_origin(
            "https://example.com:443/foo",
            "https://example.com/bar"
        ));
        assert!(!ScopedCredentials::same_origin(
            "https://example.com/foo",
            "https://other.com/bar"
        ));
        assert!(!ScopedCredentials::same_origin(
            "https://example.com/foo",
            "http://example.com/bar"
        ));
        assert!(!ScopedCredentials::same_origin(
            "https://example.com/foo",
            "https://example.com:8443/bar"
        ));
    }

    #[test]
    fn test_scoped_credentials() {
        let mut scoped = ScopedCredentials::default();
        scoped.add(
            "https://artifactory.example.com/artifactory/",
            ResolvedCredentials::Bearer {
                token: "secret".to_string(),
            },
        );

        assert!(scoped
            .for_url("https://artifactory.example.com/artifactory/api/search/aql")
            .is_some());
        assert!(scoped
            .for_url("https://artifactory.example.com/other")
            .is_none());
        assert!(scoped
            .for_url("https://public.example.com/artifactory/api/search/aql")
            .is_none());
    }

    #[test]
    fn test_auth_headers() {
        let basic = Credentials::basic("user", "pass").resolve().unwrap();
        assert_eq!(
            basic.auth_header(),
            ("Authorization", "Basic dXNlcjpwYXNz".to_string())
        );

        let bearer = Credentials::bearer("tok").resolve().unwrap();
        assert_eq!(bearer.auth_header(), ("Authorization", "Bearer tok".to_string()));

        let key = Credentials::api_key("AKCp").resolve().unwrap();
        assert_eq!(key.auth_header(), (API_KEY_HEADER, "AKCp".to_string()));
    }

    #[test]
    fn test_env_credentials() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("CONAN_CENTER_TEST_USER", "ci");
            std::env::set_var("CONAN_CENTER_TEST_PASS", "hunter2");
        }

        let resolved = Credentials::from_env("CONAN_CENTER_TEST_USER", "CONAN_CENTER_TEST_PASS")
            .resolve()
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedCredentials::Basic {
                username: "ci".to_string(),
                password: "hunter2".to_string(),
            }
        );

        // SAFETY: see above
        unsafe {
            std::env::remove_var("CONAN_CENTER_TEST_USER");
            std::env::remove_var("CONAN_CENTER_TEST_PASS");
        }

        let missing = Credentials::from_env("CONAN_CENTER_TEST_UNSET_U", "CONAN_CENTER_TEST_UNSET_P");
        assert!(matches!(missing.resolve(), Err(RepoError::AuthFailed { .. })));
    }

    #[test]
    fn test_credential_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.yaml");

        let mut store = CredentialStore::default();
        store.set("main", Credentials::api_key("secret"));
        store.set("ci", Credentials::from_env("U", "P"));
        store.save_to(&path).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let mut loaded = CredentialStore::load_from(&path).unwrap();
        assert_eq!(loaded.get("main"), Some(&Credentials::api_key("secret")));
        assert!(loaded.has("ci"));
        assert!(loaded.remove("ci").is_some());
        assert!(!loaded.has("ci"));
    }
}
