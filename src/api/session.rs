//! Session configuration: cookies, proxy and TLS settings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::{Client, Proxy, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::output::redact_proxy;

/// Page requested through the proxy to check connectivity.
const PROBE_URL: &str = "https://www.instagram.com/";

/// Timeout of the proxy probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Domain assumed for cookies exported without one.
const DEFAULT_COOKIE_DOMAIN: &str = ".instagram.com";

/// A single exported cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Cookies loaded from an export file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieSet {
    cookies: Vec<Cookie>,
}

impl CookieSet {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Build a cookie jar for the HTTP client.
    fn to_jar(&self) -> Jar {
        let jar = Jar::default();
        for cookie in &self.cookies {
            let host = cookie.domain.trim_start_matches('.');
            let Ok(url) = Url::parse(&format!("https://{}/", host)) else {
                tracing::debug!(
                    "Skipping cookie {} with bad domain {}",
                    cookie.name,
                    cookie.domain
                );
                continue;
            };
            jar.add_cookie_str(
                &format!(
                    "{}={}; Domain={}; Path=/",
                    cookie.name, cookie.value, cookie.domain
                ),
                &url,
            );
        }
        jar
    }
}

/// JSON cookie exports: a browser-extension array or a plain name/value map.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CookieExport {
    List(Vec<ExportedCookie>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct ExportedCookie {
    name: String,
    value: String,
    #[serde(default)]
    domain: Option<String>,
}

/// Load cookies from a JSON export or a Netscape `cookies.txt` file.
///
/// Any failure is reported as [`Error::Auth`].
pub fn load_cookies(path: &Path) -> Result<CookieSet> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Auth(format!("cannot read {}: {}", path.display(), e)))?;

    let trimmed = content.trim_start();
    let set = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        parse_json_cookies(trimmed).map_err(|e| {
            Error::Auth(format!(
                "malformed cookie JSON in {}: {}",
                path.display(),
                e
            ))
        })?
    } else {
        parse_netscape_cookies(&content)
    };

    if set.is_empty() {
        return Err(Error::Auth(format!("no cookies found in {}", path.display())));
    }

    Ok(set)
}

fn parse_json_cookies(content: &str) -> std::result::Result<CookieSet, serde_json::Error> {
    let cookies = match serde_json::from_str::<CookieExport>(content)? {
        CookieExport::List(list) => list
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                domain: c
                    .domain
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| DEFAULT_COOKIE_DOMAIN.to_string()),
            })
            .collect(),
        CookieExport::Map(map) => map
            .into_iter()
            .map(|(name, value)| Cookie {
                name,
                value,
                domain: DEFAULT_COOKIE_DOMAIN.to_string(),
            })
            .collect(),
    };

    Ok(CookieSet::new(cookies))
}

/// Parse the tab separated Netscape format:
/// `domain  flag  path  secure  expiry  name  value`.
fn parse_netscape_cookies(content: &str) -> CookieSet {
    let cookies = content
        .lines()
        .map(|line| line.strip_prefix("#HttpOnly_").unwrap_or(line))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                return None;
            }
            Some(Cookie {
                name: fields[5].to_string(),
                value: fields[6].trim_end().to_string(),
                domain: fields[0].to_string(),
            })
        })
        .collect();

    CookieSet::new(cookies)
}

/// Everything the HTTP layer needs; fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookies: CookieSet,
    pub proxy: Option<String>,
    pub verify_ssl: bool,
    pub user_agent: String,
    pub timeout: Duration,
}

impl SessionConfig {
    /// Build the session from network settings, loading cookies if configured.
    ///
    /// A missing or malformed cookie file is logged and the session continues
    /// unauthenticated.
    pub fn build(network: &NetworkConfig) -> Self {
        let cookies = match &network.cookies_file {
            Some(path) => {
                tracing::info!("Loading cookies from {}", path.display());
                match load_cookies(path) {
                    Ok(cookies) => {
                        tracing::info!("Loaded {} cookies", cookies.len());
                        cookies
                    }
                    Err(e) => {
                        tracing::warn!("{}; continuing without authentication", e);
                        CookieSet::default()
                    }
                }
            }
            None => CookieSet::default(),
        };

        if !network.verify_ssl {
            tracing::warn!("SSL certificate verification is disabled. This is less secure.");
        }

        if let Some(proxy) = &network.proxy {
            tracing::info!("Using proxy: {}", redact_proxy(proxy));
        }

        Self {
            cookies,
            proxy: network.proxy.clone(),
            verify_ssl: network.verify_ssl,
            user_agent: network.user_agent.clone(),
            timeout: network.timeout(),
        }
    }

    /// Whether a logged-in session cookie is present.
    pub fn is_authenticated(&self) -> bool {
        self.cookies.get("sessionid").is_some()
    }

    /// CSRF token to echo back in request headers.
    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get("csrftoken")
    }

    /// Build the HTTP client carrying cookies, proxy and TLS settings.
    ///
    /// The timeout bounds connecting and each idle read, not the whole
    /// transfer, so long media downloads finish as long as data keeps flowing.
    pub fn http_client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.timeout)
            .read_timeout(self.timeout)
            .cookie_provider(Arc::new(self.cookies.to_jar()))
            .danger_accept_invalid_certs(!self.verify_ssl);

        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        builder
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))
    }
}

/// Check that Instagram is reachable through the proxy.
///
/// Any transport error or non-200 status is a fatal [`Error::Connectivity`].
pub async fn probe_proxy(proxy: &str, verify_ssl: bool, user_agent: &str) -> Result<()> {
    tracing::info!("Testing proxy connection: {}", redact_proxy(proxy));

    let proxy_config = Proxy::all(proxy).map_err(|e| {
        Error::Connectivity(format!("invalid proxy {}: {}", redact_proxy(proxy), e))
    })?;

    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(PROBE_TIMEOUT)
        .proxy(proxy_config)
        .danger_accept_invalid_certs(!verify_ssl)
        .build()
        .map_err(|e| Error::Connectivity(format!("failed to create probe client: {}", e)))?;

    let response = client
        .get(PROBE_URL)
        .send()
        .await
        .map_err(|e| Error::Connectivity(describe_probe_error(&e, verify_ssl)))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::Connectivity(format!(
            "probe returned status code {}",
            status
        )));
    }

    tracing::info!("Proxy test successful!");
    Ok(())
}

fn describe_probe_error(err: &reqwest::Error, verify_ssl: bool) -> String {
    let chain = error_chain(err);

    if err.is_timeout() {
        return format!("proxy connection timed out ({})", chain);
    }

    if verify_ssl && chain.to_lowercase().contains("certificate") {
        return format!(
            "SSL verification error: {}. Consider --no-verify-ssl if the proxy uses a self-signed certificate",
            chain
        );
    }

    if err.is_connect() {
        return format!("proxy connection error, check the proxy settings ({})", chain);
    }

    chain
}

/// Join an error and its sources into one line.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_error_chain_includes_sources() {
        #[derive(Debug)]
        struct Outer(std::io::Error);

        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("error decoding response body")
            }
        }

        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "operation timed out",
        ));
        assert_eq!(
            error_chain(&err),
            "error decoding response body: operation timed out"
        );
    }

    #[test]
    fn test_load_browser_export_array() {
        let file = write_temp(
            r#"[
                {"name": "sessionid", "value": "abc%3A123", "domain": ".instagram.com", "path": "/"},
                {"name": "csrftoken", "value": "tok"},
                {"name": "ds_user_id", "value": "42", "domain": ""}
            ]"#,
        );

        let cookies = load_cookies(file.path()).unwrap();
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies.get("sessionid"), Some("abc%3A123"));
        assert!(cookies.iter().all(|c| c.domain == ".instagram.com"));
    }

    #[test]
    fn test_load_name_value_map() {
        let file = write_temp(r#"{"sessionid": "abc", "csrftoken": "tok"}"#);

        let cookies = load_cookies(file.path()).unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("csrftoken"), Some("tok"));
    }

    #[test]
    fn test_load_netscape_file() {
        let file = write_temp(
            "# Netscape HTTP Cookie File\n\
             .instagram.com\tTRUE\t/\tTRUE\t1999999999\tcsrftoken\ttok\n\
             #HttpOnly_.instagram.com\tTRUE\t/\tTRUE\t1999999999\tsessionid\tabc\n\
             \n",
        );

        let cookies = load_cookies(file.path()).unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("sessionid"), Some("abc"));
        assert_eq!(cookies.get("csrftoken"), Some("tok"));
    }

    #[test]
    fn test_missing_or_malformed_files_are_auth_errors() {
        assert!(matches!(
            load_cookies(Path::new("/nonexistent/cookies.json")),
            Err(Error::Auth(_))
        ));

        let malformed = write_temp(r#"[{"name": "sessionid"}"#);
        let err = load_cookies(malformed.path()).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert!(!err.is_fatal());

        let empty = write_temp("# Netscape HTTP Cookie File\n");
        assert!(matches!(load_cookies(empty.path()), Err(Error::Auth(_))));
    }

    #[test]
    fn test_build_continues_without_cookies() {
        let network = NetworkConfig {
            cookies_file: Some("/nonexistent/cookies.json".into()),
            ..NetworkConfig::default()
        };

        let session = SessionConfig::build(&network);
        assert!(session.cookies.is_empty());
        assert!(!session.is_authenticated());
        assert!(session.http_client().is_ok());
    }

    #[test]
    fn test_authenticated_session() {
        let file = write_temp(r#"{"sessionid": "abc", "csrftoken": "tok"}"#);
        let network = NetworkConfig {
            cookies_file: Some(file.path().to_path_buf()),
            proxy: Some("http://127.0.0.1:8080".to_string()),
            ..NetworkConfig::default()
        };

        let session = SessionConfig::build(&network);
        assert!(session.is_authenticated());
        assert_eq!(session.csrf_token(), Some("tok"));
        assert!(session.http_client().is_ok());
    }

    #[tokio::test]
    async fn test_connectivity_check_fails_on_unreachable_proxy() {
        // Port 1 on loopback refuses connections.
        let err = probe_proxy("http://127.0.0.1:1", true, "test-agent")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connectivity(_)));
        assert!(err.is_fatal());
    }
}
