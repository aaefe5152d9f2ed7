// # Cloudflare DNS Provider
//
// Cloudflare API v4 implementation of `DnsProvider` for the DNS bot.
//
// - One HTTP request per trait call, except listing, which follows pages
// - No retries, no caching, no background tasks
// - Every failure is returned as a `ProviderError` carrying Cloudflare's first
//   error message and code when the API sent one
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or `Debug` output
// - Missing credentials fail at construction, not on first request
//
// ## API Reference
//
// - Create Zone: POST `/zones`
// - Zone Details: GET `/zones/:zone_id`
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

mod types;

use async_trait::async_trait;
use dnsbot_core::config::ProviderConfig;
use dnsbot_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, RecordPayload, Zone};
use dnsbot_core::{Error, ProviderError, ProviderRegistry, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use types::{DeletedRecord, ResultInfo};

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Records requested per page when listing
const RECORDS_PER_PAGE: u32 = 100;

/// How requests authenticate
#[derive(Clone)]
enum Credentials {
    /// `Authorization: Bearer <token>`
    Token(String),
    /// Legacy global key: `X-Auth-Key` + `X-Auth-Email`
    KeyPair { api_key: String, email: String },
}

impl Credentials {
    /// Pick the credentials from configuration; a token wins over a key pair
    fn from_parts(
        api_token: Option<&str>,
        api_key: Option<&str>,
        email: Option<&str>,
    ) -> Option<Self> {
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(token) = non_empty(api_token) {
            return Some(Credentials::Token(token));
        }
        match (non_empty(api_key), non_empty(email)) {
            (Some(api_key), Some(email)) => Some(Credentials::KeyPair { api_key, email }),
            _ => None,
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::KeyPair { api_key, email } => request
                .header("X-Auth-Key", api_key)
                .header("X-Auth-Email", email),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Credentials::Token(_) => "api_token",
            Credentials::KeyPair { .. } => "api_key",
        }
    }
}

/// Cloudflare DNS provider
///
/// The Debug implementation does NOT expose credentials.
pub struct CloudflareProvider {
    /// ⚠️ NEVER log this value
    credentials: Credentials,

    /// API base URL, without a trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("auth", &self.credentials.kind())
            .field("credentials", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// `Error::Config` when the configuration is not a Cloudflare one, has
    /// no usable credentials, or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let ProviderConfig::Cloudflare {
            api_token,
            api_key,
            email,
            base_url,
            http_timeout_secs,
        } = config
        else {
            return Err(Error::config("Invalid config for Cloudflare provider"));
        };

        let credentials =
            Credentials::from_parts(api_token.as_deref(), api_key.as_deref(), email.as_deref())
                .ok_or_else(|| {
                    Error::config("Cloudflare requires an API token or an API key and email")
                })?;

        if *http_timeout_secs == 0 {
            return Err(Error::config("Cloudflare HTTP timeout must be > 0"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*http_timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url
            .as_deref()
            .unwrap_or(CLOUDFLARE_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            credentials,
            base_url,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and unwrap the response envelope
    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<T, ProviderError> {
        self.send_page(request).await.map(|(result, _)| result)
    }

    /// Send one request, keeping the envelope's pagination block
    async fn send_page<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<(T, Option<ResultInfo>), ProviderError> {
        let response = self
            .credentials
            .apply(request)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        debug!("Cloudflare responded with {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::new(format!("Failed to read response: {}", e)))?;

        types::decode_page(status.as_u16(), &body)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn create_zone(&self, domain_name: &str) -> std::result::Result<Zone, ProviderError> {
        debug!("POST /zones ({})", domain_name);
        let body = serde_json::json!({ "name": domain_name });
        self.send(self.client.post(self.url("/zones")).json(&body))
            .await
    }

    async fn get_zone(&self, zone_id: &str) -> std::result::Result<Zone, ProviderError> {
        debug!("GET /zones/{}", zone_id);
        self.send(self.client.get(self.url(&format!("/zones/{}", zone_id))))
            .await
    }

    async fn list_records(&self, zone_id: &str) -> std::result::Result<Vec<DnsRecord>, ProviderError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            debug!("GET /zones/{}/dns_records (page {})", zone_id, page);
            let url = self.url(&format!(
                "/zones/{}/dns_records?page={}&per_page={}",
                zone_id, page, RECORDS_PER_PAGE
            ));
            let (batch, info): (Vec<DnsRecord>, _) = self.send_page(self.client.get(url)).await?;
            let fetched = batch.len();
            records.extend(batch);

            match info {
                Some(info) if page < info.total_pages && fetched > 0 => page += 1,
                Some(info) if (info.total_count as usize) > records.len() => {
                    return Err(ProviderError::new(format!(
                        "Cloudflare listed {} of {} records for zone {}",
                        records.len(),
                        info.total_count,
                        zone_id
                    )));
                }
                _ => return Ok(records),
            }
        }
    }

    async fn create_record(
        &self,
        zone_id: &str,
        payload: &RecordPayload,
    ) -> std::result::Result<DnsRecord, ProviderError> {
        debug!(
            "POST /zones/{}/dns_records ({} {})",
            zone_id,
            payload.record_type(),
            payload.name()
        );
        let url = self.url(&format!("/zones/{}/dns_records", zone_id));
        self.send(self.client.post(url).json(payload)).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> std::result::Result<DnsRecord, ProviderError> {
        debug!("PUT /zones/{}/dns_records/{}", zone_id, record_id);
        let url = self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id));
        self.send(self.client.put(url).json(payload)).await
    }

    async fn delete_record(
        &self,
        zone_id: &str,
        record_id: &str,
    ) -> std::result::Result<bool, ProviderError> {
        debug!("DELETE /zones/{}/dns_records/{}", zone_id, record_id);
        let url = self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id));
        let deleted: DeletedRecord = self.send(self.client.delete(url)).await?;
        Ok(deleted.id == record_id)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        Ok(Box::new(CloudflareProvider::new(config)?))
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsbot_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_builtin_stores();
/// dnsbot_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_provider("cloudflare", Box::new(CloudflareFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn token_config(token: &str) -> ProviderConfig {
        ProviderConfig::cloudflare_token(token)
    }

    fn key_config(api_key: Option<&str>, email: Option<&str>) -> ProviderConfig {
        ProviderConfig::Cloudflare {
            api_token: None,
            api_key: api_key.map(str::to_string),
            email: email.map(str::to_string),
            base_url: None,
            http_timeout_secs: 30,
        }
    }

    #[test]
    fn token_credentials_are_preferred() {
        let credentials =
            Credentials::from_parts(Some("tok"), Some("key"), Some("a@example.com")).unwrap();
        assert!(matches!(credentials, Credentials::Token(ref t) if t == "tok"));
    }

    #[test]
    fn key_pair_needs_both_parts() {
        assert!(Credentials::from_parts(None, Some("key"), None).is_none());
        assert!(Credentials::from_parts(Some(""), None, Some("a@example.com")).is_none());
        assert!(matches!(
            Credentials::from_parts(None, Some("key"), Some("a@example.com")),
            Some(Credentials::KeyPair { .. })
        ));
    }

    #[test]
    fn key_pair_sets_auth_headers() {
        let credentials = Credentials::KeyPair {
            api_key: "key".to_string(),
            email: "a@example.com".to_string(),
        };
        let request = credentials
            .apply(reqwest::Client::new().get("https://api.example.test/"))
            .build()
            .unwrap();

        assert_eq!(request.headers()["X-Auth-Key"], "key");
        assert_eq!(request.headers()["X-Auth-Email"], "a@example.com");
        assert!(request.headers().get("Authorization").is_none());
    }

    #[test]
    fn token_sets_bearer_header() {
        let request = Credentials::Token("tok".to_string())
            .apply(reqwest::Client::new().get("https://api.example.test/"))
            .build()
            .unwrap();

        assert_eq!(request.headers()["Authorization"], "Bearer tok");
    }

    #[test]
    fn missing_credentials_fail_at_construction() {
        let result = CloudflareProvider::new(&key_config(Some("key"), None));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn custom_config_is_rejected() {
        let config = ProviderConfig::Custom {
            factory: "other".to_string(),
            config: serde_json::json!({}),
        };
        assert!(matches!(
            CloudflareProvider::new(&config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let config = ProviderConfig::Cloudflare {
            api_token: Some("tok".to_string()),
            api_key: None,
            email: None,
            base_url: Some("http://127.0.0.1:8080/client/v4/".to_string()),
            http_timeout_secs: 5,
        };
        let provider = CloudflareProvider::new(&config).unwrap();
        assert_eq!(
            provider.url("/zones/Z1"),
            "http://127.0.0.1:8080/client/v4/zones/Z1"
        );
    }

    #[test]
    fn default_base_url() {
        let provider = CloudflareProvider::new(&token_config("tok")).unwrap();
        assert_eq!(provider.url("/zones"), format!("{}/zones", CLOUDFLARE_API_BASE));
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn credentials_not_exposed_in_debug() {
        let provider = CloudflareProvider::new(&token_config("secret_token_12345")).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));

        let provider =
            CloudflareProvider::new(&key_config(Some("global_key_999"), Some("a@example.com")))
                .unwrap();
        assert!(!format!("{:?}", provider).contains("global_key_999"));
    }

    fn local_provider(base_url: &str) -> CloudflareProvider {
        let config = ProviderConfig::Cloudflare {
            api_token: Some("tok".to_string()),
            api_key: None,
            email: None,
            base_url: Some(base_url.to_string()),
            http_timeout_secs: 2,
        };
        CloudflareProvider::new(&config).unwrap()
    }

    /// Serve `pages[n - 1]` for `?page=n`, recording each request path
    async fn serve_pages(pages: Vec<&'static str>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&head);
                let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
                let page = path
                    .split_once('?')
                    .map(|(_, query)| query)
                    .unwrap_or_default()
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("page="))
                    .and_then(|n| n.parse::<usize>().ok())
                    .unwrap_or(1);
                seen.lock().unwrap().push(path);

                let body = pages.get(page.saturating_sub(1)).copied().unwrap_or(
                    r#"{"success": false, "errors": [{"code": 1, "message": "no such page"}]}"#,
                );
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), requests)
    }

    const FIRST_PAGE: &str = r#"{
        "success": true,
        "result": [
            {"id": "r1", "type": "A", "name": "example.com", "content": "1.1.1.1", "ttl": 1},
            {"id": "r2", "type": "A", "name": "www.example.com", "content": "1.1.1.2", "ttl": 1}
        ],
        "result_info": {"page": 1, "per_page": 100, "count": 2, "total_count": 3, "total_pages": 2}
    }"#;

    const SECOND_PAGE: &str = r#"{
        "success": true,
        "result": [
            {"id": "r3", "type": "MX", "name": "example.com", "content": "mx.example.com", "ttl": 1, "priority": 10}
        ],
        "result_info": {"page": 2, "per_page": 100, "count": 1, "total_count": 3, "total_pages": 2}
    }"#;

    #[tokio::test]
    async fn list_records_follows_every_page() {
        let (base_url, requests) = serve_pages(vec![FIRST_PAGE, SECOND_PAGE]).await;
        let provider = local_provider(&base_url);

        let records = provider.list_records("Z1").await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["r1", "r2", "r3"]);
        assert_eq!(records[2].priority, Some(10));

        let requests = requests.lock().unwrap().clone();
        assert_eq!(
            requests,
            [
                "/zones/Z1/dns_records?page=1&per_page=100",
                "/zones/Z1/dns_records?page=2&per_page=100",
            ]
        );
    }

    #[tokio::test]
    async fn truncated_listing_is_an_error() {
        let (base_url, _) = serve_pages(vec![
            r#"{
                "success": true,
                "result": [
                    {"id": "r1", "type": "A", "name": "example.com", "content": "1.1.1.1", "ttl": 1}
                ],
                "result_info": {"page": 1, "per_page": 100, "count": 1, "total_count": 150, "total_pages": 1}
            }"#,
        ])
        .await;
        let provider = local_provider(&base_url);

        let error = provider.list_records("Z1").await.unwrap_err();
        assert!(error.message.contains("1 of 150"));
    }

    #[tokio::test]
    async fn listing_without_result_info_is_a_single_page() {
        let (base_url, requests) = serve_pages(vec![
            r#"{"success": true, "result": [{"id": "r1", "type": "TXT", "name": "example.com", "content": "v=spf1"}]}"#,
        ])
        .await;
        let provider = local_provider(&base_url);

        let records = provider.list_records("Z1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ttl, 3600);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_a_provider_error() {
        let provider = local_provider("http://127.0.0.1:1");

        let error = provider.get_zone("Z1").await.unwrap_err();
        assert!(error.message.starts_with("HTTP request failed"));
        assert_eq!(error.code, None);
    }

    #[test]
    fn factory_and_registration() {
        let registry = ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_provider("cloudflare"));

        let provider = registry.create_provider(&token_config("tok")).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");

        assert!(CloudflareFactory.create(&key_config(None, None)).is_err());
    }
}
