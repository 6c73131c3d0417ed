//! HTTP fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::security::ProxyCredentials;
use crate::traits::fetcher::{FetchRequest, FetchedPage, Fetcher, ProxyRoute};

/// Fetches pages over HTTP(S), optionally through a proxy.
///
/// Direct requests share one pooled client. Proxied requests get a client
/// built for that route, since reqwest binds proxies at client construction.
///
/// Deadlines are owned by the caller (the pipeline wraps every fetch in a
/// timeout and drops the future when it expires).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client for direct requests.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn client_for(&self, route: Option<&ProxyRoute>) -> FetchResult<reqwest::Client> {
        let Some(route) = route else {
            return Ok(self.client.clone());
        };

        let proxy = build_proxy(route)?;
        reqwest::Client::builder()
            .proxy(proxy)
            .build()
            .map_err(|e| FetchError::InvalidProxy(e.to_string()))
    }
}

/// SOCKS proxies take credentials in the URL; HTTP proxies via `Proxy-Authorization`.
fn build_proxy(route: &ProxyRoute) -> FetchResult<reqwest::Proxy> {
    let invalid = |e: &dyn std::fmt::Display| FetchError::InvalidProxy(format!("{}: {e}", route.url));

    let mut url = url::Url::parse(&route.url).map_err(|e| invalid(&e))?;

    match &route.credentials {
        Some(ProxyCredentials { username, password }) if url.scheme().starts_with("socks") => {
            url.set_username(username)
                .map_err(|_| invalid(&"cannot carry a username"))?;
            url.set_password(Some(password.expose()))
                .map_err(|_| invalid(&"cannot carry a password"))?;
            reqwest::Proxy::all(url.as_str()).map_err(|e| invalid(&e))
        }
        Some(ProxyCredentials { username, password }) => Ok(reqwest::Proxy::all(url.as_str())
            .map_err(|e| invalid(&e))?
            .basic_auth(username, password.expose())),
        None => reqwest::Proxy::all(url.as_str()).map_err(|e| invalid(&e)),
    }
}

fn header_map(request: &FetchRequest) -> FetchResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(request.headers.len());
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::Http(Box::new(e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| FetchError::Http(Box::new(e)))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
        debug!(
            url = %request.url,
            proxy = request.proxy.as_ref().map(|r| r.url.as_str()),
            "HTTP fetch starting"
        );

        let client = self.client_for(request.proxy.as_ref())?;
        let response = client
            .get(&request.url)
            .headers(header_map(request)?)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %request.url, error = %e, "HTTP request failed");
                FetchError::Http(Box::new(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %request.url, status = status.as_u16(), "Non-success status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        // Capture final URL after redirects
        let final_url = response.url().to_string();

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        debug!(url = %final_url, bytes = body.len(), "HTTP fetch complete");

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
            content_type,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
