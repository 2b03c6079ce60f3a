//! HTTP implementation of the cache client
//!
//! Talks to the cache service's REST surface. The cache name is part of
//! every path; keys travel as percent-encoded path segments. A `ttl` of
//! `None` falls back to the client's default TTL, and omitting the TTL
//! entirely lets the service apply the cache's own default.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::{CacheClient, CacheCreate, CacheError, CacheResult, Deleted, Fetched};

/// Per-request timeout; the pipeline imposes no timeout of its own.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for one destination cache.
#[derive(Debug)]
pub struct HttpCacheClient {
    http: reqwest::Client,
    base: Url,
    cache: String,
    default_ttl: Option<Duration>,
}

impl HttpCacheClient {
    /// Build a client bound to `cache` on the service at `endpoint`.
    pub fn new(endpoint: &str, token: &str, cache: impl Into<String>) -> CacheResult<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| CacheError::Init(format!("invalid endpoint {endpoint:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(CacheError::Init(format!(
                "endpoint {endpoint:?} cannot carry a path"
            )));
        }

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| CacheError::Init("auth token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CacheError::Init(e.to_string()))?;

        Ok(Self {
            http,
            base,
            cache: cache.into(),
            default_ttl: None,
        })
    }

    /// Client-side default TTL applied when a call passes no TTL.
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Name of the cache this client is bound to.
    pub fn cache_name(&self) -> &str {
        &self.cache
    }

    fn url(&self, segments: &[&str]) -> CacheResult<Url> {
        let mut url = self.base.clone();
        // path_segments_mut percent-encodes each segment, so keys with
        // slashes or spaces stay intact.
        url.path_segments_mut()
            .map_err(|_| CacheError::config("endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn ttl_ms(&self, ttl: Option<Duration>) -> Option<u64> {
        ttl.or(self.default_ttl).map(|t| t.as_millis() as u64)
    }

    /// Map a response's status onto the shared error taxonomy.
    async fn ensure_success(response: reqwest::Response) -> CacheResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CacheError::AuthFailed(message));
        }
        Err(CacheError::backend(status.as_u16(), message))
    }
}

#[async_trait]
impl CacheClient for HttpCacheClient {
    async fn create_cache(&self) -> CacheResult<CacheCreate> {
        let url = self.url(&["caches"])?;
        let response = self
            .http
            .post(url)
            .json(&CreateCacheBody { name: &self.cache })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Ok(CacheCreate::AlreadyExists);
        }
        Self::ensure_success(response).await?;
        Ok(CacheCreate::Created)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let url = self.url(&["caches", &self.cache, "string", key])?;
        let body = SetBody {
            value,
            ttl_ms: self.ttl_ms(ttl),
        };
        let response = self.http.put(url).json(&body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn set_fields(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let url = self.url(&["caches", &self.cache, "dictionary", key])?;
        let body = SetFieldsBody {
            fields,
            ttl_ms: self.ttl_ms(ttl),
        };
        let response = self.http.put(url).json(&body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<Deleted> {
        let url = self.url(&["caches", &self.cache, "keys", key])?;
        let response = self.http.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Deleted::Missed);
        }
        Self::ensure_success(response).await?;
        Ok(Deleted::Deleted)
    }

    async fn push_all(
        &self,
        key: &str,
        elements: &[String],
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let url = self.url(&["caches", &self.cache, "list", key, "concatenate"])?;
        let body = PushAllBody {
            elements,
            ttl_ms: self.ttl_ms(ttl),
        };
        let response = self.http.post(url).json(&body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn add_elements(
        &self,
        key: &str,
        members: &HashSet<String>,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let url = self.url(&["caches", &self.cache, "set", key, "elements"])?;
        let body = AddElementsBody {
            members,
            ttl_ms: self.ttl_ms(ttl),
        };
        let response = self.http.post(url).json(&body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn add_scored_member(&self, key: &str, member: &str, score: f64) -> CacheResult<()> {
        let url = self.url(&["caches", &self.cache, "sorted-set", key, "elements"])?;
        let body = AddScoredMemberBody { member, score };
        let response = self.http.post(url).json(&body).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Fetched<String>> {
        let url = self.url(&["caches", &self.cache, "string", key])?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Fetched::Miss);
        }
        let body: ValueBody = Self::ensure_success(response).await?.json().await?;
        Ok(Fetched::Hit(body.value))
    }

    async fn fetch_fields(&self, key: &str) -> CacheResult<Fetched<HashMap<String, String>>> {
        let url = self.url(&["caches", &self.cache, "dictionary", key])?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Fetched::Miss);
        }
        let body: FieldsBody = Self::ensure_success(response).await?.json().await?;
        Ok(Fetched::Hit(body.fields))
    }

    async fn fetch_list(&self, key: &str) -> CacheResult<Fetched<Vec<String>>> {
        let url = self.url(&["caches", &self.cache, "list", key])?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Fetched::Miss);
        }
        let body: ElementsBody = Self::ensure_success(response).await?.json().await?;
        Ok(Fetched::Hit(body.elements))
    }

    async fn fetch_set(&self, key: &str) -> CacheResult<Fetched<HashSet<String>>> {
        let url = self.url(&["caches", &self.cache, "set", key])?;
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Fetched::Miss);
        }
        let body: MembersBody = Self::ensure_success(response).await?.json().await?;
        Ok(Fetched::Hit(body.members))
    }
}

// Request and response bodies for the REST surface.

#[derive(Serialize)]
struct CreateCacheBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct SetBody<'a> {
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

#[derive(Serialize)]
struct SetFieldsBody<'a> {
    fields: &'a HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

#[derive(Serialize)]
struct PushAllBody<'a> {
    elements: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

#[derive(Serialize)]
struct AddElementsBody<'a> {
    members: &'a HashSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

#[derive(Serialize)]
struct AddScoredMemberBody<'a> {
    member: &'a str,
    score: f64,
}

#[derive(Deserialize)]
struct ValueBody {
    value: String,
}

#[derive(Deserialize)]
struct FieldsBody {
    fields: HashMap<String, String>,
}

#[derive(Deserialize)]
struct ElementsBody {
    elements: Vec<String>,
}

#[derive(Deserialize)]
struct MembersBody {
    members: HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpCacheClient {
        HttpCacheClient::new("https://cache.example.com", "secret", "prod-cache").unwrap()
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let err = HttpCacheClient::new("not a url", "t", "c").unwrap_err();
        assert!(matches!(err, CacheError::Init(_)));
    }

    #[test]
    fn test_url_encodes_key_segments() {
        let url = client().url(&["caches", "prod-cache", "string", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cache.example.com/caches/prod-cache/string/a%2Fb%20c"
        );
    }

    #[test]
    fn test_default_ttl_fallback() {
        let client = client().with_default_ttl(Some(Duration::from_secs(60)));
        assert_eq!(client.ttl_ms(None), Some(60_000));
        assert_eq!(client.ttl_ms(Some(Duration::from_secs(5))), Some(5_000));

        let bare = HttpCacheClient::new("https://c.example.com", "t", "c").unwrap();
        assert_eq!(bare.ttl_ms(None), None);
    }
}
