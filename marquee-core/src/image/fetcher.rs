use std::{fmt::Debug, str::FromStr};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::debug;

use super::DecodedImage;
use crate::config::NetworkConfig;
use crate::error::{FetchError, MediaError, Result};

/// Turns an image URL into a decoded bitmap with a single request.
///
/// Dropping the returned future aborts the request; nothing is delivered.
#[async_trait]
pub trait ImageFetcher: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> std::result::Result<DecodedImage, FetchError>;
}

/// reqwest-backed fetcher. No retries: a failure is reported once.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(header_map(config)?)
            .build()
            .map_err(|err| {
                MediaError::Config(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self { client })
    }
}

fn header_map(config: &NetworkConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());
    for (name, value) in &config.headers {
        let name = HeaderName::from_str(name).map_err(|err| {
            MediaError::Config(format!("invalid header name {name:?}: {err}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            MediaError::Config(format!("invalid value for header {name}: {err}"))
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<DecodedImage, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }
        debug!(url, bytes = body.len(), "image downloaded");

        tokio::task::spawn_blocking(move || DecodedImage::decode(&body))
            .await
            .map_err(|err| FetchError::Decode {
                url: url.to_string(),
                reason: format!("decode task failed: {err}"),
            })?
            .map_err(|err| FetchError::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Fetcher used when network access is switched off. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledFetcher;

#[async_trait]
impl ImageFetcher for DisabledFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<DecodedImage, FetchError> {
        Err(FetchError::Disabled(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png() -> (DecodedImage, Vec<u8>) {
        let image = DecodedImage::from_rgba(3, 3, vec![200; 36]).unwrap();
        let bytes = image.encode_png().unwrap();
        (image, bytes)
    }

    fn fetcher() -> HttpImageFetcher {
        HttpImageFetcher::new(&NetworkConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn decodes_successful_response() {
        let server = MockServer::start().await;
        let (image, bytes) = png();
        Mock::given(method("GET"))
            .and(path("/t/p/w500/poster.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/t/p/w500/poster.png", server.uri());
        let fetched = fetcher().fetch(&url).await.unwrap();

        assert_eq!(fetched, image);
    }

    #[tokio::test]
    async fn configured_headers_are_sent() {
        let server = MockServer::start().await;
        let (_, bytes) = png();
        Mock::given(method("GET"))
            .and(header("x-api-key", "da2-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = NetworkConfig::default();
        config
            .headers
            .insert("x-api-key".to_string(), "da2-secret".to_string());
        let fetcher = HttpImageFetcher::new(&config).unwrap();

        assert!(fetcher.fetch(&format!("{}/a.png", server.uri())).await.is_ok());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/missing.png", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status.as_u16() == 404
        ));
    }

    #[tokio::test]
    async fn empty_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/empty.png", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::EmptyBody(_)));
    }

    #[tokio::test]
    async fn undecodable_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html>nope</html>"),
            )
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/page.png", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Nothing listens on port 1.
        let err = fetcher()
            .fetch("http://127.0.0.1:1/x.png")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[test]
    fn invalid_header_is_a_config_error() {
        let mut config = NetworkConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "v".to_string());

        assert!(matches!(
            HttpImageFetcher::new(&config),
            Err(MediaError::Config(_))
        ));
    }

    #[tokio::test]
    async fn disabled_fetcher_always_fails() {
        let err = DisabledFetcher.fetch("https://host/a.png").await.unwrap_err();
        assert!(matches!(err, FetchError::Disabled(_)));
    }
}
