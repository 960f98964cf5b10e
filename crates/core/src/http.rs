//! reqwest-backed transit fetching.

use std::future::Future;
use std::pin::Pin;

use spirit_transit::{DataFetcher, JsonBusSource, TransitError};

#[derive(Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl DataFetcher for ReqwestFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = spirit_transit::Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| TransitError::Fetch(e.to_string()))?;

            let body = response
                .bytes()
                .await
                .map_err(|e| TransitError::Fetch(e.to_string()))?;

            Ok(body.to_vec())
        })
    }
}

/// JSON bus feed over HTTP; `{route}` in the template is the route short name.
pub fn http_bus_source(url_template: impl Into<String>) -> JsonBusSource<ReqwestFetcher> {
    JsonBusSource::new(ReqwestFetcher::new(), url_template)
}

#[cfg(test)]
mod tests {
    use spirit_transit::{BusSource, RouteShortName};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answer a single request with `status` and `body`; returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn fetcher() -> ReqwestFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        ReqwestFetcher::with_client(client)
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let url = serve_once("200 OK", "[]").await;

        let body = fetcher().fetch(&url).await.unwrap();
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_error_status_is_a_fetch_error() {
        let url = serve_once("503 Service Unavailable", "down").await;

        let result = fetcher().fetch(&url).await;

        let Err(TransitError::Fetch(message)) = &result else {
            panic!("expected a fetch error, got {result:?}");
        };
        assert!(message.contains("503"), "{message}");
    }

    #[tokio::test]
    async fn test_json_source_over_http() {
        let base = serve_once(
            "200 OK",
            r#"[{ "key": "1042", "location": { "latitude": 30.61, "longitude": -96.34, "heading": 90.0 } }]"#,
        )
        .await;
        let source = JsonBusSource::new(fetcher(), format!("{base}/buses/{{route}}"));

        let buses = source.get_buses(&RouteShortName::new("01")).await.unwrap();

        assert_eq!(buses.len(), 1);
        assert_eq!(buses[0].key.as_str(), "1042");
        assert_eq!(buses[0].heading(), Some(90.0));
    }
}
