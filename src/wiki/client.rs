//! HTTP client for a MediaWiki `api.php` endpoint.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::WikiConfig;
use crate::error::{Error, Result};

/// Thin wrapper around one pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct WikiClient {
    http: Client,
    api_url: Url,
}

impl WikiClient {
    /// Build a client from configuration.
    pub fn new(config: &WikiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    /// The endpoint this client talks to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Issue one `GET` with the given query parameters.
    ///
    /// `format=json` and `origin=*` are always added. An `{"error": {...}}`
    /// body, or one that does not fit `T`, becomes [`Error::WikiApi`].
    pub async fn get<T: DeserializeOwned>(&self, params: &[(&str, String)]) -> Result<T> {
        tracing::debug!(url = %self.api_url, ?params, "Wiki API request");

        let response = self
            .http
            .get(self.api_url.clone())
            .query(&[("format", "json"), ("origin", "*")])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;

        if let Some(error) = body.get("error") {
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or("unknown API error");
            return Err(Error::WikiApi(info.to_string()));
        }

        serde_json::from_value(body)
            .map_err(|e| Error::WikiApi(format!("unexpected response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> WikiClient {
        let config = WikiConfig::new(&format!("{}/api.php", server.url())).unwrap();
        WikiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_adds_format_and_origin() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api.php")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("origin".into(), "*".into()),
                Matcher::UrlEncoded("action".into(), "query".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"batchcomplete":""}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let body: Value = client.get(&[("action", "query".into())]).await.unwrap();
        assert_eq!(body["batchcomplete"], "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_payload() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"error":{"code":"missingtitle","info":"The page you specified doesn't exist."}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>(&[]).await.unwrap_err();
        match err {
            Error::WikiApi(info) => assert_eq!(info, "The page you specified doesn't exist."),
            other => panic!("expected WikiApi error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_upstream_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Hit {
            #[allow(dead_code)]
            snippet: String,
        }

        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api.php")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"snippet":null}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get::<Hit>(&[]).await.unwrap_err();
        assert!(matches!(err, Error::WikiApi(_)));
        assert!(err.is_tool_failure());
        assert!(err.to_string().starts_with("API request failed: unexpected response:"));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api.php")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get::<Value>(&[]).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(err.is_tool_failure());
    }
}
