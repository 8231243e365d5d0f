use crate::core::error::VchatError;
use futures::stream::{BoxStream, StreamExt};
use reqwest::{Client, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper around one persistent reqwest client, bound to a provider
/// endpoint and its credential header. Reused across every call for the
/// process lifetime.
#[derive(Clone, Debug)]
pub struct HttpClient {
    base_url: String,
    auth_header: Option<(String, String)>,
    extra_headers: HashMap<String, String>,
    client: Client,
}

impl HttpClient {
    pub fn new(
        base_url: String,
        auth_header: Option<(String, String)>,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Result<Self, VchatError> {
        // No overall timeout: it would cut long streaming responses short.
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            base_url,
            auth_header,
            extra_headers: extra_headers.unwrap_or_default(),
            client,
        })
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, VchatError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some((name, value)) = &self.auth_header {
            request = request.header(name, value);
        }
        for (key, value) in &self.extra_headers {
            request = request.header(key, value);
        }

        let response = request.json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(300).collect();
            return Err(VchatError::Api(format!(
                "{} returned {}: {}",
                url, status, excerpt
            )));
        }
        Ok(response)
    }

    /// Turns an HTTP response body into a stream of text fragments. The
    /// parser receives each transport chunk and returns `Ok(None)` for
    /// chunks carrying no content delta, which are dropped from the stream.
    pub async fn stream_response<F>(
        &self,
        response: Response,
        parser: F,
    ) -> Result<BoxStream<'static, Result<String, VchatError>>, VchatError>
    where
        F: Fn(String) -> Result<Option<String>, VchatError> + Send + Sync + 'static,
    {
        let stream = response
            .bytes_stream()
            .map(|item| {
                item.map_err(VchatError::from).and_then(|chunk| {
                    String::from_utf8(chunk.to_vec())
                        .map_err(|e| VchatError::Serialization(format!("non-UTF-8 chunk: {}", e)))
                })
            })
            .filter_map(move |item| {
                let fragment = match item {
                    Ok(text) => parser(text).transpose(),
                    Err(e) => Some(Err(e)),
                };
                async move { fragment }
            });

        Ok(stream.boxed())
    }
}
