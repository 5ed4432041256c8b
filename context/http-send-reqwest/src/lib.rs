//! Reqwest-based [`HttpSend`] for sigv2.
//!
//! ```no_run
//! use sigv2_core::Context;
//! use sigv2_http_send_reqwest::ReqwestHttpSend;
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, TryStreamExt};
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use sigv2_core::{BodyStream, Error, HttpSend, Result};

/// ReqwestHttpSend sends requests with a [`reqwest::Client`].
///
/// Timeouts, proxies and TLS are configured on the client.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn execute(&self, req: http::Request<Bytes>) -> Result<http::Response<reqwest::Body>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to build reqwest request").with_source(e))?;
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::unexpected("failed to send request").with_source(e))?;
        Ok(resp.into())
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = self.execute(req).await?.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::unexpected("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }

    async fn http_send_streaming(
        &self,
        req: http::Request<Bytes>,
    ) -> Result<http::Response<BodyStream>> {
        let (parts, body) = self.execute(req).await?.into_parts();
        let body: BodyStream = body
            .into_data_stream()
            .map_err(|e| Error::unexpected("failed to read response body").with_source(e))
            .boxed();
        Ok(http::Response::from_parts(parts, body))
    }
}
