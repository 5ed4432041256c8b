use crate::constants::FORM_CONTENT_TYPE;
use crate::query::{canonicalize, parse_query};
use crate::{Config, Credential, RequestSigner};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::uri::PathAndQuery;
use http::{HeaderValue, Method, Request, Response, StatusCode, Uri};
use log::{debug, warn};
use sigv2_core::channel::{
    response_channel, ResponseReader, ResponseWriter, DEFAULT_CHANNEL_CAPACITY,
};
use sigv2_core::xml::{Decoder, Node};
use sigv2_core::{BodyStream, Context, Error, ProvideCredential, Result, Signer};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Client sends Signature Version 2 requests to one endpoint.
///
/// Non-2xx responses are returned like any other response; checking the status
/// is up to the caller.
#[derive(Debug, Clone)]
pub struct Client {
    signer: Signer<Credential>,
    endpoint: Uri,
}

impl Client {
    /// Create a client for `endpoint`, e.g. `https://webservices.amazon.com/onca/xml`.
    pub fn new(
        ctx: Context,
        endpoint: &str,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        let signer = Signer::new(ctx, provider, RequestSigner::new(Arc::new(config)));
        Self::from_signer(endpoint, signer)
    }

    /// Create a client around an existing signer.
    pub fn from_signer(endpoint: &str, signer: Signer<Credential>) -> Result<Self> {
        let endpoint: Uri = endpoint.parse().map_err(|e| {
            Error::config_invalid(format!("endpoint {endpoint} is not a valid uri")).with_source(e)
        })?;
        if endpoint.scheme().is_none() || endpoint.host().is_none() {
            return Err(Error::config_invalid(format!(
                "endpoint {endpoint} must have a scheme and a host"
            )));
        }

        Ok(Self { signer, endpoint })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// The context requests are sent with.
    pub fn context(&self) -> &Context {
        self.signer.context()
    }

    /// Build a signed request.
    ///
    /// `params` override the configured defaults. A POST without a body
    /// carries the signed parameters as a form body instead of in the query.
    pub async fn signed_request(
        &self,
        method: Method,
        params: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> Result<Request<Bytes>> {
        let uri = self.request_uri(params)?;
        let (mut parts, _) = Request::builder()
            .method(method)
            .uri(uri)
            .body(())?
            .into_parts();
        self.signer.sign(&mut parts, body.as_ref()).await?;

        if parts.method != Method::POST || body.is_some() {
            return Ok(Request::from_parts(parts, body.unwrap_or_default()));
        }

        let form = parts.uri.query().unwrap_or_default().to_string();
        let mut uri = parts.uri.clone().into_parts();
        uri.path_and_query = Some(PathAndQuery::try_from(parts.uri.path())?);
        parts.uri = Uri::from_parts(uri)?;
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        parts
            .headers
            .insert(CONTENT_LENGTH, HeaderValue::from(form.len()));
        Ok(Request::from_parts(parts, Bytes::from(form)))
    }

    /// Build a signed GET url.
    pub async fn url(&self, params: &[(&str, &str)]) -> Result<String> {
        let req = self.signed_request(Method::GET, params, None).await?;
        Ok(req.uri().to_string())
    }

    /// Send a signed request and read the whole response.
    pub async fn send(
        &self,
        method: Method,
        params: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> Result<Response<Bytes>> {
        let req = self.signed_request(method, params, body).await?;
        self.context().http_send(req).await
    }

    /// Send a signed GET request and read the whole response.
    pub async fn get(&self, params: &[(&str, &str)]) -> Result<Response<Bytes>> {
        self.send(Method::GET, params, None).await
    }

    /// Send a signed POST request and read the whole response.
    pub async fn post(
        &self,
        params: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> Result<Response<Bytes>> {
        self.send(Method::POST, params, body).await
    }

    /// Send a signed request and decode the XML response as it arrives.
    pub async fn send_decoded(
        &self,
        method: Method,
        params: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> Result<Response<Node>> {
        let req = self.signed_request(method, params, body).await?;
        let (parts, mut stream) = self.context().http_send_streaming(req).await?.into_parts();

        let total = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let mut decoder = Decoder::new();
        let mut received = 0u64;
        while let Some(chunk) = stream.try_next().await? {
            if chunk.is_empty() {
                continue;
            }
            received += chunk.len() as u64;
            match total {
                Some(total) => {
                    decoder.on_chunk(&chunk, total.saturating_sub(received), total)?
                }
                None => decoder.feed(&chunk)?,
            }
        }
        debug!("received xml response of {received} bytes");

        let root = decoder.finish()?;
        Ok(Response::from_parts(parts, root))
    }

    /// Send a signed request and hand its body to a blocking reader.
    ///
    /// The body is pumped into the returned reader by a task on tokio's
    /// blocking pool; the reader sees the status once the body is complete.
    /// Dropping the reader stops the task at its next write.
    ///
    /// Must be called within a tokio runtime, and the reader must be used from
    /// a thread that is allowed to block.
    pub async fn send_streaming(
        &self,
        method: Method,
        params: &[(&str, &str)],
        body: Option<Bytes>,
    ) -> Result<ResponseReader> {
        let req = self.signed_request(method, params, body).await?;
        let (parts, stream) = self.context().http_send_streaming(req).await?.into_parts();

        let handle = Handle::try_current().map_err(|e| {
            Error::unexpected("streaming responses need a tokio runtime").with_source(e)
        })?;
        let (mut writer, reader) = response_channel(DEFAULT_CHANNEL_CAPACITY);
        tokio::task::spawn_blocking(move || {
            if let Err(err) = pump(&handle, stream, &mut writer, parts.status) {
                warn!("streaming response abandoned: {err}");
            }
        });

        Ok(reader)
    }

    fn request_uri(&self, params: &[(&str, &str)]) -> Result<Uri> {
        let mut pairs = parse_query(self.endpoint.query().unwrap_or_default());
        pairs.retain(|(k, _)| !params.iter().any(|(p, _)| *p == k.as_str()));
        pairs.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let query = canonicalize(pairs);
        let path_and_query = match query.as_str() {
            "" => self.endpoint.path().to_string(),
            query => format!("{}?{query}", self.endpoint.path()),
        };

        let mut parts = self.endpoint.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
        Ok(Uri::from_parts(parts)?)
    }
}

fn pump(
    handle: &Handle,
    mut stream: BodyStream,
    writer: &mut ResponseWriter,
    status: StatusCode,
) -> Result<()> {
    while let Some(chunk) = handle.block_on(stream.try_next())? {
        writer.write(chunk)?;
    }
    writer.close();
    writer.set_status(status)
}
