use crate::constants::*;
use crate::query::{canonicalize, escape, parse_query};
use crate::{Config, ContentMd5Location, Credential, ParamContext};
use async_trait::async_trait;
use bytes::Bytes;
use http::request::Parts;
use http::uri::PathAndQuery;
use http::{HeaderValue, Uri};
use log::debug;
use sigv2_core::hash::{base64_hmac_sha256, base64_md5};
use sigv2_core::time::{now, DateTime};
use sigv2_core::{Context, Error, Result, SignRequest};
use std::sync::Arc;

/// RequestSigner that implements AWS Signature Version 2.
///
/// - [Signature Version 2 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-2.html)
#[derive(Debug)]
pub struct RequestSigner {
    config: Arc<Config>,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for AWS V2.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config, time: None }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut Parts,
        body: Option<&Bytes>,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::config_invalid(
                "no credential available, refusing to send an unsigned request",
            ));
        };
        if cred.secret_access_key.is_empty() {
            return Err(Error::config_invalid("secret access key is empty"));
        }

        let now = self.time.unwrap_or_else(now);
        let pctx = ParamContext {
            credential: cred,
            time: now,
            ctx,
        };

        let mut params = self.config.params.resolve(&pctx);
        if let Some(query) = req.uri.query() {
            params.extend(parse_query(query));
        }
        params.remove(SIGNATURE);

        if let Some(body) = body {
            let digest = content_md5(body);
            match self.config.content_md5 {
                ContentMd5Location::Header => {
                    req.headers
                        .insert(CONTENT_MD5, HeaderValue::from_str(&digest)?);
                }
                ContentMd5Location::Query => {
                    params.insert(CONTENT_MD5_VALUE.to_string(), digest);
                }
            }
        }

        let host = canonical_host(&req.uri)?;
        let path = match req.uri.path() {
            "" => "/",
            v => v,
        };

        let canonical_query = canonicalize(&params);
        debug!("calculated canonical query: {canonical_query}");
        let signature = sign(
            &cred.secret_access_key,
            req.method.as_str(),
            &host,
            path,
            &canonical_query,
        )?;

        let signature = format!("{SIGNATURE}={}", escape(&signature));
        let query = match canonical_query.as_str() {
            "" => signature,
            v => format!("{v}&{signature}"),
        };
        let mut parts = req.uri.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(format!("{path}?{query}"))?);
        req.uri = Uri::from_parts(parts)?;

        Ok(())
    }
}

/// Build the string to sign: method, host, path and canonical query, one per
/// line with no trailing newline.
pub fn string_to_sign(method: &str, host: &str, path: &str, canonical_query: &str) -> String {
    format!(
        "{}\n{host}\n{path}\n{canonical_query}",
        method.to_ascii_uppercase()
    )
}

/// Calculate the base64 encoded HMAC-SHA256 signature of a request.
///
/// Fails with `ConfigInvalid` when `secret` is empty.
pub fn sign(
    secret: &str,
    method: &str,
    host: &str,
    path: &str,
    canonical_query: &str,
) -> Result<String> {
    if secret.is_empty() {
        return Err(Error::config_invalid("secret access key is empty"));
    }

    let string_to_sign = string_to_sign(method, host, path, canonical_query);
    debug!("calculated string to sign: {string_to_sign}");

    let signature = base64_hmac_sha256(secret.as_bytes(), string_to_sign.as_bytes());
    Ok(signature.trim().to_string())
}

/// Base64 encoded MD5 digest of a request body.
pub fn content_md5(body: &[u8]) -> String {
    base64_md5(body).trim().to_string()
}

/// Lowercased host, followed by `:port` when the uri names a port other than
/// the default one of its scheme.
fn canonical_host(uri: &Uri) -> Result<String> {
    let host = uri
        .host()
        .ok_or_else(|| Error::config_invalid(format!("endpoint {uri} has no host")))?
        .to_ascii_lowercase();

    let default_port = match uri.scheme_str() {
        Some("http") => Some(80),
        Some("https") => Some(443),
        _ => None,
    };
    Ok(match uri.port_u16() {
        Some(port) if Some(port) != default_port => format!("{host}:{port}"),
        _ => host,
    })
}
