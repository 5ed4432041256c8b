use crate::{ParamValue, Params};

/// Where the digest of a request body is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMd5Location {
    /// In the `Content-MD5` header.
    #[default]
    Header,
    /// In the signed `ContentMD5Value` query parameter.
    Query,
}

/// Config for Signature Version 2 requests.
///
/// Build it once and share it; every request signed with it starts from the
/// same default parameters.
///
/// ```
/// use sigv2_aws::Config;
///
/// let config = Config::new()
///     .with_param("Service", "AWSECommerceService")
///     .with_param("Version", "2011-08-01");
/// assert_eq!(config.params.len(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameters added to every request. Parameters given with a request
    /// override these.
    pub params: Params,
    /// Placement of the body digest.
    pub content_md5: ContentMd5Location,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            params: Params::signature_v2(),
            content_md5: ContentMd5Location::default(),
        }
    }
}

impl Config {
    /// Create a config carrying the Signature Version 2 default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Remove a default parameter.
    pub fn without_param(mut self, key: &str) -> Self {
        self.params.remove(key);
        self
    }

    /// Choose where the body digest goes.
    pub fn with_content_md5(mut self, location: ContentMd5Location) -> Self {
        self.content_md5 = location;
        self
    }
}
