use crate::constants::*;
use crate::Credential;
use sigv2_core::time::{format_iso8601, DateTime};
use sigv2_core::Context;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Everything a computed parameter may depend on while a request is signed.
#[derive(Debug, Clone, Copy)]
pub struct ParamContext<'a> {
    /// Credential the request is signed with.
    pub credential: &'a Credential,
    /// Signing time.
    pub time: DateTime,
    /// Runtime context of the signer.
    pub ctx: &'a Context,
}

/// Function producing a parameter value at signing time.
pub type ComputeParam = Arc<dyn Fn(&ParamContext<'_>) -> Option<String> + Send + Sync>;

/// A query parameter value.
#[derive(Clone)]
pub enum ParamValue {
    /// A fixed value.
    Literal(String),
    /// A value resolved once per request when it is signed. `None` leaves the
    /// parameter out of the request.
    Computed(ComputeParam),
}

impl ParamValue {
    /// Build a computed value.
    pub fn computed(
        f: impl Fn(&ParamContext<'_>) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        ParamValue::Computed(Arc::new(f))
    }

    /// Resolve the value for one request.
    pub fn resolve(&self, pctx: &ParamContext<'_>) -> Option<String> {
        match self {
            ParamValue::Literal(v) => Some(v.clone()),
            ParamValue::Computed(f) => f(pctx),
        }
    }
}

impl Debug for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            ParamValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Literal(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Literal(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Literal(value.clone())
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Literal(value.to_string())
                }
            }
        )*
    };
}

impl_from_number!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Query parameters keyed by name.
///
/// Inserting an existing key replaces its value.
#[derive(Debug, Clone, Default)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameters every Signature Version 2 request carries:
    ///
    /// - `AWSAccessKeyId`: the access key id of the signing credential
    /// - `SignatureVersion`: `2`
    /// - `SignatureMethod`: `HmacSHA256`
    /// - `Timestamp`: the signing time in ISO 8601 UTC
    pub fn signature_v2() -> Self {
        Self::new()
            .with(
                AWS_ACCESS_KEY_ID_PARAM,
                ParamValue::computed(|p| Some(p.credential.access_key_id.clone())),
            )
            .with(SIGNATURE_VERSION, VERSION_2)
            .with(SIGNATURE_METHOD, HMAC_SHA256)
            .with(
                TIMESTAMP,
                ParamValue::computed(|p| Some(format_iso8601(p.time))),
            )
    }

    /// Set a parameter and return the map.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a parameter.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    /// Get a parameter.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay `other` on top of this map; its values win.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Resolve every value for one request, dropping the ones that resolve
    /// to `None`. The result is ordered by key.
    pub fn resolve(&self, pctx: &ParamContext<'_>) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.resolve(pctx).map(|v| (k.clone(), v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
