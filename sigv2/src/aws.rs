//! AWS Signature Version 2 support with convenience APIs.

pub use sigv2_aws::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Result};

/// Create a client for `endpoint` with the default context and credential
/// provider.
///
/// Credentials are read from `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`
/// when the first request is signed.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> sigv2::Result<()> {
/// use sigv2::aws::{default_client, Config};
///
/// let config = Config::new()
///     .with_param("Service", "AWSECommerceService")
///     .with_param("Version", "2011-08-01");
/// let client = default_client("https://webservices.amazon.com/onca/xml", config)?;
///
/// let resp = client.get(&[("Operation", "ItemLookup"), ("ItemId", "0816614024")]).await?;
/// println!("{}", resp.status());
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_client(endpoint: &str, config: Config) -> Result<Client> {
    Client::new(
        default_context(),
        endpoint,
        config,
        DefaultCredentialProvider::new(),
    )
}
