//! AWS Signature Version 2 support for sigv2.
//!
//! This crate signs query-string authenticated requests the way AWS services
//! such as the Product Advertising API, SimpleDB or Elastic MapReduce expect
//! them, and sends them through the transport configured on the
//! [`sigv2_core::Context`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use sigv2_aws::{Client, Config, DefaultCredentialProvider};
//! use sigv2_core::{Context, OsEnv, Result};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let config = Config::new()
//!     .with_param("Service", "AWSECommerceService")
//!     .with_param("Version", "2011-08-01");
//! let client = Client::new(
//!     ctx.with_env(OsEnv),
//!     "https://webservices.amazon.com/onca/xml",
//!     config,
//!     DefaultCredentialProvider::new(),
//! )?;
//!
//! let resp = client
//!     .send_decoded(
//!         http::Method::GET,
//!         &[("Operation", "ItemLookup"), ("ItemId", "0816614024")],
//!         None,
//!     )
//!     .await?;
//! for title in resp.body().find("Title") {
//!     println!("{:?}", title.as_str());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Credential Sources
//!
//! [`DefaultCredentialProvider`] reads `AWS_ACCESS_KEY_ID` and
//! `AWS_SECRET_ACCESS_KEY` through the context environment. Keys known up
//! front can be given with [`StaticCredentialProvider`] or
//! [`DefaultCredentialProvider::with_static`].
//!
//! ## Signing Without Sending
//!
//! [`RequestSigner`] implements [`sigv2_core::SignRequest`] and can be used
//! with a [`sigv2_core::Signer`] on any `http::request::Parts`. The building
//! blocks [`escape`], [`canonicalize`], [`string_to_sign`] and [`sign`] are
//! public as well.

mod client;
pub use client::Client;

mod config;
pub use config::{Config, ContentMd5Location};

mod credential;
pub use credential::Credential;

mod param;
pub use param::{ComputeParam, ParamContext, ParamValue, Params};

mod provide_credential;
pub use provide_credential::*;

mod query;
pub use query::{canonicalize, escape, parse_query};

mod sign_request;
pub use sign_request::{content_md5, sign, string_to_sign, RequestSigner};

mod constants;
pub use constants::{AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY};
