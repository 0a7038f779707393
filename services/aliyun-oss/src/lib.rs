//! Aliyun OSS request signing for ossign.
//!
//! This crate signs requests to Alibaba Cloud Object Storage Service (OSS)
//! with either of its two signature versions, and builds presigned URLs.
//!
//! ## Overview
//!
//! OSS accepts two signature versions:
//!
//! - **V1** (`OSS`): HMAC-SHA1 over a fixed layout of method, body metadata,
//!   date, `x-oss-*` headers and a resource filtered to known sub-resources.
//! - **V2** (`OSS2`): HMAC-SHA256 with a derived key over the method, the
//!   encoded resource, every query parameter and a set of signed headers the
//!   caller may extend.
//!
//! [`RequestSigner`] holds the active version. It can be switched at runtime
//! with [`RequestSigner::set_version`], every call signs under the version it
//! read when it started.
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use ossign_aliyun_oss::{AdditionalHeaders, Config, Credential, RequestSigner};
//! use ossign_core::RequestDescriptor;
//!
//! # fn main() -> ossign_core::Result<()> {
//! let signer = RequestSigner::new(Config::default());
//! let cred = Credential::new("access_key_id", "access_key_secret");
//!
//! let mut req = RequestDescriptor::new(Method::GET, "/bucket/object.txt")
//!     .with_host("bucket.oss-cn-beijing.aliyuncs.com");
//! signer.authorize(&mut req, &cred, &AdditionalHeaders::default())?;
//!
//! assert!(req.headers.get("authorization").unwrap().starts_with("OSS2 "));
//! # Ok(())
//! # }
//! ```
//!
//! ## Presigned URLs
//!
//! ```
//! use std::time::Duration;
//! use http::Method;
//! use ossign_aliyun_oss::{Config, Credential, PresignRequest, RequestSigner, SignatureVersion};
//!
//! # fn main() -> ossign_core::Result<()> {
//! let signer = RequestSigner::new(
//!     Config::default().with_endpoint("https://oss-cn-beijing.aliyuncs.com"),
//! );
//! signer.set_version(SignatureVersion::V1);
//!
//! let url = signer.presign(
//!     &PresignRequest::new("bucket", "object.txt")
//!         .with_method(Method::PUT)
//!         .with_expires_in(Duration::from_secs(600)),
//!     &Credential::new("access_key_id", "access_key_secret"),
//! )?;
//! assert!(url.starts_with("https://bucket.oss-cn-beijing.aliyuncs.com/object.txt?Expires="));
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`Config::from_env`] reads:
//!
//! ```bash
//! export OSS_ENDPOINT=https://oss-cn-beijing.aliyuncs.com
//! export OSS_SIGNATURE_VERSION=v2  # or v1
//! ```
//!
//! Credentials are always supplied by the caller.

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod version;
pub use version::{SignatureVersion, VersionSwitch};

mod canonical;
pub use canonical::{canonicalize, AdditionalHeaders, CanonicalRequest, SigningMethod};

mod signature;
pub use signature::sign;

mod presign;
pub use presign::{Expiration, PresignRequest};

mod sign_request;
pub use sign_request::RequestSigner;

mod verify;
pub use verify::Verifier;
