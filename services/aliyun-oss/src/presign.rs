use std::time::Duration;

use http::Method;
use ossign_core::time::DateTime;
use ossign_core::{Error, HeaderList, Result};

/// When a presigned URL stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Valid until this instant.
    At(DateTime),
    /// Valid for this long after signing.
    In(Duration),
}

impl Expiration {
    /// Resolve to an absolute instant relative to the signing time.
    pub fn resolve(&self, now: DateTime) -> Result<DateTime> {
        match self {
            Expiration::At(t) => Ok(*t),
            Expiration::In(d) => {
                let delta = chrono::TimeDelta::from_std(*d).map_err(|e| {
                    Error::request_malformed(format!("expires in {d:?} is out of range"))
                        .with_source(e)
                })?;
                now.checked_add_signed(delta)
                    .ok_or_else(|| Error::request_malformed(format!("expires in {d:?} is out of range")))
            }
        }
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::In(Duration::from_secs(15 * 60))
    }
}

/// Description of a URL to presign.
///
/// Headers and body metadata set here must be sent as-is by whoever uses the
/// URL, they are covered by the signature.
#[derive(Debug, Clone)]
pub struct PresignRequest {
    /// Bucket name, becomes the first label of the host.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// HTTP method, default to `GET`.
    pub method: Method,
    /// Expiration, default to 15 minutes after signing.
    pub expiration: Expiration,
    /// Content type the request will carry.
    pub content_type: Option<String>,
    /// Base64 MD5 of the body the request will carry.
    pub content_md5: Option<String>,
    /// Headers the request will carry.
    pub headers: HeaderList,
    /// Extra query parameters, appended to the URL.
    pub query: Vec<(String, String)>,
    /// Names of headers signed in V2 besides the always-signed ones.
    pub additional_header_names: Vec<String>,
}

impl PresignRequest {
    /// Presign a `GET` of `key` in `bucket`.
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            method: Method::GET,
            expiration: Expiration::default(),
            content_type: None,
            content_md5: None,
            headers: HeaderList::new(),
            query: Vec::new(),
            additional_header_names: Vec::new(),
        }
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Expire at an absolute instant.
    pub fn with_expiration(mut self, expiration: DateTime) -> Self {
        self.expiration = Expiration::At(expiration);
        self
    }

    /// Expire `duration` after signing.
    pub fn with_expires_in(mut self, duration: Duration) -> Self {
        self.expiration = Expiration::In(duration);
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, v: &str) -> Self {
        self.content_type = Some(v.to_string());
        self
    }

    /// Set the content md5.
    pub fn with_content_md5(mut self, v: &str) -> Self {
        self.content_md5 = Some(v.to_string());
        self
    }

    /// Add a header the request will carry.
    pub fn add_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Add a query parameter.
    pub fn add_query_parameter(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Opt a header into the V2 signature.
    pub fn add_additional_header_name(mut self, name: &str) -> Self {
        self.additional_header_names.push(name.to_string());
        self
    }
}
