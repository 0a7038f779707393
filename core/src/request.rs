use std::collections::BTreeMap;

use http::header::HeaderName;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;

use crate::{Error, Result};

/// Ordered list of headers.
///
/// Names keep the case the caller used, lookups are case-insensitive. The
/// lower-case view is only built by [`HeaderList::canonical_index`], the
/// stored names are never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any existing header with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Get the first value whose name matches case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate all values whose name matches case-insensitively, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a header with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a header owned by the signer.
    ///
    /// Existing entries with the same name are replaced in place so the
    /// header keeps its position; extra duplicates are dropped.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(idx) => {
                self.entries[idx].1 = value;
                let mut i = 0;
                self.entries.retain(|(k, _)| {
                    let keep = i <= idx || !k.eq_ignore_ascii_case(name);
                    i += 1;
                    keep
                });
            }
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the lower-case index used for signing.
    ///
    /// - Names are lower-cased, names differing only by case fold together.
    /// - Values are trimmed, folded values are joined by `,` in insertion order.
    ///
    /// Returns [`ErrorKind::RequestMalformed`](crate::ErrorKind::RequestMalformed)
    /// for names that are not valid HTTP tokens or values carrying line breaks,
    /// since either would make the string to sign ambiguous.
    pub fn canonical_index(&self) -> Result<BTreeMap<String, String>> {
        let mut index: BTreeMap<String, String> = BTreeMap::new();

        for (name, value) in &self.entries {
            let name = normalize_header_name(name)?;
            let value = normalize_header_value(&name, value)?;

            index
                .entry(name)
                .and_modify(|v| {
                    v.push(',');
                    v.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        Ok(index)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Lower-case a header name, rejecting anything that is not a valid token.
pub fn normalize_header_name(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::request_malformed("header name must not be empty"));
    }
    HeaderName::from_bytes(name.as_bytes())
        .map(|v| v.as_str().to_string())
        .map_err(|e| {
            Error::request_malformed(format!("header name {name:?} is invalid")).with_source(e)
        })
}

fn normalize_header_value<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.contains(['\r', '\n']) {
        return Err(Error::request_malformed(format!(
            "value of header {name} contains a line break"
        )));
    }
    Ok(value.trim_matches([' ', '\t']))
}

/// Description of a request to be signed.
///
/// The signer only appends to this description: caller headers and query
/// parameters are never removed.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Option<Method>,
    /// Canonical resource path: `/bucket/key`, `/bucket/` or `/`.
    pub resource: Option<String>,
    /// Host the request is sent to, used when a signature covers `host`.
    pub host: Option<String>,
    /// HTTP headers.
    pub headers: HeaderList,
    /// Query parameters, percent decoded. Empty value means value-less parameter.
    pub query: Vec<(String, String)>,
    /// Content type of the body, if known.
    pub content_type: Option<String>,
    /// Base64 encoded MD5 of the body, if known.
    pub content_md5: Option<String>,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `resource`.
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            resource: Some(resource.into()),
            ..Default::default()
        }
    }

    /// Build the resource path for a bucket and an optional object key.
    ///
    /// ```
    /// use ossign_core::RequestDescriptor;
    ///
    /// assert_eq!(RequestDescriptor::resource_path(None, None), "/");
    /// assert_eq!(RequestDescriptor::resource_path(Some("b"), None), "/b/");
    /// assert_eq!(RequestDescriptor::resource_path(Some("b"), Some("a/k")), "/b/a/k");
    /// ```
    pub fn resource_path(bucket: Option<&str>, key: Option<&str>) -> String {
        match (bucket, key) {
            (None, _) => "/".to_string(),
            (Some(bucket), None) => format!("/{bucket}/"),
            (Some(bucket), Some(key)) => format!("/{bucket}/{}", key.trim_start_matches('/')),
        }
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Append a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the content type.
    pub fn with_content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    /// Set the content md5.
    pub fn with_content_md5(mut self, v: impl Into<String>) -> Self {
        self.content_md5 = Some(v.into());
        self
    }

    /// Build a descriptor from http::request::Parts.
    ///
    /// `bucket` is prepended to the request path to form the resource, as
    /// virtual-hosted requests don't carry it in the path.
    pub fn from_parts(parts: &http::request::Parts, bucket: Option<&str>) -> Result<Self> {
        let path = percent_encoding::percent_decode_str(parts.uri.path())
            .decode_utf8()
            .map_err(|e| Error::request_malformed("request path is not valid utf-8").with_source(e))?;
        let resource = match bucket {
            Some(bucket) => format!("/{bucket}{path}"),
            None => path.to_string(),
        };

        let mut headers = HeaderList::new();
        for (name, value) in &parts.headers {
            headers.append(name.as_str(), value.to_str()?);
        }

        Ok(RequestDescriptor {
            method: Some(parts.method.clone()),
            resource: Some(resource),
            host: parts.uri.authority().map(|v| v.as_str().to_string()),
            headers,
            query: parts
                .uri
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            content_type: None,
            content_md5: None,
        })
    }

    /// Apply the signed headers back to http::request::Parts.
    pub fn apply(&self, parts: &mut http::request::Parts) -> Result<()> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let mut value = HeaderValue::from_str(value)?;
            if name == http::header::AUTHORIZATION || name.as_str().ends_with("security-token") {
                value.set_sensitive(true);
            }
            headers.append(name, value);
        }

        parts.headers = headers;
        Ok(())
    }
}
