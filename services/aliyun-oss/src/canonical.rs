//! Canonicalization of requests into the string to sign.
//!
//! V1 and V2 go through the same steps (validate, index headers, pick signed
//! headers, render resource and query) and only differ by the [`Rules`] they
//! run with.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write;

use http::header::{CONTENT_TYPE, DATE};
use log::debug;
use percent_encoding::utf8_percent_encode;

use ossign_core::time::DateTime;
use ossign_core::{normalize_header_name, Error, RequestDescriptor, Result};

use crate::constants::*;
use crate::SignatureVersion;

/// How a request is being signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signature travels in the `Authorization` header, dated by the `Date` header.
    Header,
    /// Signature travels in the query, valid until the given instant.
    Query(DateTime),
}

/// Header names a caller opted into signing beyond the always-signed set.
///
/// Names are lower-cased on insertion; only V2 honors them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalHeaders(BTreeSet<String>);

impl AdditionalHeaders {
    /// Build the set from header names in any case.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = normalize_header_name(name.as_ref())?;
            if name == http::header::AUTHORIZATION.as_str() {
                return Err(Error::request_malformed(
                    "authorization can't be an additional signed header",
                ));
            }
            set.insert(name);
        }
        Ok(Self(set))
    }

    /// Whether `name` (already lower-cased) was opted in.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Whether no header was opted in.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of canonicalizing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// The exact text the signature covers.
    pub string_to_sign: String,
    /// Additional headers that ended up signed, sorted and lower-cased.
    ///
    /// Always empty for V1.
    pub additional_headers: Vec<String>,
}

impl CanonicalRequest {
    /// Additional header names in wire form: `a;b;c`.
    pub fn additional_headers_value(&self) -> String {
        self.additional_headers.join(";")
    }
}

/// Shape of the string to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `METHOD \n MD5 \n TYPE \n DATE \n x-oss headers resource`
    Legacy,
    /// `METHOD \n URI \n QUERY \n headers \n additional names`
    Canonical,
}

/// Per-version canonicalization rules.
#[derive(Debug)]
struct Rules {
    /// Headers signed besides every `x-oss-*` header.
    mandatory_headers: &'static [&'static str],
    /// Whether caller opt-in headers are signed.
    honor_additional: bool,
    /// Encoding applied to the resource path.
    encode_resource: fn(&str) -> String,
    layout: Layout,
}

static V1_RULES: Rules = Rules {
    mandatory_headers: &[],
    honor_additional: false,
    encode_resource: verbatim,
    layout: Layout::Legacy,
};

static V2_RULES: Rules = Rules {
    mandatory_headers: &[CONTENT_MD5, "content-type", "date", "host"],
    honor_additional: true,
    encode_resource: uri_encode,
    layout: Layout::Canonical,
};

impl Rules {
    fn of(version: SignatureVersion) -> &'static Rules {
        match version {
            SignatureVersion::V1 => &V1_RULES,
            SignatureVersion::V2 => &V2_RULES,
        }
    }

    fn is_mandatory(&self, name: &str) -> bool {
        name.starts_with(X_OSS_PREFIX) || self.mandatory_headers.contains(&name)
    }

    fn is_signed(&self, name: &str, additional: &AdditionalHeaders) -> bool {
        self.is_mandatory(name) || (self.honor_additional && additional.contains(name))
    }
}

fn verbatim(s: &str) -> String {
    s.to_string()
}

fn uri_encode(s: &str) -> String {
    utf8_percent_encode(s, &OSS_URI_ENCODE_SET).to_string()
}

fn query_encode(s: &str) -> String {
    utf8_percent_encode(s, &OSS_QUERY_ENCODE_SET).to_string()
}

/// Canonicalize `req` under `version`.
///
/// `sub_resources` lists the query parameters that take part in the V1
/// canonicalized resource; V2 signs every query parameter and ignores it.
pub fn canonicalize(
    req: &RequestDescriptor,
    version: SignatureVersion,
    method: SigningMethod,
    additional: &AdditionalHeaders,
    sub_resources: &HashSet<String>,
) -> Result<CanonicalRequest> {
    let http_method = req
        .method
        .as_ref()
        .ok_or_else(|| Error::request_malformed("http method is required"))?;
    let resource = req
        .resource
        .as_deref()
        .filter(|v| v.starts_with('/'))
        .ok_or_else(|| Error::request_malformed("resource path is required"))?;
    if let Some((k, _)) = req
        .query
        .iter()
        .find(|(k, _)| RESERVED_QUERY_PARAMS.contains(&k.as_str()))
    {
        return Err(Error::request_malformed(format!(
            "query parameter {k} is reserved for presigning"
        )));
    }

    let rules = Rules::of(version);
    let headers = header_index(req, method)?;

    let additional_headers: Vec<String> = if rules.honor_additional {
        headers
            .keys()
            .filter(|k| !rules.is_mandatory(k) && additional.contains(k))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    let mut s = String::with_capacity(256);
    match rules.layout {
        Layout::Legacy => {
            writeln!(s, "{http_method}")?;
            writeln!(s, "{}", header_or_empty(&headers, CONTENT_MD5))?;
            writeln!(s, "{}", header_or_empty(&headers, CONTENT_TYPE.as_str()))?;
            let date = headers
                .get(DATE.as_str())
                .ok_or_else(|| Error::request_malformed("date header is required"))?;
            writeln!(s, "{date}")?;
            for (k, v) in headers.iter().filter(|(k, _)| rules.is_signed(k, additional)) {
                writeln!(s, "{k}:{v}")?;
            }
            write!(
                s,
                "{}",
                canonicalize_resource(resource, req, sub_resources, rules)
            )?;
        }
        Layout::Canonical => {
            writeln!(s, "{http_method}")?;
            writeln!(s, "{}", (rules.encode_resource)(resource))?;
            writeln!(s, "{}", canonicalize_query(req))?;
            for (k, v) in headers.iter().filter(|(k, _)| rules.is_signed(k, additional)) {
                writeln!(s, "{k}:{v}")?;
            }
            writeln!(s)?;
            write!(s, "{}", additional_headers.join(";"))?;
        }
    }

    debug!("string to sign ({version}): {s:?}");
    Ok(CanonicalRequest {
        string_to_sign: s,
        additional_headers,
    })
}

/// Lower-case view of every header the request will carry.
///
/// Body metadata fields are merged in; in query signing, `date` carries the
/// expiration epoch seconds instead of the `Date` header.
fn header_index(req: &RequestDescriptor, method: SigningMethod) -> Result<BTreeMap<String, String>> {
    let mut index = req.headers.canonical_index()?;

    merge_field(&mut index, CONTENT_TYPE.as_str(), req.content_type.as_deref())?;
    merge_field(&mut index, CONTENT_MD5, req.content_md5.as_deref())?;

    if let SigningMethod::Query(expires) = method {
        index.insert(DATE.as_str().to_string(), expires.timestamp().to_string());
    }

    Ok(index)
}

fn merge_field(index: &mut BTreeMap<String, String>, name: &str, field: Option<&str>) -> Result<()> {
    let Some(field) = field.map(str::trim) else {
        return Ok(());
    };

    match index.get(name) {
        Some(v) if v != field => Err(Error::request_malformed(format!(
            "{name} is set to both {field:?} and {v:?}"
        ))),
        Some(_) => Ok(()),
        None => {
            index.insert(name.to_string(), field.to_string());
            Ok(())
        }
    }
}

fn header_or_empty<'a>(index: &'a BTreeMap<String, String>, name: &str) -> &'a str {
    index.get(name).map(String::as_str).unwrap_or("")
}

/// `/bucket/key?sub&sub2=value`, only whitelisted sub-resources, sorted.
fn canonicalize_resource(
    resource: &str,
    req: &RequestDescriptor,
    sub_resources: &HashSet<String>,
    rules: &Rules,
) -> String {
    let mut pairs: Vec<(&str, &str)> = req
        .query
        .iter()
        .filter(|(k, _)| k == SECURITY_TOKEN || sub_resources.contains(k.as_str()))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_unstable();

    let mut s = (rules.encode_resource)(resource);
    for (idx, (k, v)) in pairs.into_iter().enumerate() {
        s.push(if idx == 0 { '?' } else { '&' });
        s.push_str(k);
        if !v.is_empty() {
            s.push('=');
            s.push_str(v);
        }
    }
    s
}

/// Every query parameter, encoded, sorted by name then value.
fn canonicalize_query(req: &RequestDescriptor) -> String {
    let mut pairs: Vec<(String, String)> = req
        .query
        .iter()
        .map(|(k, v)| (query_encode(k), query_encode(v)))
        .collect();
    pairs.sort_unstable();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
