use http::header::{AUTHORIZATION, DATE, HOST};
use log::debug;
use subtle::ConstantTimeEq;

use ossign_core::time::{from_timestamp, now, parse_http_date, DateTime};
use ossign_core::{Error, RequestDescriptor, Result};

use crate::canonical::{canonicalize, AdditionalHeaders, SigningMethod};
use crate::constants::*;
use crate::signature::sign;
use crate::{Config, Credential, SignatureVersion};

/// Header-signed requests dated further than this from now are rejected.
const MAX_CLOCK_SKEW: chrono::TimeDelta = chrono::TimeDelta::minutes(15);

/// Verifier checks signatures produced by [`RequestSigner`](crate::RequestSigner).
///
/// It recomputes the string to sign from what arrived on the wire, so it
/// shares canonicalization with the signer and nothing else.
#[derive(Debug, Clone)]
pub struct Verifier {
    config: Config,
    time: Option<DateTime>,
}

impl Verifier {
    /// Create a new verifier.
    pub fn new(config: Config) -> Self {
        Self { config, time: None }
    }

    /// Specify the verification time.
    ///
    /// # Note
    ///
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Verify a request signed in the `Authorization` header.
    pub fn verify_header(
        &self,
        req: &RequestDescriptor,
        cred: &Credential,
        version: SignatureVersion,
    ) -> Result<()> {
        let auth = req
            .headers
            .get(AUTHORIZATION.as_str())
            .ok_or_else(|| Error::signature_mismatch("authorization header is missing"))?;
        let (access_key_id, additional, signature) = parse_authorization(auth, version)?;
        if access_key_id != cred.access_key_id {
            return Err(Error::signature_mismatch(format!(
                "access key id {access_key_id} is unknown"
            )));
        }

        if let Some(date) = req.headers.get(DATE.as_str()) {
            let skew = (self.time.unwrap_or_else(now) - parse_http_date(date)?).abs();
            if skew > MAX_CLOCK_SKEW {
                return Err(Error::signature_mismatch(format!(
                    "request date {date} is too skewed"
                )));
            }
        }

        let additional = AdditionalHeaders::new(additional.split(';').filter(|v| !v.is_empty()))?;
        let canonical = canonicalize(
            req,
            version,
            SigningMethod::Header,
            &additional,
            &self.config.sub_resources,
        )?;
        check(&sign(&canonical.string_to_sign, cred, version)?, signature)
    }

    /// Verify a request made with a presigned URL.
    ///
    /// `bucket` is the bucket the request's host addresses.
    pub fn verify_presigned(
        &self,
        parts: &http::request::Parts,
        bucket: &str,
        cred: &Credential,
        version: SignatureVersion,
    ) -> Result<()> {
        let mut req = RequestDescriptor::from_parts(parts, Some(bucket))?;
        if !req.headers.contains(HOST.as_str()) {
            if let Some(host) = req.host.clone() {
                req.headers.append("Host", host);
            }
        }

        let auth = take_auth_params(&mut req.query);
        let (expires, access_key_id, additional, signature) = match version {
            SignatureVersion::V1 => (
                auth.require(EXPIRES)?,
                auth.require(OSS_ACCESS_KEY_ID)?,
                "",
                auth.require(SIGNATURE)?,
            ),
            SignatureVersion::V2 => {
                let tag = auth.require(X_OSS_SIGNATURE_VERSION)?;
                if tag != version.as_str() {
                    return Err(Error::signature_mismatch(format!(
                        "signature version {tag} is not {version}"
                    )));
                }
                (
                    auth.require(X_OSS_EXPIRES)?,
                    auth.require(X_OSS_ACCESS_KEY_ID)?,
                    auth.get(X_OSS_ADDITIONAL_HEADERS).unwrap_or(""),
                    auth.require(X_OSS_SIGNATURE)?,
                )
            }
        };

        let expires = expires
            .parse::<i64>()
            .map_err(|e| Error::signature_mismatch(format!("expires {expires} is invalid")).with_source(e))
            .and_then(from_timestamp)?;
        let now = self.time.unwrap_or_else(now);
        if expires <= now {
            return Err(Error::presign_expired(format!(
                "presigned url expired at {expires}"
            )));
        }
        if access_key_id != cred.access_key_id {
            return Err(Error::signature_mismatch(format!(
                "access key id {access_key_id} is unknown"
            )));
        }

        let additional = AdditionalHeaders::new(additional.split(';').filter(|v| !v.is_empty()))?;
        let canonical = canonicalize(
            &req,
            version,
            SigningMethod::Query(expires),
            &additional,
            &self.config.sub_resources,
        )?;
        check(&sign(&canonical.string_to_sign, cred, version)?, signature)
    }
}

/// Presign parameters taken out of a query.
struct AuthParams(Vec<(String, String)>);

impl AuthParams {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| Error::signature_mismatch(format!("query parameter {name} is missing")))
    }
}

fn take_auth_params(query: &mut Vec<(String, String)>) -> AuthParams {
    let (auth, rest) = std::mem::take(query)
        .into_iter()
        .partition(|(k, _)| RESERVED_QUERY_PARAMS.contains(&k.as_str()));
    *query = rest;
    AuthParams(auth)
}

/// Split an `Authorization` value into access key id, additional headers and signature.
fn parse_authorization(auth: &str, version: SignatureVersion) -> Result<(&str, &str, &str)> {
    match version {
        SignatureVersion::V1 => {
            let (id, signature) = auth
                .strip_prefix(AUTHORIZATION_PREFIX_V1)
                .and_then(|v| v.split_once(':'))
                .ok_or_else(|| Error::signature_mismatch("authorization is not an OSS signature"))?;
            Ok((id, "", signature))
        }
        SignatureVersion::V2 => {
            let fields = auth
                .strip_prefix(AUTHORIZATION_PREFIX_V2)
                .ok_or_else(|| Error::signature_mismatch("authorization is not an OSS2 signature"))?;

            let (mut id, mut additional, mut signature) = (None, "", None);
            for field in fields.split(',') {
                match field.trim().split_once(':') {
                    Some((AUTHORIZATION_ACCESS_KEY_ID, v)) => id = Some(v),
                    Some((AUTHORIZATION_ADDITIONAL_HEADERS, v)) => additional = v,
                    Some((AUTHORIZATION_SIGNATURE, v)) => signature = Some(v),
                    _ => {
                        return Err(Error::signature_mismatch(format!(
                            "authorization field {field:?} is unknown"
                        )))
                    }
                }
            }
            match (id, signature) {
                (Some(id), Some(signature)) => Ok((id, additional, signature)),
                _ => Err(Error::signature_mismatch(
                    "authorization lacks access key id or signature",
                )),
            }
        }
    }
}

fn check(expected: &str, actual: &str) -> Result<()> {
    if bool::from(expected.as_bytes().ct_eq(actual.as_bytes())) {
        Ok(())
    } else {
        debug!("signature mismatch: expected {expected}, got {actual}");
        Err(Error::signature_mismatch("signature does not match"))
    }
}
