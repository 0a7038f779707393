use std::fmt::Write;

use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE, HOST};
use log::debug;
use percent_encoding::utf8_percent_encode;

use ossign_core::time::{format_http_date, now, DateTime};
use ossign_core::{Error, RequestDescriptor, Result, SigningCredential};

use crate::canonical::{canonicalize, AdditionalHeaders, SigningMethod};
use crate::constants::*;
use crate::presign::PresignRequest;
use crate::signature::sign;
use crate::version::VersionSwitch;
use crate::{Config, Credential, SignatureVersion};

/// RequestSigner for Aliyun OSS signature.
///
/// Holds the signature version switch; one signer may be shared by many
/// threads, each call reads the version exactly once.
#[derive(Debug)]
pub struct RequestSigner {
    config: Config,
    version: VersionSwitch,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer, starting at the configured signature version.
    pub fn new(config: Config) -> Self {
        let version = VersionSwitch::new(config.signature_version.unwrap_or_default());
        Self {
            config,
            version,
            time: None,
        }
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

    fn get_time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// The config this signer was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Version used by the next signing call.
    pub fn version(&self) -> SignatureVersion {
        self.version.get()
    }

    /// Switch the version used by subsequent signing calls.
    pub fn set_version(&self, version: SignatureVersion) {
        debug!("switch oss signature version to {version}");
        self.version.set(version);
    }

    /// Sign `req` by adding `Date`, the security token and `Authorization` headers.
    ///
    /// `Host` is added from [`RequestDescriptor::host`] under V2 when absent.
    /// Calling this twice on the same request yields the same headers.
    pub fn authorize(
        &self,
        req: &mut RequestDescriptor,
        cred: &Credential,
        additional: &AdditionalHeaders,
    ) -> Result<()> {
        let version = self.version.get();
        if !cred.is_valid() {
            return Err(Error::signing_failed(
                "credential must have both access key id and secret",
            ));
        }
        if req.method.is_none() || req.resource.is_none() {
            return Err(Error::request_malformed(
                "http method and resource path are required",
            ));
        }

        // Headers land on `req` only once signing succeeds.
        let mut signed = req.clone();
        if !signed.headers.contains(DATE.as_str()) {
            signed.headers.append("Date", format_http_date(self.get_time()));
        }
        if version == SignatureVersion::V2 && !signed.headers.contains(HOST.as_str()) {
            if let Some(host) = signed.host.clone() {
                signed.headers.append("Host", host);
            }
        }
        if let Some(token) = &cred.security_token {
            match signed.headers.get(X_OSS_SECURITY_TOKEN) {
                Some(v) if v != token.as_str() => {
                    return Err(Error::request_malformed(
                        "request carries a security token of another credential",
                    ))
                }
                Some(_) => {}
                None => signed.headers.append(X_OSS_SECURITY_TOKEN, token.clone()),
            }
        }
        if let Some(v) = signed.content_type.clone() {
            if !signed.headers.contains(CONTENT_TYPE.as_str()) {
                signed.headers.append("Content-Type", v);
            }
        }
        if let Some(v) = signed.content_md5.clone() {
            if !signed.headers.contains(CONTENT_MD5) {
                signed.headers.append("Content-MD5", v);
            }
        }

        let canonical = canonicalize(
            &signed,
            version,
            SigningMethod::Header,
            additional,
            &self.config.sub_resources,
        )?;
        let signature = sign(&canonical.string_to_sign, cred, version)?;

        let mut auth = String::new();
        match version {
            SignatureVersion::V1 => {
                write!(auth, "{AUTHORIZATION_PREFIX_V1}{}:{signature}", cred.access_key_id)?;
            }
            SignatureVersion::V2 => {
                write!(
                    auth,
                    "{AUTHORIZATION_PREFIX_V2}{AUTHORIZATION_ACCESS_KEY_ID}:{},",
                    cred.access_key_id
                )?;
                if !canonical.additional_headers.is_empty() {
                    write!(
                        auth,
                        "{AUTHORIZATION_ADDITIONAL_HEADERS}:{},",
                        canonical.additional_headers_value()
                    )?;
                }
                write!(auth, "{AUTHORIZATION_SIGNATURE}:{signature}")?;
            }
        }
        signed.headers.set(AUTHORIZATION.as_str(), auth);
        req.headers = signed.headers;

        Ok(())
    }

    /// Sign http request parts in place.
    ///
    /// `bucket` is the bucket addressed by the request's host, if any.
    pub fn sign_parts(
        &self,
        parts: &mut http::request::Parts,
        bucket: Option<&str>,
        cred: &Credential,
        additional: &AdditionalHeaders,
    ) -> Result<()> {
        let mut req = RequestDescriptor::from_parts(parts, bucket)?;
        self.authorize(&mut req, cred, additional)?;
        req.apply(parts)
    }

    /// Build a presigned URL for `req`.
    ///
    /// Returns [`ErrorKind::PresignExpired`](ossign_core::ErrorKind::PresignExpired)
    /// if the expiration is not after the signing time.
    pub fn presign(&self, req: &PresignRequest, cred: &Credential) -> Result<String> {
        let version = self.version.get();
        if !cred.is_valid() {
            return Err(Error::signing_failed(
                "credential must have both access key id and secret",
            ));
        }
        if req.bucket.is_empty() || req.key.is_empty() {
            return Err(Error::request_malformed("bucket and key are required"));
        }

        let signing_time = self.get_time();
        let expires = req.expiration.resolve(signing_time)?;
        if expires <= signing_time {
            return Err(Error::presign_expired(format!(
                "expiration {expires} is not after signing time {signing_time}"
            )));
        }

        let (scheme, endpoint) = self.config.endpoint_parts()?;
        let host = format!("{}.{endpoint}", req.bucket);

        let mut desc = RequestDescriptor {
            method: Some(req.method.clone()),
            resource: Some(RequestDescriptor::resource_path(
                Some(&req.bucket),
                Some(&req.key),
            )),
            host: Some(host.clone()),
            headers: req.headers.clone(),
            query: req.query.clone(),
            content_type: req.content_type.clone(),
            content_md5: req.content_md5.clone(),
        };
        if version == SignatureVersion::V2 && !desc.headers.contains(HOST.as_str()) {
            desc.headers.append("Host", host.clone());
        }
        if let Some(token) = &cred.security_token {
            let name = match version {
                SignatureVersion::V1 => SECURITY_TOKEN,
                SignatureVersion::V2 => X_OSS_SECURITY_TOKEN,
            };
            desc.query.insert(0, (name.to_string(), token.clone()));
        }

        let additional = AdditionalHeaders::new(&req.additional_header_names)?;
        let canonical = canonicalize(
            &desc,
            version,
            SigningMethod::Query(expires),
            &additional,
            &self.config.sub_resources,
        )?;
        let signature = sign(&canonical.string_to_sign, cred, version)?;

        let expires = expires.timestamp().to_string();
        let additional_headers = canonical.additional_headers_value();
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(desc.query.len() + 5);
        match version {
            SignatureVersion::V1 => {
                query.push((EXPIRES, expires.as_str()));
                query.push((OSS_ACCESS_KEY_ID, cred.access_key_id.as_str()));
                query.push((SIGNATURE, signature.as_str()));
                query.extend(desc.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
            SignatureVersion::V2 => {
                query.push((X_OSS_SIGNATURE_VERSION, version.as_str()));
                query.push((X_OSS_EXPIRES, expires.as_str()));
                query.push((X_OSS_ACCESS_KEY_ID, cred.access_key_id.as_str()));
                if !additional_headers.is_empty() {
                    query.push((X_OSS_ADDITIONAL_HEADERS, additional_headers.as_str()));
                }
                query.extend(desc.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                query.push((X_OSS_SIGNATURE, signature.as_str()));
            }
        }

        let mut url = format!(
            "{scheme}://{host}/{}",
            utf8_percent_encode(req.key.trim_start_matches('/'), &OSS_URI_ENCODE_SET)
        );
        for (idx, (k, v)) in query.iter().enumerate() {
            url.push(if idx == 0 { '?' } else { '&' });
            url.push_str(&utf8_percent_encode(k, &OSS_QUERY_ENCODE_SET).to_string());
            if !v.is_empty() {
                url.push('=');
                url.push_str(&utf8_percent_encode(v, &OSS_QUERY_ENCODE_SET).to_string());
            }
        }

        debug!("presigned {} {url}", req.method);
        Ok(url)
    }
}
