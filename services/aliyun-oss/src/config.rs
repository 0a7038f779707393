use std::collections::HashSet;

use http::uri::Scheme;
use http::Uri;
use once_cell::sync::Lazy;
use ossign_core::{Context, Error, Result};

use super::constants::*;
use crate::SignatureVersion;

/// Config carries all the configuration for the OSS signer.
#[derive(Clone, Debug)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `OSS_ENDPOINT`
    ///
    /// Like `https://oss-cn-hangzhou.aliyuncs.com`. Scheme defaults to `https`
    /// when absent. Only required for presigning.
    pub endpoint: Option<String>,
    /// `signature_version` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `OSS_SIGNATURE_VERSION`
    /// - default to [`SignatureVersion::V2`]
    pub signature_version: Option<SignatureVersion>,
    /// Query parameters that take part in the V1 canonicalized resource.
    ///
    /// The list is owned by the service; default to a published snapshot,
    /// replace it when the service adds sub-resources.
    pub sub_resources: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            signature_version: None,
            sub_resources: DEFAULT_SUB_RESOURCE_SET.clone(),
        }
    }
}

static DEFAULT_SUB_RESOURCE_SET: Lazy<HashSet<String>> =
    Lazy::new(|| DEFAULT_SUB_RESOURCES.iter().map(|v| v.to_string()).collect());

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if let Some(v) = ctx.env_var(OSS_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if self.signature_version.is_none() {
            if let Some(v) = ctx.env_var(OSS_SIGNATURE_VERSION) {
                self.signature_version = Some(v.parse()?);
            }
        }

        Ok(self)
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Set the signature version.
    pub fn with_signature_version(mut self, version: SignatureVersion) -> Self {
        self.signature_version = Some(version);
        self
    }

    /// Replace the V1 sub-resource list.
    pub fn with_sub_resources<I, S>(mut self, sub_resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_resources = sub_resources.into_iter().map(Into::into).collect();
        self
    }

    /// Split the endpoint into scheme and host (with port, if any).
    pub fn endpoint_parts(&self) -> Result<(Scheme, String)> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("endpoint is required for presigning"))?;

        let uri = if endpoint.contains("://") {
            endpoint.parse::<Uri>()
        } else {
            format!("https://{endpoint}").parse::<Uri>()
        }
        .map_err(|e| {
            Error::config_invalid(format!("endpoint {endpoint} is invalid")).with_source(e)
        })?;

        let scheme = uri.scheme().cloned().unwrap_or(Scheme::HTTPS);
        let authority = uri
            .authority()
            .ok_or_else(|| Error::config_invalid(format!("endpoint {endpoint} has no host")))?;

        Ok((scheme, authority.as_str().to_string()))
    }
}
