use ossign_core::hash::{base64_hmac_sha1, hex_hmac_sha256};
use ossign_core::{Error, Result};

use crate::constants::V2_SIGNING_KEY_PREFIX;
use crate::{Credential, SignatureVersion};

/// Compute the signature of `string_to_sign` under `version`.
///
/// - V1: base64 of HMAC-SHA1 keyed by the secret.
/// - V2: lower-case hex of HMAC-SHA256 keyed by `aliyun_v2` + secret.
pub fn sign(string_to_sign: &str, cred: &Credential, version: SignatureVersion) -> Result<String> {
    if cred.access_key_secret.is_empty() {
        return Err(Error::signing_failed("access key secret is empty"));
    }

    let signature = match version {
        SignatureVersion::V1 => base64_hmac_sha1(
            cred.access_key_secret.as_bytes(),
            string_to_sign.as_bytes(),
        ),
        SignatureVersion::V2 => {
            let key = format!("{V2_SIGNING_KEY_PREFIX}{}", cred.access_key_secret);
            hex_hmac_sha256(key.as_bytes(), string_to_sign.as_bytes())
        }
    };
    Ok(signature)
}
