mod header;
mod range;
mod switch;

use chrono::TimeZone;
use http::request::Parts;
use http::{Method, Request};
use ossign_aliyun_oss::{Config, Credential, RequestSigner, SignatureVersion, Verifier};
use ossign_core::time::DateTime;

pub const ENDPOINT: &str = "https://oss-cn-hangzhou.aliyuncs.com";
pub const BUCKET: &str = "examplebucket";
pub const HOST: &str = "examplebucket.oss-cn-hangzhou.aliyuncs.com";

/// Initialize test logging.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn signing_time() -> DateTime {
    chrono::Utc
        .with_ymd_and_hms(2023, 6, 1, 8, 0, 0)
        .single()
        .expect("time must be valid")
}

pub fn config() -> Config {
    Config::default().with_endpoint(ENDPOINT)
}

pub fn signer(version: SignatureVersion) -> RequestSigner {
    init();
    RequestSigner::new(config().with_signature_version(version)).with_time(signing_time())
}

pub fn verifier() -> Verifier {
    Verifier::new(config()).with_time(signing_time())
}

pub fn credential() -> Credential {
    Credential::new("LTAI5tExampleKeyId", "ExampleAccessKeySecretValue")
}

/// Turn a presigned url into the request parts a server would receive.
pub fn presigned_parts(method: Method, url: &str, headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().method(method).uri(url);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    builder.body(()).expect("request must be valid").into_parts().0
}

/// Decoded query pairs of a url, in order.
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
