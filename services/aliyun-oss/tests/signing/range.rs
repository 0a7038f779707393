use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_RANGE, RANGE};
use http::{Method, Request, StatusCode};
use ossign_aliyun_oss::{AdditionalHeaders, PresignRequest, SignatureVersion};
use pretty_assertions::assert_eq;
use test_case::test_case;

use super::store::StubObjectStore;
use super::{credential, signer, verifier, BUCKET, HOST};

const OBJECT_SIZE: usize = 128 * 1024;

fn object() -> Bytes {
    (0..OBJECT_SIZE).map(|i| (i % 251) as u8).collect::<Vec<_>>().into()
}

fn store() -> StubObjectStore {
    let store = StubObjectStore::new(BUCKET, credential(), verifier());
    store.put_object("range.bin", object());
    store
}

#[test_case(SignatureVersion::V1; "v1")]
#[test_case(SignatureVersion::V2; "v2")]
fn test_range_get_with_presigned_url(version: SignatureVersion) -> anyhow::Result<()> {
    let store = store();
    let url = signer(version).presign(
        &PresignRequest::new(BUCKET, "range.bin").with_expires_in(Duration::from_secs(600)),
        &credential(),
    )?;

    let req = Request::builder()
        .method(Method::GET)
        .uri(&url)
        .header(RANGE, "bytes=65536-131071")
        .body(Bytes::new())?;
    let resp = store.handle(req);

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 65536-131071/131072");
    assert_eq!(resp.body().len(), 65536);
    assert_eq!(resp.body(), &object().slice(65536..));
    Ok(())
}

#[test_case(SignatureVersion::V1; "v1")]
#[test_case(SignatureVersion::V2; "v2")]
fn test_range_get_with_signed_header(version: SignatureVersion) -> anyhow::Result<()> {
    let store = store();

    let (mut parts, body) = Request::builder()
        .method(Method::GET)
        .uri(format!("https://{HOST}/range.bin"))
        .header(RANGE, "bytes=0-1023")
        .body(Bytes::new())?
        .into_parts();
    signer(version).sign_parts(&mut parts, Some(BUCKET), &credential(), &AdditionalHeaders::default())?;

    let resp = store.handle(Request::from_parts(parts, body));
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.body(), &object().slice(..1024));
    Ok(())
}

#[test]
fn test_range_get_with_tampered_url() -> anyhow::Result<()> {
    let store = store();
    let url = signer(SignatureVersion::V2).presign(
        &PresignRequest::new(BUCKET, "range.bin").with_expires_in(Duration::from_secs(600)),
        &credential(),
    )?;

    let req = Request::builder()
        .method(Method::GET)
        .uri(url.replace("range.bin", "other.bin"))
        .header(RANGE, "bytes=65536-131071")
        .body(Bytes::new())?;
    assert_eq!(store.handle(req).status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[test]
fn test_put_then_get_with_presigned_urls() -> anyhow::Result<()> {
    let store = store();
    let signer = signer(SignatureVersion::V2);
    let content = Bytes::from_static(b"hello, oss");

    let put = signer.presign(
        &PresignRequest::new(BUCKET, "hello.txt")
            .with_method(Method::PUT)
            .with_content_type("text/plain")
            .with_expires_in(Duration::from_secs(600)),
        &credential(),
    )?;
    let req = Request::builder()
        .method(Method::PUT)
        .uri(&put)
        .header("Content-Type", "text/plain")
        .body(content.clone())?;
    assert_eq!(store.handle(req).status(), StatusCode::OK);

    let get = signer.presign(&PresignRequest::new(BUCKET, "hello.txt"), &credential())?;
    let resp = store.handle(Request::get(&get).body(Bytes::new())?);
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body(), &content);
    Ok(())
}

#[test]
fn test_range_header_signed_as_additional_header() -> anyhow::Result<()> {
    let store = store();
    let url = signer(SignatureVersion::V2).presign(
        &PresignRequest::new(BUCKET, "range.bin")
            .with_expires_in(Duration::from_secs(600))
            .add_header("Range", "bytes=65536-131071")
            .add_additional_header_name("Range"),
        &credential(),
    )?;
    assert!(url.contains("x-oss-additional-headers=range"));

    let get = |range: &str| -> anyhow::Result<_> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(&url)
            .header(RANGE, range)
            .body(Bytes::new())?;
        Ok(store.handle(req))
    };

    let resp = get("bytes=65536-131071")?;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.body().len(), 65536);

    // The signed range can't be widened.
    assert_eq!(get("bytes=0-131071")?.status(), StatusCode::FORBIDDEN);
    Ok(())
}
