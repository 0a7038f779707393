use http::Method;
use ossign_aliyun_oss::{AdditionalHeaders, SignatureVersion};
use ossign_core::{ErrorKind, RequestDescriptor};
use pretty_assertions::assert_eq;

use super::{credential, signer, verifier, BUCKET, HOST};

fn put_request() -> RequestDescriptor {
    RequestDescriptor::new(Method::PUT, format!("/{BUCKET}/test.txt"))
        .with_host(HOST)
        .with_header("x-oss-head1", "value")
        .with_header("abc", "value")
        .with_header("ZAbc", "value")
        .with_header("XYZ", "value")
        .with_content_type("text/plain")
}

fn authorization(req: &RequestDescriptor) -> String {
    req.headers
        .get("authorization")
        .expect("authorization must be set")
        .to_string()
}

#[test]
fn test_v2_put_with_additional_headers() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V2);
    let additional = AdditionalHeaders::new(["ZAbc", "x-oss-head1", "abc"])?;

    let mut req = put_request();
    signer.authorize(&mut req, &credential(), &additional)?;

    let auth = authorization(&req);
    assert!(auth.starts_with("OSS2 AccessKeyId:LTAI5tExampleKeyId,AdditionalHeaders:abc;zabc,Signature:"));
    verifier().verify_header(&req, &credential(), SignatureVersion::V2)?;
    Ok(())
}

#[test]
fn test_v2_signature_is_deterministic() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V2);
    let additional = AdditionalHeaders::new(["abc"])?;

    let mut first = put_request();
    let mut second = put_request();
    signer.authorize(&mut first, &credential(), &additional)?;
    signer.authorize(&mut second, &credential(), &additional)?;

    assert_eq!(authorization(&first), authorization(&second));
    Ok(())
}

#[test]
fn test_v2_header_names_are_case_insensitive() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V2);

    let mut upper = RequestDescriptor::new(Method::GET, format!("/{BUCKET}/k"))
        .with_host(HOST)
        .with_header("ZAbc", "value");
    let mut lower = RequestDescriptor::new(Method::GET, format!("/{BUCKET}/k"))
        .with_host(HOST)
        .with_header("zabc", "value");
    signer.authorize(&mut upper, &credential(), &AdditionalHeaders::new(["ZAbc"])?)?;
    signer.authorize(&mut lower, &credential(), &AdditionalHeaders::new(["zabc"])?)?;

    assert_eq!(authorization(&upper), authorization(&lower));
    Ok(())
}

#[test]
fn test_v2_additional_headers_change_signature() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V2);

    let mut plain = put_request();
    let mut extended = put_request();
    signer.authorize(&mut plain, &credential(), &AdditionalHeaders::default())?;
    signer.authorize(&mut extended, &credential(), &AdditionalHeaders::new(["abc"])?)?;

    let plain = authorization(&plain);
    let extended = authorization(&extended);
    assert!(!plain.contains("AdditionalHeaders"));
    assert!(extended.contains(",AdditionalHeaders:abc,"));
    assert_ne!(
        plain.rsplit_once("Signature:").map(|v| v.1),
        extended.rsplit_once("Signature:").map(|v| v.1)
    );
    Ok(())
}

#[test]
fn test_v2_unsigned_header_can_change() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V2);

    let mut req = put_request();
    signer.authorize(&mut req, &credential(), &AdditionalHeaders::new(["abc"])?)?;

    // XYZ was never signed, abc was.
    req.headers.set("XYZ", "changed");
    verifier().verify_header(&req, &credential(), SignatureVersion::V2)?;

    req.headers.set("abc", "changed");
    let err = verifier()
        .verify_header(&req, &credential(), SignatureVersion::V2)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    Ok(())
}

#[test]
fn test_v1_authorization() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V1);

    let mut req = put_request();
    signer.authorize(&mut req, &credential(), &AdditionalHeaders::new(["abc"])?)?;

    let auth = authorization(&req);
    let signature = auth
        .strip_prefix("OSS LTAI5tExampleKeyId:")
        .expect("must be a v1 authorization");
    assert_eq!(signature.len(), 28);
    assert!(signature.ends_with('='));
    verifier().verify_header(&req, &credential(), SignatureVersion::V1)?;

    // V1 ignores additional headers, only x-oss-* are signed.
    req.headers.set("abc", "changed");
    verifier().verify_header(&req, &credential(), SignatureVersion::V1)?;
    req.headers.set("x-oss-head1", "changed");
    assert!(verifier()
        .verify_header(&req, &credential(), SignatureVersion::V1)
        .is_err());
    Ok(())
}

#[test]
fn test_security_token_is_signed() -> anyhow::Result<()> {
    let cred = credential().with_security_token("CAISsecuritytoken");

    for version in [SignatureVersion::V1, SignatureVersion::V2] {
        let mut req = put_request();
        signer(version).authorize(&mut req, &cred, &AdditionalHeaders::default())?;
        assert_eq!(req.headers.get("x-oss-security-token"), Some("CAISsecuritytoken"));
        verifier().verify_header(&req, &cred, version)?;

        req.headers.set("x-oss-security-token", "CAISother");
        assert!(verifier().verify_header(&req, &cred, version).is_err());
    }
    Ok(())
}

#[test]
fn test_wrong_secret_is_rejected() -> anyhow::Result<()> {
    let mut req = put_request();
    signer(SignatureVersion::V2).authorize(&mut req, &credential(), &AdditionalHeaders::default())?;

    let other = ossign_aliyun_oss::Credential::new("LTAI5tExampleKeyId", "AnotherSecret");
    let err = verifier()
        .verify_header(&req, &other, SignatureVersion::V2)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    Ok(())
}
