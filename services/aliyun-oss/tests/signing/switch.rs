use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use http::Method;
use ossign_aliyun_oss::{AdditionalHeaders, PresignRequest, SignatureVersion};
use ossign_core::{ErrorKind, RequestDescriptor};
use pretty_assertions::assert_eq;

use super::{credential, query_pairs, signer, verifier, BUCKET, HOST};

#[test]
fn test_switch_v2_to_v1() -> anyhow::Result<()> {
    let signer = signer(SignatureVersion::V2);
    let req = PresignRequest::new(BUCKET, "test.txt").with_expires_in(Duration::from_secs(600));

    let url = signer.presign(&req, &credential())?;
    assert!(query_pairs(&url).iter().any(|(k, _)| k == "x-oss-signature"));

    signer.set_version(SignatureVersion::V1);
    assert_eq!(signer.version(), SignatureVersion::V1);

    let url = signer.presign(&req, &credential())?;
    let query = query_pairs(&url);
    assert!(query.iter().any(|(k, _)| k == "Signature"));
    assert!(query.iter().all(|(k, _)| !k.starts_with("x-oss-")));
    Ok(())
}

#[test]
fn test_cross_version_verification_fails() -> anyhow::Result<()> {
    for (signed, verified) in [
        (SignatureVersion::V1, SignatureVersion::V2),
        (SignatureVersion::V2, SignatureVersion::V1),
    ] {
        let mut req = RequestDescriptor::new(Method::GET, format!("/{BUCKET}/k")).with_host(HOST);
        signer(signed).authorize(&mut req, &credential(), &AdditionalHeaders::default())?;

        let err = verifier()
            .verify_header(&req, &credential(), verified)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureMismatch);

        let url = signer(signed).presign(&PresignRequest::new(BUCKET, "k"), &credential())?;
        let parts = super::presigned_parts(Method::GET, &url, &[]);
        let err = verifier()
            .verify_presigned(&parts, BUCKET, &credential(), verified)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    }
    Ok(())
}

#[test]
fn test_concurrent_switch_never_mixes_versions() {
    let signer = signer(SignatureVersion::V2);
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..200 {
                signer.set_version(if i % 2 == 0 {
                    SignatureVersion::V1
                } else {
                    SignatureVersion::V2
                });
                thread::yield_now();
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..4 {
            s.spawn(|| {
                let verifier = verifier();
                let mut signed = 0;
                while !done.load(Ordering::Acquire) || signed < 50 {
                    let mut req = RequestDescriptor::new(Method::GET, format!("/{BUCKET}/k"))
                        .with_host(HOST)
                        .with_header("x-oss-meta-a", "1");
                    signer
                        .authorize(&mut req, &credential(), &AdditionalHeaders::default())
                        .expect("sign must succeed");

                    let version = match req.headers.get("authorization") {
                        Some(v) if v.starts_with("OSS2 ") => SignatureVersion::V2,
                        _ => SignatureVersion::V1,
                    };
                    verifier
                        .verify_header(&req, &credential(), version)
                        .expect("signature must verify under the version it claims");
                    signed += 1;
                }
            });
        }
    });
}

#[test]
fn test_signers_of_different_versions_side_by_side() {
    let v1 = signer(SignatureVersion::V1);
    let v2 = signer(SignatureVersion::V2);

    thread::scope(|s| {
        for (signer, version) in [(&v1, SignatureVersion::V1), (&v2, SignatureVersion::V2)] {
            for _ in 0..2 {
                s.spawn(move || {
                    let verifier = verifier();
                    for i in 0..100 {
                        let mut req = RequestDescriptor::new(Method::PUT, format!("/{BUCKET}/k{i}"))
                            .with_host(HOST)
                            .with_header("x-oss-meta-a", i.to_string());
                        signer
                            .authorize(&mut req, &credential(), &AdditionalHeaders::default())
                            .expect("sign must succeed");
                        verifier
                            .verify_header(&req, &credential(), version)
                            .expect("signature must verify under its signer's version");

                        let url = signer
                            .presign(&PresignRequest::new(BUCKET, &format!("k{i}")), &credential())
                            .expect("presign must succeed");
                        let parts = super::presigned_parts(Method::GET, &url, &[]);
                        verifier
                            .verify_presigned(&parts, BUCKET, &credential(), version)
                            .expect("presigned url must verify under its signer's version");
                    }
                });
            }
        }
    });

    assert_eq!(v1.version(), SignatureVersion::V1);
    assert_eq!(v2.version(), SignatureVersion::V2);
}
