// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Env values used to configure the signer.
pub const OSS_ENDPOINT: &str = "OSS_ENDPOINT";
pub const OSS_SIGNATURE_VERSION: &str = "OSS_SIGNATURE_VERSION";

// Headers used in oss services.
pub const CONTENT_MD5: &str = "content-md5";
pub const X_OSS_PREFIX: &str = "x-oss-";
pub const X_OSS_SECURITY_TOKEN: &str = "x-oss-security-token";

// Authorization header values.
pub const AUTHORIZATION_PREFIX_V1: &str = "OSS ";
pub const AUTHORIZATION_PREFIX_V2: &str = "OSS2 ";
pub const AUTHORIZATION_ACCESS_KEY_ID: &str = "AccessKeyId";
pub const AUTHORIZATION_ADDITIONAL_HEADERS: &str = "AdditionalHeaders";
pub const AUTHORIZATION_SIGNATURE: &str = "Signature";

// Query parameters of presigned urls in V1.
pub const EXPIRES: &str = "Expires";
pub const OSS_ACCESS_KEY_ID: &str = "OSSAccessKeyId";
pub const SIGNATURE: &str = "Signature";
pub const SECURITY_TOKEN: &str = "security-token";

// Query parameters of presigned urls in V2.
pub const X_OSS_SIGNATURE: &str = "x-oss-signature";
pub const X_OSS_SIGNATURE_VERSION: &str = "x-oss-signature-version";
/// Absolute expiry instant in epoch seconds, not a duration.
pub const X_OSS_EXPIRES: &str = "x-oss-expires";
pub const X_OSS_ACCESS_KEY_ID: &str = "x-oss-access-key-id";
pub const X_OSS_ADDITIONAL_HEADERS: &str = "x-oss-additional-headers";

/// Salt prepended to the secret to derive the V2 signing key.
pub const V2_SIGNING_KEY_PREFIX: &str = "aliyun_v2";

/// Query parameters carrying presign material, never part of a canonical query.
pub const RESERVED_QUERY_PARAMS: [&str; 8] = [
    EXPIRES,
    OSS_ACCESS_KEY_ID,
    SIGNATURE,
    X_OSS_SIGNATURE,
    X_OSS_SIGNATURE_VERSION,
    X_OSS_EXPIRES,
    X_OSS_ACCESS_KEY_ID,
    X_OSS_ADDITIONAL_HEADERS,
];

/// AsciiSet for RFC 3986 encoding of the V2 canonical uri.
///
/// - Encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', '~' and '/'.
pub static OSS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for RFC 3986 encoding of query names and values.
pub static OSS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Sub-resources known to take part in the V1 canonicalized resource.
///
/// The service owns this list; it's only used to seed `Config::sub_resources`.
/// It may lag behind the service, so callers that rely on newer sub-resources
/// should pass their own list through `Config::with_sub_resources`.
///
/// This list is copied from <https://github.com/aliyun/aliyun-oss-go-sdk/blob/master/oss/conn.go>
pub const DEFAULT_SUB_RESOURCES: &[&str] = &[
    "acl",
    "uploads",
    "location",
    "cors",
    "logging",
    "website",
    "referer",
    "lifecycle",
    "delete",
    "append",
    "tagging",
    "objectMeta",
    "uploadId",
    "partNumber",
    "security-token",
    "position",
    "img",
    "style",
    "styleName",
    "replication",
    "replicationProgress",
    "replicationLocation",
    "cname",
    "bucketInfo",
    "comp",
    "qos",
    "live",
    "status",
    "vod",
    "startTime",
    "endTime",
    "symlink",
    "x-oss-process",
    "response-content-type",
    "x-oss-traffic-limit",
    "response-content-language",
    "response-expires",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "udf",
    "udfName",
    "udfImage",
    "udfId",
    "udfImageDesc",
    "udfApplication",
    "udfApplicationLog",
    "restore",
    "callback",
    "callback-var",
    "qosInfo",
    "policy",
    "stat",
    "encryption",
    "versions",
    "versioning",
    "versionId",
    "requestPayment",
    "x-oss-request-payer",
    "sequential",
    "inventory",
    "inventoryId",
    "continuation-token",
    "asyncFetch",
    "worm",
    "wormId",
    "wormExtend",
    "withHashContext",
    "x-oss-enable-md5",
    "x-oss-enable-sha1",
    "x-oss-enable-sha256",
    "x-oss-hash-ctx",
    "x-oss-md5-ctx",
    "transferAcceleration",
    "regionList",
    "cloudboxes",
    "x-oss-ac-source-ip",
    "x-oss-ac-subnet-mask",
    "x-oss-ac-vpc-id",
    "x-oss-ac-forward-allow",
    "metaQuery",
];
