//! AWS Signature Version 4 for S3-compatible PUT uploads.
//!
//! The store accepts the signature only if every component matches
//! byte-for-byte: the canonical request's newline placement, the header
//! ordering, and the real payload digest (never a placeholder). Everything
//! here is a pure function of (credentials, request parts, timestamp), so
//! signatures are deterministic and testable with a pinned clock.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Signature algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// R2 uses a literal `auto` region.
const REGION: &str = "auto";

/// Service literal for S3-compatible stores.
const SERVICE: &str = "s3";

/// The fixed, ordered list of headers covered by the signature.
pub const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Static credentials for one storage account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// The computed header values for one signed PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPut {
    /// `x-amz-date` header value (compact ISO-8601, UTC).
    pub amz_date: String,
    /// `x-amz-content-sha256` header value.
    pub payload_hash: String,
    /// Full `Authorization` header value.
    pub authorization: String,
}

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

fn hmac_sha256(key: &[u8], message: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Derive the signing key: HMAC chained over date, region, service, and
/// the terminal `aws4_request` literal, seeded with `"AWS4" + secret`.
fn signing_key(secret_access_key: &str, date_stamp: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date_stamp);
    let k_region = hmac_sha256(&k_date, REGION);
    let k_service = hmac_sha256(&k_region, SERVICE);
    hmac_sha256(&k_service, "aws4_request")
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Build the canonical request string for a PUT of `key` to `host`.
///
/// The canonical headers block carries its own trailing newline, so a
/// blank line separates it from the signed-header list — that blank line
/// is part of the format, not an accident.
fn canonical_request(host: &str, key: &str, payload_hash: &str, amz_date: &str) -> String {
    let canonical_headers = format!(
        "host:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n"
    );
    format!("PUT\n/{key}\n\n{canonical_headers}\n{SIGNED_HEADERS}\n{payload_hash}")
}

/// Sign a PUT of `payload` to `https://{host}/{key}` at `timestamp`.
pub fn sign_put(
    credentials: &Credentials,
    host: &str,
    key: &str,
    payload: &[u8],
    timestamp: DateTime<Utc>,
) -> SignedPut {
    let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = timestamp.format("%Y%m%d").to_string();
    let credential_scope = format!("{date_stamp}/{REGION}/{SERVICE}/aws4_request");

    let payload_hash = sha256_hex(payload);
    let canonical = canonical_request(host, key, &payload_hash, &amz_date);

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
        sha256_hex(canonical.as_bytes())
    );

    let key_material = signing_key(&credentials.secret_access_key, &date_stamp);
    let signature = hex::encode(hmac_sha256(&key_material, &string_to_sign));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{credential_scope}, \
         SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        credentials.access_key_id
    );

    SignedPut {
        amz_date,
        payload_hash,
        authorization,
    }
}
