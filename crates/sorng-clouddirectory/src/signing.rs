//! AWS Signature Version 4 implementation.
//!
//! Implements the SigV4 signing algorithm as documented at:
//! <https://docs.aws.amazon.com/general/latest/gr/sigv4_signing.html>
//!
//! The output is a wire-compatibility contract: the service recomputes the
//! same signature from what it receives, so every byte of the canonical
//! request matters. The algorithm consists of four steps:
//!
//! 1. Create a canonical request
//! 2. Create the string to sign
//! 3. Calculate the signing key
//! 4. Build the Authorization header
//!
//! The signer keeps no state between calls. The timestamp is read once per
//! call and shared by the date header and the credential scope.

use crate::error::{DirectoryError, DirectoryResult};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// The hashing algorithm used by SigV4.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Terminator of every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";

/// Header carrying the request timestamp.
pub const DATE_HEADER: &str = "x-amz-date";

/// Header carrying the signature.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Hash of an empty payload.
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Access key pair bound to one region and service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_key_id: String,
    pub secret_key: String,
    pub region: String,
    pub service: String,
}

impl Credential {
    pub fn new(access_key_id: &str, secret_key: &str, region: &str, service: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
            service: service.to_string(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("service", &self.service)
            .finish()
    }
}

/// Time-dependent values of a single signing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// `yyyyMMddTHHmmssZ`, the value of `x-amz-date`.
    pub timestamp: String,
    /// `yyyyMMdd`.
    pub date_stamp: String,
    /// `date/region/service/aws4_request`.
    pub credential_scope: String,
}

impl SigningContext {
    pub fn new(at: DateTime<Utc>, credential: &Credential) -> Self {
        let timestamp = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = at.format("%Y%m%d").to_string();
        let credential_scope = format!(
            "{}/{}/{}/{}",
            date_stamp, credential.region, credential.service, SCOPE_TERMINATOR
        );
        Self {
            timestamp,
            date_stamp,
            credential_scope,
        }
    }
}

/// Headers produced by the signer, to be sent next to the signed ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// Value for `x-amz-date`.
    pub amz_date: String,
    /// Value for `Authorization`.
    pub authorization: String,
}

impl SignatureHeaders {
    /// Header name/value pairs ready to be attached to a request.
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            (DATE_HEADER, self.amz_date.as_str()),
            (AUTHORIZATION_HEADER, self.authorization.as_str()),
        ]
    }
}

/// AWS SigV4 signer.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credential: Credential,
}

impl SigV4Signer {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Sign a request at the current wall-clock second.
    ///
    /// `headers` must contain `host` and every other header that will be sent
    /// on the wire; the signer adds `x-amz-date` itself.
    pub fn sign(
        &self,
        method: &str,
        uri: &str,
        query: &BTreeMap<String, String>,
        headers: &BTreeMap<String, String>,
        body: &str,
    ) -> DirectoryResult<SignatureHeaders> {
        self.sign_at(method, uri, query, headers, body, Utc::now())
    }

    /// Sign a request at a fixed instant.
    pub fn sign_at(
        &self,
        method: &str,
        uri: &str,
        query: &BTreeMap<String, String>,
        headers: &BTreeMap<String, String>,
        body: &str,
        at: DateTime<Utc>,
    ) -> DirectoryResult<SignatureHeaders> {
        let context = SigningContext::new(at, &self.credential);

        let mut signed_headers: BTreeMap<String, String> = headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case(DATE_HEADER))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        signed_headers.insert(DATE_HEADER.to_string(), context.timestamp.clone());

        let canonical = canonical_headers(&signed_headers)?;
        if !canonical.iter().any(|(name, _)| name == "host") {
            return Err(DirectoryError::signing("the host header must be signed"));
        }
        let header_names = signed_header_names(&canonical);

        // Step 1: Create canonical request
        let canonical_request = canonical_request(
            method,
            &canonical_uri(uri)?,
            &canonical_query_string(query)?,
            &render_canonical_headers(&canonical),
            &header_names,
            &sha256_hex(body),
        );
        log::debug!("Canonical request:\n{}", canonical_request);

        // Step 2: Create string to sign
        let string_to_sign = string_to_sign(&context, &canonical_request);
        log::debug!("String to sign:\n{}", string_to_sign);

        // Step 3: Calculate signing key
        let signing_key = derive_signing_key(&self.credential, &context.date_stamp)?;

        // Step 4: Calculate signature
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        let authorization = format!(
            "{} Credential={}/{},SignedHeaders={},Signature={}",
            ALGORITHM,
            self.credential.access_key_id,
            context.credential_scope,
            header_names,
            signature
        );

        Ok(SignatureHeaders {
            amz_date: context.timestamp,
            authorization,
        })
    }
}

/// Step 1: Create the canonical request.
///
/// CanonicalRequest =
///   HTTPRequestMethod + '\n' +
///   CanonicalURI + '\n' +
///   CanonicalQueryString + '\n' +
///   CanonicalHeaders + '\n' +
///   SignedHeaders + '\n' +
///   HexEncode(Hash(RequestPayload))
///
/// `canonical_headers` already ends with a newline, so the headers block is
/// followed by an empty line.
pub fn canonical_request(
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, canonical_uri, canonical_query, canonical_headers, signed_headers, payload_hash
    )
}

/// Step 2: Create the string to sign.
///
/// StringToSign =
///   Algorithm + '\n' +
///   RequestDateTime + '\n' +
///   CredentialScope + '\n' +
///   HexEncode(Hash(CanonicalRequest))
pub fn string_to_sign(context: &SigningContext, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        context.timestamp,
        context.credential_scope,
        sha256_hex(canonical_request)
    )
}

/// Step 3: Derive the signing key.
///
/// kSecret  = "AWS4" + SecretAccessKey
/// kDate    = HMAC-SHA256(kSecret, Date)
/// kRegion  = HMAC-SHA256(kDate, Region)
/// kService = HMAC-SHA256(kRegion, Service)
/// kSigning = HMAC-SHA256(kService, "aws4_request")
pub fn derive_signing_key(credential: &Credential, date_stamp: &str) -> DirectoryResult<Vec<u8>> {
    let k_secret = format!("AWS4{}", credential.secret_key);
    let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, credential.region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, credential.service.as_bytes())?;
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

/// Normalize headers for signing: names lower-cased, values trimmed, sorted
/// by name. Names that collide once lower-cased are rejected.
pub fn canonical_headers(
    headers: &BTreeMap<String, String>,
) -> DirectoryResult<Vec<(String, String)>> {
    let mut normalized: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(DirectoryError::signing(format!(
                "invalid header name '{}'",
                name.escape_default()
            )));
        }
        if value.chars().any(|c| c.is_control() && c != '\t') {
            return Err(DirectoryError::signing(format!(
                "header '{}' has a value with control characters",
                name
            )));
        }
        let lowered = name.to_ascii_lowercase();
        if normalized
            .insert(lowered, value.trim().to_string())
            .is_some()
        {
            return Err(DirectoryError::signing(format!(
                "header '{}' is given more than once",
                name
            )));
        }
    }
    Ok(normalized.into_iter().collect())
}

/// Render normalized headers as `name:value\n` lines.
pub fn render_canonical_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v))
        .collect::<String>()
}

/// Build the SignedHeaders string (semicolon-delimited, same order).
pub fn signed_header_names(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<&str>>()
        .join(";")
}

/// Build the canonical query string: sorted by key, RFC 3986 encoded.
pub fn canonical_query_string(params: &BTreeMap<String, String>) -> DirectoryResult<String> {
    if params.keys().any(|k| k.is_empty()) {
        return Err(DirectoryError::signing("query parameter with an empty name"));
    }
    Ok(params
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
        .collect::<Vec<String>>()
        .join("&"))
}

/// The resource path as signed. An empty path signs as `/`.
pub fn canonical_uri(uri: &str) -> DirectoryResult<String> {
    if uri.trim().is_empty() {
        return Ok("/".to_string());
    }
    if !uri.starts_with('/') {
        return Err(DirectoryError::signing(format!(
            "resource path '{}' must start with '/'",
            uri
        )));
    }
    if uri.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DirectoryError::signing(format!(
            "resource path '{}' has characters that must be encoded first",
            uri.escape_default()
        )));
    }
    Ok(uri.to_string())
}

// ── Helper functions ────────────────────────────────────────────────────

/// Compute SHA-256 hash and return hex-encoded string.
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute HMAC-SHA256.
fn hmac_sha256(key: &[u8], data: &[u8]) -> DirectoryResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| DirectoryError::signing(format!("invalid HMAC key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// RFC 7230 `tchar`.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// URI-encode a string per RFC 3986: everything except unreserved characters
/// (`A-Z a-z 0-9 - _ . ~`) is percent-encoded, space becomes `%20`.
pub fn uri_encode(input: &str) -> String {
    use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
    const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'_')
        .remove(b'.')
        .remove(b'~');

    utf8_percent_encode(input, UNRESERVED).to_string()
}
