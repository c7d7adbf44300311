//! Compact signed tokens (JWT serialization)
//!
//! ```text
//! base64url(header_json) "." base64url(payload_json) "." base64url(signature)
//! ```
//!
//! The header is always `{"typ":"JWT","alg":<algorithm>}` and the signature
//! covers the first two segments joined by `.`. Only signing and signature
//! verification are provided; claims such as `exp` are not inspected.
//!
//! # Algorithms
//!
//! | Name    | Primitive                    | Key                |
//! |---------|------------------------------|--------------------|
//! | `HS256` | HMAC-SHA-256                 | shared secret      |
//! | `HS384` | HMAC-SHA-384                 | shared secret      |
//! | `HS512` | HMAC-SHA-512                 | shared secret      |
//! | `RS256` | RSASSA-PKCS1-v1_5 SHA-256    | RSA key pair (PEM) |
//! | `RS384` | RSASSA-PKCS1-v1_5 SHA-384    | RSA key pair (PEM) |
//! | `RS512` | RSASSA-PKCS1-v1_5 SHA-512    | RSA key pair (PEM) |

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Sha256, Sha384, Sha512};

use crate::{Error, Result};

/// Token type written into every header
pub const TOKEN_TYPE: &str = "JWT";

/// URL-safe alphabet, no padding on encode, padding optional on decode
const BASE64_URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Signing algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
}

impl Algorithm {
    /// Algorithm name as written in the header
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HS256 => "HS256",
            Algorithm::HS384 => "HS384",
            Algorithm::HS512 => "HS512",
            Algorithm::RS256 => "RS256",
            Algorithm::RS384 => "RS384",
            Algorithm::RS512 => "RS512",
        }
    }

    /// HMAC family (shared secret)
    pub fn is_hmac(&self) -> bool {
        matches!(self, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            "RS256" => Ok(Algorithm::RS256),
            "RS384" => Ok(Algorithm::RS384),
            "RS512" => Ok(Algorithm::RS512),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Token header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub typ: String,
    #[serde(default)]
    pub alg: String,
}

impl Header {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            alg: algorithm.to_string(),
        }
    }

    /// Read `typ` and `alg` from any JSON header. Absent, null or
    /// non-string members read as empty.
    pub fn from_value(header: &Value) -> Self {
        let member = |name: &str| header.get(name).and_then(Value::as_str).unwrap_or("").to_string();
        Self {
            typ: member("typ"),
            alg: member("alg"),
        }
    }
}

#[derive(Clone)]
enum SigningSecret {
    Hmac(Vec<u8>),
    Rsa(Box<RsaPrivateKey>),
}

/// Key used to produce signatures
#[derive(Clone)]
pub struct EncodingKey {
    inner: SigningSecret,
}

impl EncodingKey {
    /// Shared secret for the `HS*` algorithms
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            inner: SigningSecret::Hmac(secret.to_vec()),
        }
    }

    /// RSA private key in PKCS#8 (`BEGIN PRIVATE KEY`) or PKCS#1
    /// (`BEGIN RSA PRIVATE KEY`) PEM form, for the `RS*` algorithms
    pub fn from_rsa_pem(pem: &str) -> Result<Self> {
        Ok(Self {
            inner: SigningSecret::Rsa(Box::new(parse_rsa_private(pem)?)),
        })
    }
}

impl fmt::Debug for EncodingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            SigningSecret::Hmac(_) => f.write_str("EncodingKey::Secret(..)"),
            SigningSecret::Rsa(_) => f.write_str("EncodingKey::Rsa(..)"),
        }
    }
}

#[derive(Clone)]
enum VerificationKey {
    Hmac(Vec<u8>),
    Rsa(RsaPublicKey),
}

/// Key used to check signatures
#[derive(Clone)]
pub struct DecodingKey {
    inner: VerificationKey,
}

impl DecodingKey {
    /// Shared secret for the `HS*` algorithms
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            inner: VerificationKey::Hmac(secret.to_vec()),
        }
    }

    /// RSA public key in SPKI (`BEGIN PUBLIC KEY`) or PKCS#1
    /// (`BEGIN RSA PUBLIC KEY`) PEM form
    pub fn from_rsa_pem(pem: &str) -> Result<Self> {
        let key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| Error::InvalidKey(format!("RSA public key: {}", e)))?;
        Ok(Self {
            inner: VerificationKey::Rsa(key),
        })
    }

    /// RSA private key PEM; only the public half is kept
    pub fn from_rsa_private_pem(pem: &str) -> Result<Self> {
        let key = parse_rsa_private(pem)?;
        Ok(Self {
            inner: VerificationKey::Rsa(key.to_public_key()),
        })
    }
}

impl fmt::Debug for DecodingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner {
            VerificationKey::Hmac(_) => f.write_str("DecodingKey::Secret(..)"),
            VerificationKey::Rsa(_) => f.write_str("DecodingKey::Rsa(..)"),
        }
    }
}

fn parse_rsa_private(pem: &str) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|e| Error::InvalidKey(format!("RSA private key: {}", e)))
}

fn key_mismatch(algorithm: Algorithm) -> Error {
    if algorithm.is_hmac() {
        Error::InvalidKey(format!("{} requires a shared secret", algorithm))
    } else {
        Error::InvalidKey(format!("{} requires an RSA key", algorithm))
    }
}

fn hmac_for<M: Mac + KeyInit>(secret: &[u8], input: &[u8]) -> Result<M> {
    let mut mac =
        <M as Mac>::new_from_slice(secret).map_err(|e| Error::InvalidKey(e.to_string()))?;
    mac.update(input);
    Ok(mac)
}

fn hmac_sign(algorithm: Algorithm, secret: &[u8], input: &[u8]) -> Result<Vec<u8>> {
    let tag = match algorithm {
        Algorithm::HS256 => hmac_for::<Hmac<Sha256>>(secret, input)?.finalize().into_bytes().to_vec(),
        Algorithm::HS384 => hmac_for::<Hmac<Sha384>>(secret, input)?.finalize().into_bytes().to_vec(),
        Algorithm::HS512 => hmac_for::<Hmac<Sha512>>(secret, input)?.finalize().into_bytes().to_vec(),
        _ => return Err(key_mismatch(algorithm)),
    };
    Ok(tag)
}

fn hmac_verify(algorithm: Algorithm, secret: &[u8], input: &[u8], signature: &[u8]) -> Result<bool> {
    // verify_slice compares in constant time
    let matched = match algorithm {
        Algorithm::HS256 => hmac_for::<Hmac<Sha256>>(secret, input)?.verify_slice(signature),
        Algorithm::HS384 => hmac_for::<Hmac<Sha384>>(secret, input)?.verify_slice(signature),
        Algorithm::HS512 => hmac_for::<Hmac<Sha512>>(secret, input)?.verify_slice(signature),
        _ => return Err(key_mismatch(algorithm)),
    };
    Ok(matched.is_ok())
}

fn rsa_sign(algorithm: Algorithm, key: &RsaPrivateKey, input: &[u8]) -> Result<Vec<u8>> {
    let signature = match algorithm {
        Algorithm::RS256 => SigningKey::<Sha256>::new(key.clone()).try_sign(input),
        Algorithm::RS384 => SigningKey::<Sha384>::new(key.clone()).try_sign(input),
        Algorithm::RS512 => SigningKey::<Sha512>::new(key.clone()).try_sign(input),
        _ => return Err(key_mismatch(algorithm)),
    };
    signature
        .map(|s| s.to_vec())
        .map_err(|e| Error::InvalidKey(format!("unable to sign: {}", e)))
}

fn rsa_verify(algorithm: Algorithm, key: &RsaPublicKey, input: &[u8], signature: &[u8]) -> Result<bool> {
    if algorithm.is_hmac() {
        return Err(key_mismatch(algorithm));
    }
    let Ok(signature) = Signature::try_from(signature) else {
        return Ok(false);
    };
    let verified = match algorithm {
        Algorithm::RS256 => VerifyingKey::<Sha256>::new(key.clone()).verify(input, &signature),
        Algorithm::RS384 => VerifyingKey::<Sha384>::new(key.clone()).verify(input, &signature),
        Algorithm::RS512 => VerifyingKey::<Sha512>::new(key.clone()).verify(input, &signature),
        _ => return Err(key_mismatch(algorithm)),
    };
    Ok(verified.is_ok())
}

/// Sign `input` with the given key and algorithm, returning raw signature bytes
pub fn sign(input: &[u8], key: &EncodingKey, algorithm: Algorithm) -> Result<Vec<u8>> {
    match &key.inner {
        SigningSecret::Hmac(secret) => hmac_sign(algorithm, secret, input),
        SigningSecret::Rsa(private) => rsa_sign(algorithm, private, input),
    }
}

/// Check raw signature bytes against `input`
pub fn verify(signature: &[u8], input: &[u8], key: &DecodingKey, algorithm: Algorithm) -> Result<bool> {
    match &key.inner {
        VerificationKey::Hmac(secret) => hmac_verify(algorithm, secret, input, signature),
        VerificationKey::Rsa(public) => rsa_verify(algorithm, public, input, signature),
    }
}

/// URL-safe base64 without padding or line breaks
pub fn b64_encode(input: impl AsRef<[u8]>) -> String {
    BASE64_URL.encode(input)
}

/// URL-safe base64, padding optional
pub fn b64_decode(input: &str) -> Result<Vec<u8>> {
    BASE64_URL
        .decode(input)
        .map_err(|e| Error::MalformedToken(format!("invalid segment encoding: {}", e)))
}

/// Build a signed token for `payload`
pub fn encode<T: Serialize + ?Sized>(payload: &T, key: &EncodingKey, algorithm: Algorithm) -> Result<String> {
    let header = serde_json::to_vec(&Header::new(algorithm)).map_err(|e| Error::EncodeError(e.to_string()))?;
    let claims = serde_json::to_vec(payload).map_err(|e| Error::EncodeError(e.to_string()))?;

    let signing_input = format!("{}.{}", b64_encode(header), b64_encode(claims));
    let signature = sign(signing_input.as_bytes(), key, algorithm)?;

    Ok(format!("{}.{}", signing_input, b64_encode(signature)))
}

struct Parts<'a> {
    header: Value,
    payload: Value,
    signing_input: &'a str,
    signature: &'a str,
}

fn split(token: &str) -> Result<Parts<'_>> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(Error::MalformedToken(format!(
            "wrong number of segments: {}",
            segments.len()
        )));
    }

    let header: Value = serde_json::from_slice(&b64_decode(segments[0])?)
        .map_err(|e| Error::MalformedToken(format!("invalid header: {}", e)))?;
    let payload: Value = serde_json::from_slice(&b64_decode(segments[1])?)
        .map_err(|e| Error::MalformedToken(format!("invalid payload: {}", e)))?;

    let signing_input_len = segments[0].len() + 1 + segments[1].len();
    Ok(Parts {
        header,
        payload,
        signing_input: &token[..signing_input_len],
        signature: segments[2],
    })
}

fn into_claims<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| Error::DecodeError(e.to_string()))
}

/// Parse the header without checking the signature
pub fn decode_header(token: &str) -> Result<Header> {
    Ok(Header::from_value(&split(token)?.header))
}

/// Decode the payload without checking the signature
pub fn decode<T: DeserializeOwned>(token: &str) -> Result<T> {
    into_claims(split(token)?.payload)
}

/// Decode the payload after verifying the signature.
///
/// `algorithm` selects the verification algorithm; when `None` the header's
/// `alg` is used.
///
/// # Errors
///
/// - `MalformedToken` unless the token is three segments with JSON header and payload
/// - `MissingAlgorithm` if the header's `alg` is empty
/// - `UnsupportedAlgorithm` if the algorithm name is unknown
/// - `SignatureMismatch` if the signature does not verify
pub fn decode_verified<T: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
    algorithm: Option<Algorithm>,
) -> Result<T> {
    let parts = split(token)?;
    let header = Header::from_value(&parts.header);
    if header.alg.is_empty() {
        return Err(Error::MissingAlgorithm);
    }
    let algorithm = match algorithm {
        Some(algorithm) => algorithm,
        None => header.alg.parse()?,
    };

    let Ok(signature) = BASE64_URL.decode(parts.signature) else {
        return Err(Error::SignatureMismatch);
    };
    if !verify(&signature, parts.signing_input.as_bytes(), key, algorithm)? {
        return Err(Error::SignatureMismatch);
    }

    into_claims(parts.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KNOWN_HS256: &str =
        "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.InUxIg.9rzFCiDBrYe541Wy1031KX4A-zTibbpzTL4215XC-Fc";

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("HS256".parse::<Algorithm>().unwrap(), Algorithm::HS256);
        assert_eq!("RS512".parse::<Algorithm>().unwrap(), Algorithm::RS512);
        assert!(matches!(
            "none".parse::<Algorithm>(),
            Err(Error::UnsupportedAlgorithm(name)) if name == "none"
        ));
        assert!("hs256".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::default(), Algorithm::HS256);
    }

    #[test]
    fn test_known_answer_hs256() {
        let key = EncodingKey::from_secret(b"secret");
        let token = encode("u1", &key, Algorithm::HS256).unwrap();
        assert_eq!(token, KNOWN_HS256);
    }

    #[test]
    fn test_known_answer_hs512() {
        let key = EncodingKey::from_secret(b"k");
        let token = encode(&json!({"sub": "42"}), &key, Algorithm::HS512).unwrap();
        assert_eq!(
            token,
            "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzUxMiJ9.eyJzdWIiOiI0MiJ9.\
             KSDVgpZSpMWOOZcsLS-pBierqa6SiBSvYfKkMATPtVHD0HHai7mEctjwyc4keIql-KXNIs2EHg8EWuefV8D0Ww"
        );
    }

    #[test]
    fn test_header_shape() {
        let key = EncodingKey::from_secret(b"secret");
        let token = encode(&json!({"a": 1}), &key, Algorithm::HS384).unwrap();
        let first = token.split('.').next().unwrap();
        assert_eq!(b64_decode(first).unwrap(), br#"{"typ":"JWT","alg":"HS384"}"#.to_vec());

        let header = decode_header(&token).unwrap();
        assert_eq!(header, Header::new(Algorithm::HS384));
    }

    #[test]
    fn test_segments_have_no_padding() {
        let key = EncodingKey::from_secret(b"secret");
        for payload in [json!("a"), json!("ab"), json!("abc"), json!({"k": "+/?"})] {
            let token = encode(&payload, &key, Algorithm::HS256).unwrap();
            assert!(!token.contains('='));
            assert!(!token.contains('+'));
            assert!(!token.contains('/'));
            assert_eq!(token.split('.').count(), 3);
        }
    }

    #[test]
    fn test_hmac_roundtrip_all_algorithms() {
        let payload = json!({"user": "u1", "rooms": ["#a", "#b"], "n": 7});
        for algorithm in [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512] {
            let token = encode(&payload, &EncodingKey::from_secret(b"shared"), algorithm).unwrap();
            let decoded: Value =
                decode_verified(&token, &DecodingKey::from_secret(b"shared"), Some(algorithm)).unwrap();
            assert_eq!(decoded, payload);

            // Header algorithm used when none is given
            let decoded: Value = decode_verified(&token, &DecodingKey::from_secret(b"shared"), None).unwrap();
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn test_every_signature_character_matters() {
        let key = DecodingKey::from_secret(b"secret");
        let sig_start = KNOWN_HS256.rfind('.').unwrap() + 1;

        for i in sig_start..KNOWN_HS256.len() {
            let mut altered = KNOWN_HS256.as_bytes().to_vec();
            altered[i] = if altered[i] == b'A' { b'B' } else { b'A' };
            let altered = String::from_utf8(altered).unwrap();

            let result: Result<Value> = decode_verified(&altered, &key, Some(Algorithm::HS256));
            assert!(
                matches!(result, Err(Error::SignatureMismatch)),
                "position {} accepted",
                i
            );
        }
    }

    #[test]
    fn test_wrong_secret() {
        let result: Result<Value> =
            decode_verified(KNOWN_HS256, &DecodingKey::from_secret(b"other"), Some(Algorithm::HS256));
        assert!(matches!(result, Err(Error::SignatureMismatch)));
    }

    #[test]
    fn test_wrong_algorithm_mismatches() {
        let result: Result<Value> =
            decode_verified(KNOWN_HS256, &DecodingKey::from_secret(b"secret"), Some(Algorithm::HS512));
        assert!(matches!(result, Err(Error::SignatureMismatch)));
    }

    #[test]
    fn test_decode_without_key_skips_signature() {
        let mut token = KNOWN_HS256.to_string();
        token.push_str("garbage");
        let user: String = decode(&token).unwrap();
        assert_eq!(user, "u1");
    }

    #[test]
    fn test_wrong_segment_count() {
        for token in ["a.b", "a", "a.b.c.d", ""] {
            let result: Result<Value> = decode(token);
            assert!(matches!(result, Err(Error::MalformedToken(_))), "{:?}", token);
        }
    }

    #[test]
    fn test_non_json_segments() {
        let result: Result<Value> = decode("a.b.c");
        assert!(matches!(result, Err(Error::MalformedToken(_))));

        let not_json = b64_encode("not json");
        let token = format!("{}.{}.sig", b64_encode(r#"{"typ":"JWT","alg":"HS256"}"#), not_json);
        let result: Result<Value> = decode(&token);
        assert!(matches!(result, Err(Error::MalformedToken(_))));
    }

    #[test]
    fn test_empty_algorithm() {
        let token = format!(
            "{}.{}.{}",
            b64_encode(r#"{"typ":"JWT","alg":""}"#),
            b64_encode(r#""u1""#),
            b64_encode("sig")
        );
        let result: Result<Value> =
            decode_verified(&token, &DecodingKey::from_secret(b"secret"), Some(Algorithm::HS256));
        assert!(matches!(result, Err(Error::MissingAlgorithm)));

        // Without a key the header is not checked
        let user: String = decode(&token).unwrap();
        assert_eq!(user, "u1");
    }

    fn signed_with_header(header: &str, payload: &str) -> String {
        let signing_input = format!("{}.{}", b64_encode(header), b64_encode(payload));
        let key = EncodingKey::from_secret(b"secret");
        let signature = sign(signing_input.as_bytes(), &key, Algorithm::HS256).unwrap();
        format!("{}.{}", signing_input, b64_encode(signature))
    }

    #[test]
    fn test_header_without_usable_algorithm() {
        let key = DecodingKey::from_secret(b"secret");
        let headers = [
            r#"{"typ":"JWT","alg":null}"#,
            r#"{"typ":"JWT"}"#,
            r#"{"typ":"JWT","alg":5}"#,
            r#"{}"#,
            r#""x""#,
            "[1,2]",
            "null",
        ];

        for header in headers {
            let token = signed_with_header(header, r#""u1""#);

            for algorithm in [Some(Algorithm::HS256), None] {
                let result: Result<Value> = decode_verified(&token, &key, algorithm);
                assert!(matches!(result, Err(Error::MissingAlgorithm)), "{} {:?}", header, result);
            }

            // Unverified decoding only needs both segments to be JSON
            let user: String = decode(&token).unwrap();
            assert_eq!(user, "u1", "{}", header);
            assert_eq!(decode_header(&token).unwrap().alg, "", "{}", header);
        }
    }

    #[test]
    fn test_header_with_extra_members() {
        let token = signed_with_header(r#"{"alg":"HS256","kid":"k1","typ":7}"#, r#"{"sub":"u1"}"#);

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, "HS256");
        assert_eq!(header.typ, "");

        let claims: Value = decode_verified(&token, &DecodingKey::from_secret(b"secret"), None).unwrap();
        assert_eq!(claims, json!({"sub": "u1"}));
    }

    #[test]
    fn test_unknown_header_algorithm() {
        let token = format!(
            "{}.{}.{}",
            b64_encode(r#"{"typ":"JWT","alg":"ES256"}"#),
            b64_encode("1"),
            b64_encode("sig")
        );
        let result: Result<Value> = decode_verified(&token, &DecodingKey::from_secret(b"k"), None);
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm(name)) if name == "ES256"));
    }

    #[test]
    fn test_padded_segments_accepted() {
        let key = EncodingKey::from_secret(b"secret");
        let token = encode("abcd", &key, Algorithm::HS256).unwrap();
        let segments: Vec<&str> = token.split('.').collect();
        let pad = |s: &str| format!("{}{}", s, "=".repeat((4 - s.len() % 4) % 4));
        let padded = format!("{}.{}.{}", pad(segments[0]), pad(segments[1]), segments[2]);

        let decoded: String = decode(&padded).unwrap();
        assert_eq!(decoded, "abcd");
    }

    #[test]
    fn test_secret_with_rsa_algorithm_rejected() {
        let key = EncodingKey::from_secret(b"secret");
        assert!(matches!(
            encode("u1", &key, Algorithm::RS256),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_typed_claims() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Claims {
            sub: String,
            ns: String,
        }

        let claims = Claims {
            sub: "u1".to_string(),
            ns: "app".to_string(),
        };
        let token = encode(&claims, &EncodingKey::from_secret(b"s"), Algorithm::HS256).unwrap();
        let decoded: Claims = decode_verified(&token, &DecodingKey::from_secret(b"s"), None).unwrap();
        assert_eq!(decoded, claims);

        let mismatch: Result<Vec<u8>> = decode(&token);
        assert!(matches!(mismatch, Err(Error::DecodeError(_))));
    }

    #[test]
    fn test_key_debug_hides_material() {
        let key = EncodingKey::from_secret(b"topsecret");
        assert!(!format!("{:?}", key).contains("topsecret"));
        let key = DecodingKey::from_secret(b"topsecret");
        assert_eq!(format!("{:?}", key), "DecodingKey::Secret(..)");
    }
}
