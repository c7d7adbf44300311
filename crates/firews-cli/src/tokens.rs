//! Token commands for the FireWS CLI

use anyhow::{bail, Context, Result};
use firews_client::FireWs;
use firews_core::token::{self, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::Value;
use std::path::Path;

/// Generate an auth token for `user`.
///
/// HMAC algorithms sign with the namespace secret; RSA algorithms need a
/// PEM private key file.
pub fn generate(user: &str, algorithm: Algorithm, secret: Option<&str>, key_file: Option<&Path>) -> Result<String> {
    if algorithm == Algorithm::HS256 && key_file.is_none() {
        return FireWs::generate_auth_string(Some(user), secret).context("Cannot generate token");
    }

    let key = if algorithm.is_hmac() {
        match secret {
            Some(secret) => EncodingKey::from_secret(secret.as_bytes()),
            None => bail!("{} needs --secret", algorithm),
        }
    } else {
        let pem = read_pem(key_file, algorithm)?;
        EncodingKey::from_rsa_pem(&pem)?
    };

    Ok(token::encode(user, &key, algorithm)?)
}

/// Decode a token, verifying the signature when a secret or key file is given
pub fn inspect(
    token: &str,
    algorithm: Option<Algorithm>,
    secret: Option<&str>,
    key_file: Option<&Path>,
) -> Result<(Header, Value, bool)> {
    let header = token::decode_header(token).context("Invalid token header")?;

    let key = match (key_file, secret) {
        (Some(path), _) => {
            let pem = read_pem(Some(path), algorithm.unwrap_or(Algorithm::RS256))?;
            Some(DecodingKey::from_rsa_pem(&pem).or_else(|_| DecodingKey::from_rsa_private_pem(&pem))?)
        }
        (None, Some(secret)) => Some(DecodingKey::from_secret(secret.as_bytes())),
        (None, None) => None,
    };

    match key {
        Some(key) => {
            let payload = token::decode_verified(token, &key, algorithm)?;
            Ok((header, payload, true))
        }
        None => Ok((header, token::decode(token)?, false)),
    }
}

fn read_pem(path: Option<&Path>, algorithm: Algorithm) -> Result<String> {
    let Some(path) = path else {
        bail!("{} needs --key-file", algorithm);
    };
    std::fs::read_to_string(path).with_context(|| format!("Failed to read key file {}", path.display()))
}
