// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random tokens and HMAC signatures for cookies and OAuth state.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Bytes of entropy in session tokens and OAuth nonces.
pub const TOKEN_BYTES: usize = 32;

/// Generate `len` random bytes, URL-safe base64 encoded without padding.
pub fn random_token(len: usize) -> Result<String, AppError> {
    let mut bytes = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Generate a random hex identifier for user records.
pub fn random_id() -> Result<String, AppError> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}

/// Hex-encoded HMAC-SHA256 of `payload`.
pub fn sign(payload: &str, key: &[u8]) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a hex signature produced by [`sign`] in constant time.
pub fn verify(payload: &str, signature_hex: &str, key: &[u8]) -> bool {
    let Ok(expected) = sign(payload, key) else {
        return false;
    };
    expected.as_bytes().ct_eq(signature_hex.as_bytes()).into()
}

/// Cookie value carrying a signed session token: `token.signature`.
pub fn sign_cookie_value(token: &str, key: &[u8]) -> Result<String, AppError> {
    Ok(format!("{}.{}", token, sign(token, key)?))
}

/// Extract the token from a signed cookie value, or `None` if tampered.
pub fn verify_cookie_value<'a>(value: &'a str, key: &[u8]) -> Option<&'a str> {
    // Tokens are base64url, which never contains '.'
    let (token, signature) = value.rsplit_once('.')?;
    if token.is_empty() || !verify(token, signature, key) {
        return None;
    }
    Some(token)
}
