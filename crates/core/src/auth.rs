// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identity provider: credential hashing and access tokens.
//!
//! [`Identity`] is the seam the service layer depends on; [`JwtIdentity`] is
//! the production implementation (Argon2id hashes, HS256 JWTs). Token TTL and
//! signing secret come from [`Config`], never from ambient state.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

/// Credential and token operations consumed by the service layer.
pub trait Identity {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;

    /// Issue an access token for the given user.
    fn issue_token(&self, user_id: i64) -> Result<String>;

    /// Resolve a token back to its user id.
    ///
    /// Fails with an authentication error on malformed, tampered, or expired
    /// tokens.
    fn resolve_token(&self, token: &str) -> Result<i64>;
}

/// Claims carried in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    /// Subject: the user id.
    sub: String,
    /// Expiration time (unix seconds).
    exp: i64,
    /// Issued at (unix seconds).
    iat: i64,
}

/// Argon2id password hashing plus HS256 JWT issuance.
pub struct JwtIdentity {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtIdentity {
    /// Build an identity provider from service configuration.
    pub fn new(config: &Config) -> Self {
        JwtIdentity {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            token_ttl: Duration::minutes(config.token_ttl_minutes),
        }
    }
}

impl Identity for JwtIdentity {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| Error::Hash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| Error::Hash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn issue_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| Error::InvalidToken)
    }

    fn resolve_token(&self, token: &str) -> Result<i64> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| Error::InvalidToken)?;
        data.claims.sub.parse().map_err(|_| Error::InvalidToken)
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
