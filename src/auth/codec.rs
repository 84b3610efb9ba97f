// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token codec: claims to signed compact string and back.
//!
//! The codec is pure transcoding over a symmetric HS256 key. It verifies
//! structure and signature on decode (the MAC comparison inside
//! `jsonwebtoken` is constant-time) but deliberately does NOT check expiry;
//! temporal policy belongs to [`crate::auth::service::TokenService`].

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::Claims;
use super::error::AuthError;

/// Encodes and decodes signed tokens against a single shared secret.
///
/// Holds only immutable key material, so it is safe to share across request
/// tasks without locking.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by TokenService, not here. Claim presence is
        // enforced by deserialization into Claims.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }

    /// Serialize and sign a claims set.
    ///
    /// Fails only on malformed claims: an empty subject or an expiry that is
    /// not strictly after the issue time.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        if claims.sub.is_empty() {
            return Err(AuthError::Encoding("subject must not be empty".to_string()));
        }
        if claims.exp <= claims.iat {
            return Err(AuthError::Encoding(
                "expiry must be after issued-at".to_string(),
            ));
        }

        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Verify the signature and parse the claims.
    ///
    /// Returns `InvalidSignature` on MAC mismatch and `MalformedToken` on
    /// structural parse failure.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;

    const SECRET: &[u8] = b"codec-test-secret";

    fn sample_claims() -> Claims {
        Claims {
            sub: "jdoe".to_string(),
            authorities: vec![Role::Admin, Role::SalesManager],
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let codec = TokenCodec::new(SECRET);
        let claims = sample_claims();
        let token = codec.encode(&claims).unwrap();
        assert_eq!(codec.decode(&token).unwrap(), claims);
    }

    #[test]
    fn encode_rejects_empty_subject() {
        let codec = TokenCodec::new(SECRET);
        let mut claims = sample_claims();
        claims.sub = String::new();
        assert!(matches!(
            codec.encode(&claims),
            Err(AuthError::Encoding(_))
        ));
    }

    #[test]
    fn encode_rejects_expiry_before_issuance() {
        let codec = TokenCodec::new(SECRET);
        let mut claims = sample_claims();
        claims.exp = claims.iat;
        assert!(matches!(
            codec.encode(&claims),
            Err(AuthError::Encoding(_))
        ));
    }

    #[test]
    fn decode_does_not_check_expiry() {
        let codec = TokenCodec::new(SECRET);
        let mut claims = sample_claims();
        claims.iat = 1_000;
        claims.exp = 2_000; // long past
        let token = codec.encode(&claims).unwrap();
        assert!(codec.decode(&token).is_ok());
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let codec = TokenCodec::new(SECRET);
        let token = codec.encode(&sample_claims()).unwrap();

        // Flip one character in the payload segment.
        let parts: Vec<&str> = token.split('.').collect();
        let mut payload: Vec<u8> = parts[1].bytes().collect();
        payload[4] = if payload[4] == b'A' { b'B' } else { b'A' };
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            String::from_utf8(payload).unwrap(),
            parts[2]
        );

        assert!(matches!(
            codec.decode(&tampered),
            Err(AuthError::InvalidSignature) | Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn wrong_secret_fails_signature_check() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"a-different-secret");
        let token = codec.encode(&sample_claims()).unwrap();
        assert_eq!(other.decode(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = TokenCodec::new(SECRET);
        assert_eq!(
            codec.decode("not-a-token"),
            Err(AuthError::MalformedToken)
        );
        assert_eq!(
            codec.decode("still.not.a.token"),
            Err(AuthError::MalformedToken)
        );
    }
}
