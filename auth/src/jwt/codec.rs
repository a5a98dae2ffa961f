use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Signed session token codec.
///
/// Produces and checks compact JWS tokens (`header.claims.signature`, each
/// part base64url) signed with HS256. One symmetric key is used for both
/// directions; it is supplied at construction and never changes afterwards.
///
/// An optional key id is written to the `kid` header on issue and required
/// on decode, which keeps tokens minted for one principal namespace from
/// being accepted by a codec serving another.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    key_id: Option<String>,
}

impl TokenCodec {
    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Load it from configuration, never from code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            key_id: None,
        }
    }

    /// Bind the codec to a key id.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Issue a token for `subject`, valid from `now` until `now + ttl`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed or `now + ttl` is out of range
    pub fn issue(
        &self,
        subject: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        if now.checked_add_signed(ttl).is_none() {
            return Err(TokenError::EncodingFailed(
                "token lifetime out of range".to_string(),
            ));
        }

        let mut header = Header::new(self.algorithm);
        header.kid = self.key_id.clone();

        let claims = Claims::new(subject, now, ttl);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its subject.
    ///
    /// # Errors
    /// * `Malformed` - Token structure, encoding, algorithm or key id is invalid
    /// * `BadSignature` - Signature does not match
    /// * `Expired` - `now` is past the `exp` claim
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.decode_claims(token, now).map(|claims| claims.sub)
    }

    /// Verify a token and return its full claim set.
    ///
    /// The signature is checked before the validity window, so a forged
    /// token never reports `Expired`.
    pub fn decode_claims(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the caller's clock below.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if let Some(expected) = &self.key_id {
            if token_data.header.kid.as_deref() != Some(expected.as_str()) {
                return Err(TokenError::Malformed(format!(
                    "unexpected key id {:?}",
                    token_data.header.kid
                )));
            }
        }

        if token_data.claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}
