use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde_json::Value;

use super::claims::Claims;
use super::errors::JwtError;

/// Signs and verifies time-bounded bearer tokens (HS256).
///
/// The secret is captured once at construction; the handler is immutable
/// afterwards and safe to share across request tasks.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign an arbitrary claim set.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Issue a token for `subject`, valid for `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        self.issue_at(subject, Utc::now(), ttl)
    }

    /// Issue a token for `subject` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.encode(&Claims::for_subject(subject, issued_at, ttl))
    }

    /// Verify a token and return its claims.
    ///
    /// Checks run in a fixed order: signature, then expiry, then the `sub`
    /// claim. Claim content is never inspected before the signature holds.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature mismatch or unexpected algorithm
    /// * `Expired` - `exp` is in the past
    /// * `MalformedClaims` - `exp` or `sub` missing or ill-formed
    /// * `MalformedToken` - Not a compact JWS at all
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let (subject, claims) = self.verified(token)?;

        Ok(Claims {
            sub: Some(subject),
            iat: claims.iat,
            exp: claims.exp,
        })
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, JwtError> {
        self.verified(token).map(|(subject, _)| subject)
    }

    fn verified(&self, token: &str) -> Result<(String, WireClaims), JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        let mut claims = decode::<WireClaims>(token, &self.decoding_key, &validation)
            .map_err(classify)?
            .claims;

        match claims.sub.take() {
            Some(Value::String(subject)) if !subject.trim().is_empty() => Ok((subject, claims)),
            Some(_) => Err(JwtError::MalformedClaims(
                "subject claim is not a non-blank string".to_string(),
            )),
            None => Err(JwtError::MalformedClaims(
                "missing subject claim".to_string(),
            )),
        }
    }
}

/// Claim set as read off the wire. `sub` stays untyped so a signed token with
/// a non-string subject is reported as malformed claims rather than an
/// undecodable token.
#[derive(Debug, Deserialize)]
struct WireClaims {
    #[serde(default)]
    sub: Option<Value>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

fn classify(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        ErrorKind::MissingRequiredClaim(claim) => {
            JwtError::MalformedClaims(format!("missing required claim: {}", claim))
        }
        _ => JwtError::MalformedToken(error.to_string()),
    }
}
