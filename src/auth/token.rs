use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Claims the portal reads out of an access token.
///
/// The hosted service signs and verifies these; the client decodes without
/// verification purely to learn expiry and identity for display. Nothing
/// here is trusted for access decisions.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

pub fn decode_claims(token: &str) -> Option<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    // Expired tokens must still decode; expiry is exactly what we came for.
    validation.validate_exp = false;
    validation.validate_aud = false;

    decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    decode_claims(token).and_then(|claims| Utc.timestamp_opt(claims.exp, 0).single())
}
