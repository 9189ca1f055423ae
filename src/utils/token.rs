use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::usermodel::UserRole;

/// Claims carried by both ID tokens and session cookies. The two are told
/// apart by `iss`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IdentityClaims {
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// When the user last signed in with a password; carried unchanged from
    /// the ID token into the session cookie.
    pub auth_time: i64,
}

pub fn create_token(
    claims: &IdentityClaims,
    secret: &[u8],
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token(
    token: &str,
    secret: &[u8],
    issuer: &str,
    audience: &str,
) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_audience(&[audience]);

    let decoded = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &validation,
    )?;

    Ok(decoded.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(iss: &str, exp_offset: i64) -> IdentityClaims {
        let now = Utc::now().timestamp();
        IdentityClaims {
            sub: "4b0e6f4e-3b55-4a8e-9d43-3d3f0f4b3c11".to_string(),
            name: "Siti".to_string(),
            role: Some(UserRole::Penyedia),
            iss: iss.to_string(),
            aud: "kelarapp".to_string(),
            iat: now,
            exp: now + exp_offset,
            auth_time: now,
        }
    }

    #[test]
    fn decodes_matching_issuer() {
        let token = create_token(&claims("kelarapp-session/kelarapp", 3600), b"secret").unwrap();
        let decoded = decode_token(&token, b"secret", "kelarapp-session/kelarapp", "kelarapp").unwrap();
        assert_eq!(decoded.role, Some(UserRole::Penyedia));
        assert_eq!(decoded.name, "Siti");
    }

    #[test]
    fn rejects_other_issuer_secret_and_expiry() {
        let token = create_token(&claims("kelarapp-id/kelarapp", 3600), b"secret").unwrap();
        assert!(decode_token(&token, b"secret", "kelarapp-session/kelarapp", "kelarapp").is_err());
        assert!(decode_token(&token, b"other", "kelarapp-id/kelarapp", "kelarapp").is_err());

        let expired = create_token(&claims("kelarapp-id/kelarapp", -3600), b"secret").unwrap();
        assert!(decode_token(&expired, b"secret", "kelarapp-id/kelarapp", "kelarapp").is_err());
    }
}
