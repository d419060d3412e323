use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs HS256 access tokens with the platform secret shared with the gateway.
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_ms: i64) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::milliseconds(ttl_ms),
        }
    }

    pub fn issue(&self, user_id: i64, email: &str, role: &str) -> Result<IssuedToken> {
        self.issue_at(user_id, email, role, Utc::now())
    }

    fn issue_at(&self, user_id: i64, email: &str, role: &str, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .context("Failed to sign JWT")?;
        Ok(IssuedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn test_issued_token_round_trips_claims() {
        let issuer = TokenIssuer::new("secret", 86_400_000);
        let issued = issuer.issue(7, "a@b.com", "EMPLOYER").unwrap();

        let data = decode::<Claims>(
            &issued.token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "7");
        assert_eq!(data.claims.email, "a@b.com");
        assert_eq!(data.claims.role, "EMPLOYER");
        assert_eq!(data.claims.exp - data.claims.iat, 86_400);
    }

    #[test]
    fn test_expiry_follows_ttl() {
        let issuer = TokenIssuer::new("secret", 60_000);
        let now = Utc::now();
        let issued = issuer.issue_at(1, "a@b.com", "JOB_SEEKER", now).unwrap();
        assert_eq!(issued.expires_at, now + Duration::seconds(60));
    }
}
