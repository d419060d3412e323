use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Endpoints reachable without a bearer token. Matched by prefix.
pub const PUBLIC_ENDPOINTS: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/request-otp",
    "/auth/verify-otp",
    "/health",
    "/actuator/health",
];

pub fn is_public_endpoint(path: &str) -> bool {
    PUBLIC_ENDPOINTS.iter().any(|p| path.starts_with(p))
}

/// Claims issued by auth-service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Verifies HS256 tokens signed with the shared platform secret.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }
}
