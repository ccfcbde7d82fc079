use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod cookies;
pub mod oidc;

pub use oidc::{OidcClient, OidcError};

/// Name of the cookie holding the signed session
pub const SESSION_COOKIE: &str = "app_session";
/// Name of the short-lived cookie carrying state and nonce across the login round trip
pub const VERIFICATION_COOKIE: &str = "auth_verification";

const VERIFICATION_TTL_MINUTES: i64 = 10;

/// Identity of a logged-in user: the ID token's profile claims with protocol claims removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub sub: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl SessionUser {
    pub fn email(&self) -> Option<&str> {
        self.profile.get("email").and_then(Value::as_str)
    }

    /// Best human-readable name the provider gave us
    pub fn display_name(&self) -> Option<&str> {
        ["name", "nickname", "email"]
            .iter()
            .find_map(|claim| self.profile.get(*claim).and_then(Value::as_str))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: SessionUser,
    pub iat: i64,
    pub exp: i64,
}

/// Pending login, stored between `/login` and `/callback`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginVerification {
    pub state: String,
    pub nonce: String,
    pub return_to: String,
    pub exp: i64,
}

impl LoginVerification {
    pub fn new(return_to: String) -> Self {
        Self {
            state: uuid::Uuid::new_v4().simple().to_string(),
            nonce: uuid::Uuid::new_v4().simple().to_string(),
            return_to,
            exp: (Utc::now() + Duration::minutes(VERIFICATION_TTL_MINUTES)).timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    Invalid(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::Invalid(msg) => write!(f, "Invalid JWT: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

/// HMAC keys derived from the application secret; signs session and verification cookies
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours as i64),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, user: &SessionUser) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = SessionClaims {
            user: user.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<SessionUser, JwtError> {
        self.open::<SessionClaims>(token).map(|claims| claims.user)
    }

    pub fn issue_verification(&self, verification: &LoginVerification) -> Result<String, JwtError> {
        self.sign(verification)
    }

    pub fn verify_verification(&self, token: &str) -> Result<LoginVerification, JwtError> {
        self.open(token)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    fn open<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| JwtError::Invalid(e.to_string()))
    }
}

/// Only local absolute paths survive as post-login destinations
pub fn sanitize_return_to(candidate: Option<&str>) -> String {
    match candidate {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
