//! OpenID Connect relying party for the implicit `form_post` flow.
//!
//! Provider metadata and signing keys are fetched on first use and cached for the
//! life of the process. An unknown `kid` triggers one JWKS refresh so key rotation
//! at the provider does not lock users out.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

use super::{LoginVerification, SessionUser};
use crate::config::AuthConfig;

/// Claims that describe the token rather than the user; never stored in the session
const PROTOCOL_CLAIMS: &[&str] = &[
    "aud", "iss", "iat", "exp", "nbf", "nonce", "azp", "auth_time", "s_hash", "at_hash", "c_hash",
];

#[derive(Debug, Error)]
pub enum OidcError {
    #[error("identity provider request failed: {0}")]
    Provider(String),

    #[error("identity provider returned an error: {0}")]
    Rejected(String),

    #[error("invalid ID token: {0}")]
    InvalidToken(String),

    #[error("login state mismatch")]
    StateMismatch,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for OidcError {
    fn from(err: reqwest::Error) -> Self {
        OidcError::Provider(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    nonce: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

pub struct OidcClient {
    http: reqwest::Client,
    issuer_base_url: Url,
    client_id: String,
    base_url: Url,
    provider_logout: bool,
    metadata: RwLock<Option<ProviderMetadata>>,
    jwks: RwLock<Option<JwkSet>>,
}

impl OidcClient {
    pub fn new(config: &AuthConfig) -> Result<Self, OidcError> {
        Ok(Self {
            http: reqwest::Client::new(),
            issuer_base_url: Url::parse(&config.issuer_base_url)?,
            client_id: config.client_id.clone(),
            base_url: Url::parse(&config.base_url)?,
            provider_logout: config.provider_logout,
            metadata: RwLock::new(None),
            jwks: RwLock::new(None),
        })
    }

    pub fn redirect_uri(&self) -> Result<Url, OidcError> {
        join_under(&self.base_url, "callback")
    }

    fn issuer_url(&self, path: &str) -> Result<Url, OidcError> {
        join_under(&self.issuer_base_url, path)
    }

    pub async fn metadata(&self) -> Result<ProviderMetadata, OidcError> {
        if let Some(metadata) = self.metadata.read().await.as_ref() {
            return Ok(metadata.clone());
        }

        let url = self.issuer_url(".well-known/openid-configuration")?;
        let metadata: ProviderMetadata = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!("Discovered identity provider {}", metadata.issuer);
        *self.metadata.write().await = Some(metadata.clone());
        Ok(metadata)
    }

    async fn fetch_jwks(&self, jwks_uri: &str) -> Result<JwkSet, OidcError> {
        let jwks: JwkSet = self
            .http
            .get(jwks_uri)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!("Fetched {} signing keys from {}", jwks.keys.len(), jwks_uri);
        *self.jwks.write().await = Some(jwks.clone());
        Ok(jwks)
    }

    async fn decoding_key(&self, jwks_uri: &str, kid: Option<&str>) -> Result<DecodingKey, OidcError> {
        let cached = self.jwks.read().await.clone();
        let jwks = match cached {
            Some(jwks) => jwks,
            None => self.fetch_jwks(jwks_uri).await?,
        };

        let jwk = match find_key(&jwks, kid) {
            Some(jwk) => jwk.clone(),
            None => {
                let refreshed = self.fetch_jwks(jwks_uri).await?;
                find_key(&refreshed, kid)
                    .cloned()
                    .ok_or_else(|| OidcError::InvalidToken("unknown signing key".to_string()))?
            }
        };

        DecodingKey::from_jwk(&jwk).map_err(|e| OidcError::InvalidToken(e.to_string()))
    }

    /// Provider URL the browser is sent to for login
    pub async fn authorization_url(&self, verification: &LoginVerification) -> Result<Url, OidcError> {
        let metadata = self.metadata().await?;
        self.build_authorization_url(&metadata, verification)
    }

    fn build_authorization_url(
        &self,
        metadata: &ProviderMetadata,
        verification: &LoginVerification,
    ) -> Result<Url, OidcError> {
        let mut url = Url::parse(&metadata.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "id_token")
            .append_pair("response_mode", "form_post")
            .append_pair("scope", "openid profile email")
            .append_pair("redirect_uri", self.redirect_uri()?.as_str())
            .append_pair("state", &verification.state)
            .append_pair("nonce", &verification.nonce);
        Ok(url)
    }

    /// Validate an ID token posted back to `/callback` and extract the user
    pub async fn verify_id_token(
        &self,
        id_token: &str,
        verification: &LoginVerification,
    ) -> Result<SessionUser, OidcError> {
        let metadata = self.metadata().await?;
        let header = decode_header(id_token).map_err(|e| OidcError::InvalidToken(e.to_string()))?;
        let key = self.decoding_key(&metadata.jwks_uri, header.kid.as_deref()).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&[&metadata.issuer]);

        let claims = decode::<IdTokenClaims>(id_token, &key, &validation)
            .map_err(|e| OidcError::InvalidToken(e.to_string()))?
            .claims;

        session_user_from_claims(claims, &verification.nonce)
    }

    /// Where the browser goes after the local session is cleared
    pub fn logout_url(&self) -> Result<Url, OidcError> {
        if !self.provider_logout {
            return Ok(self.base_url.clone());
        }
        let mut url = self.issuer_url("v2/logout")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("returnTo", self.base_url.as_str());
        Ok(url)
    }
}

/// Join `path` below `base`, keeping any path prefix on `base` (e.g. a realm)
fn join_under(base: &Url, path: &str) -> Result<Url, OidcError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path)?)
}

fn find_key<'a>(jwks: &'a JwkSet, kid: Option<&str>) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    match kid {
        Some(kid) => jwks.find(kid),
        None => jwks.keys.first(),
    }
}

fn session_user_from_claims(claims: IdTokenClaims, expected_nonce: &str) -> Result<SessionUser, OidcError> {
    if claims.nonce.as_deref() != Some(expected_nonce) {
        return Err(OidcError::InvalidToken("nonce mismatch".to_string()));
    }

    let mut profile = claims.rest;
    for claim in PROTOCOL_CLAIMS {
        profile.remove(*claim);
    }

    Ok(SessionUser {
        sub: claims.sub,
        profile,
    })
}
