//! Access and refresh token issuance and validation (RS256)

use std::fmt::Debug;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::domain::user::{Role, User};
use crate::domain::{Claims, SharedClaims, TokenError, TokenKind};

use super::keys::{KeyPair, TokenKeys};

const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;
const BEARER_PREFIX: &str = "Bearer ";

/// Issuer identity and token lifetimes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSettings {
    pub issuer: String,
    /// Access token lifetime in seconds
    pub access_ttl: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl: u64,
}

impl TokenSettings {
    pub fn new(issuer: impl Into<String>, access_ttl: u64, refresh_ttl: u64) -> Self {
        Self {
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }
}

impl From<&JwtSettings> for TokenSettings {
    fn from(settings: &JwtSettings) -> Self {
        Self::new(
            settings.issuer.clone(),
            settings.access_token_ttl_secs,
            settings.refresh_token_ttl_secs,
        )
    }
}

/// Claim set of an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub iss: String,
    /// Issued at (Unix epoch seconds)
    pub iat: i64,
    /// Expiration (Unix epoch seconds)
    pub exp: i64,
    pub typ: TokenKind,
}

impl Claims for AccessClaims {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn role(&self) -> Role {
        self.role
    }

    fn issuer(&self) -> &str {
        &self.iss
    }
}

/// Claim set of a refresh token
///
/// The role is a snapshot only; the current role is re-read from the user
/// directory whenever the token is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token identifier
    #[serde(default)]
    pub jti: String,
    pub typ: TokenKind,
}

/// Token issuer/validator
pub trait TokenService: Send + Sync + Debug {
    /// Sign a short-lived access token for a user
    fn issue_access_token(&self, user: &User) -> Result<String, TokenError>;

    /// Sign a long-lived refresh token for a user
    fn issue_refresh_token(&self, user: &User) -> Result<String, TokenError>;

    /// Fully validate an access token and return its claims
    fn validate_access_token(&self, token: &str) -> Result<SharedClaims, TokenError>;

    /// Fully validate a refresh token and return only its subject
    fn validate_refresh_token(&self, token: &str) -> Result<String, TokenError>;

    /// Access token lifetime in seconds
    fn access_token_ttl(&self) -> u64;

    /// Refresh token lifetime in seconds
    fn refresh_token_ttl(&self) -> u64;

    /// Validate the access token carried in an `Authorization: Bearer <token>` header
    fn extract_from_authorization_header(
        &self,
        header: Option<&str>,
    ) -> Result<SharedClaims, TokenError> {
        let token = parse_bearer(header)?;
        self.validate_access_token(token)
    }
}

/// The scheme is matched case-sensitively and the token starts right after it
fn parse_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    let header = match header {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(TokenError::MissingHeader),
    };

    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(TokenError::MalformedHeader),
    }
}

/// RS256 token service with separate access and refresh key pairs
#[derive(Debug, Clone)]
pub struct RsaTokenService {
    settings: TokenSettings,
    keys: TokenKeys,
}

impl RsaTokenService {
    pub fn new(settings: TokenSettings, keys: TokenKeys) -> Self {
        Self { settings, keys }
    }

    pub fn issue_access_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let subject = subject_of(user)?;
        let iat = now.timestamp();

        let claims = AccessClaims {
            sub: subject,
            role: user.role(),
            iss: self.settings.issuer.clone(),
            iat,
            exp: expires_at(iat, self.settings.access_ttl),
            typ: TokenKind::Access,
        };

        sign(&claims, &self.keys.access)
    }

    pub fn issue_refresh_token_at(
        &self,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let subject = subject_of(user)?;
        let iat = now.timestamp();

        let claims = RefreshClaims {
            sub: subject,
            role: user.role(),
            iss: self.settings.issuer.clone(),
            iat,
            exp: expires_at(iat, self.settings.refresh_ttl),
            jti: Uuid::new_v4().to_string(),
            typ: TokenKind::Refresh,
        };

        sign(&claims, &self.keys.refresh)
    }

    pub fn validate_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = self.verify(token, &self.keys.access)?;

        check_kind(claims.typ, TokenKind::Access)?;
        check_lifetime(claims.iat, claims.exp, now)?;

        if claims.sub.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        Ok(claims)
    }

    pub fn validate_refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims: RefreshClaims = self.verify(token, &self.keys.refresh)?;

        check_kind(claims.typ, TokenKind::Refresh)?;
        check_lifetime(claims.iat, claims.exp, now)?;

        if claims.jti.is_empty() {
            return Err(TokenError::MissingJti);
        }

        if claims.sub.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        Ok(claims.sub)
    }

    /// Signature, algorithm and issuer checks; expiry is checked by the caller
    fn verify<C: DeserializeOwned>(&self, token: &str, keys: &KeyPair) -> Result<C, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.settings.issuer.as_str()]);

        decode::<C>(token, keys.decoding(), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::WrongAlgorithm
                }
                ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => match declared_algorithm(token) {
                    Some(alg) if alg.parse::<Algorithm>().ok() != Some(SIGNING_ALGORITHM) => {
                        TokenError::WrongAlgorithm
                    }
                    _ => TokenError::Malformed,
                },
            })
    }
}

impl TokenService for RsaTokenService {
    fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue_access_token_at(user, Utc::now())
    }

    fn issue_refresh_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue_refresh_token_at(user, Utc::now())
    }

    fn validate_access_token(&self, token: &str) -> Result<SharedClaims, TokenError> {
        let claims = self.validate_access_token_at(token, Utc::now())?;
        Ok(std::sync::Arc::new(claims))
    }

    fn validate_refresh_token(&self, token: &str) -> Result<String, TokenError> {
        self.validate_refresh_token_at(token, Utc::now())
    }

    fn access_token_ttl(&self) -> u64 {
        self.settings.access_ttl
    }

    fn refresh_token_ttl(&self) -> u64 {
        self.settings.refresh_ttl
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// `alg` of a header jsonwebtoken refuses to parse (e.g. `none`)
fn declared_algorithm(token: &str) -> Option<String> {
    let header = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(header.trim_end_matches('=')).ok()?;

    serde_json::from_slice::<RawHeader>(&bytes).ok().map(|h| h.alg)
}

fn subject_of(user: &User) -> Result<String, TokenError> {
    let subject = user.id().as_str();

    if subject.is_empty() {
        return Err(TokenError::EmptySubject);
    }

    Ok(subject.to_string())
}

fn expires_at(iat: i64, ttl_secs: u64) -> i64 {
    iat.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
}

fn sign<C: Serialize>(claims: &C, keys: &KeyPair) -> Result<String, TokenError> {
    encode(&Header::new(SIGNING_ALGORITHM), claims, keys.encoding()).map_err(|e| {
        warn!(error = %e, "Failed to sign token");
        TokenError::Signing(e.to_string())
    })
}

fn check_kind(actual: TokenKind, expected: TokenKind) -> Result<(), TokenError> {
    if actual != expected {
        return Err(TokenError::WrongKind);
    }

    Ok(())
}

/// A token is expired from the exact second of `exp` onwards
fn check_lifetime(iat: i64, exp: i64, now: DateTime<Utc>) -> Result<(), TokenError> {
    if exp <= iat {
        return Err(TokenError::Malformed);
    }

    if now.timestamp() >= exp {
        return Err(TokenError::Expired);
    }

    Ok(())
}
