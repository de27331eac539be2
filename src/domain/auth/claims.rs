//! Verified token content

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::user::Role;

/// Trusted projection of a token that passed every validation check
///
/// Callers (e.g. transport middleware) depend on this capability rather than
/// on a concrete claim struct, so another token format can be swapped in.
pub trait Claims: Send + Sync + Debug {
    /// Identifier of the user the token was issued to
    fn subject(&self) -> &str;

    /// Role snapshot taken at issuance time
    fn role(&self) -> Role;

    /// Service that issued the token
    fn issuer(&self) -> &str;
}

/// Shared handle to verified claims
pub type SharedClaims = Arc<dyn Claims>;

/// Discriminates access tokens from refresh tokens inside the claim set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}
