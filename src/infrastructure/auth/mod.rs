//! Authentication infrastructure module
//!
//! RSA key material, access/refresh token issuance and validation, and the
//! authentication orchestrator built on top of them.

mod jwt;
mod keys;
mod service;

pub use jwt::{AccessClaims, RefreshClaims, RsaTokenService, TokenService, TokenSettings};
pub use keys::{KeyPair, PemKeyPair, TokenKeys, MIN_RSA_BITS};
pub use service::AuthService;

#[cfg(test)]
pub(crate) use keys::test_support;
