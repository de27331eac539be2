//! Infrastructure layer - concrete collaborators of the identity core

pub mod auth;
pub mod logging;
pub mod storage;
pub mod user;
