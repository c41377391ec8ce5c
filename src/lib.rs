//! Concordium wallet login core
//!
//! Authenticates a visitor by proving control of a Concordium account:
//! a per-account nonce challenge is issued, the wallet signs a canonical
//! digest of the challenge message, and the signature set is verified
//! against the account's on-chain credential structure with its two-level
//! thresholds. On success the verified address is handed to the external
//! identity layer; sessions, user records and the node client stay outside
//! this crate.

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod store;

pub use auth::AuthService;
pub use config::Config;
pub use error::{AuthError, IdentityError, ProviderError, StoreError};
