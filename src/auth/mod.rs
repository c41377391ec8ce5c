//! Wallet authentication core
//!
//! Challenge-response login for Concordium accounts:
//! - [`challenge`]: per-account nonce issuance with expiry
//! - [`address`] + [`digest`]: canonical signed-message hash construction
//! - [`verify`]: two-level threshold Ed25519 verification
//! - [`service`]: orchestration into an [`crate::models::AuthOutcome`]

pub mod address;
pub mod challenge;
pub mod digest;
pub mod service;
pub mod verify;

pub use challenge::ChallengeStore;
pub use service::AuthService;
pub use verify::verify_message_signature;
