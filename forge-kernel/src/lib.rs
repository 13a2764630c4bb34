//! Orchestration core for sealed crafting batches.
//!
//! Participants push encrypted components into time-boxed batches, the batch
//! folds them into an encrypted aggregate, and a decryption oracle later
//! publishes the plaintext average through an asynchronous, verified callback.
//! The homomorphic arithmetic itself is injected through [`ConfidentialEngine`].

pub mod access;
pub mod batch;
pub mod engine;
pub mod error;
pub mod events;
pub mod forge;
pub mod oracle;

#[cfg(test)]
mod testing;

pub use access::{ensure_provider, AccessControl, Admission, Cooldown, Requirement, Roles};
pub use batch::{aggregate, ensure_current, seal_score, Aggregate, Batch, BatchLedger, Submission};
pub use engine::{CiphertextHandle, ConfidentialEngine, DecryptionOracle, HandleEngine, ProofVerifier};
pub use error::{ForgeError, ForgeResult};
pub use events::*;
pub use forge::{Forge, ForgeSettings};
pub use oracle::{binding_digest, decode_cleartext, DecryptionContext, DecryptionDesk, StateDigest};

/// Upper bound on submissions accepted into a single batch.
pub const MAX_BATCH_SIZE: u32 = 100;

/// Cooldown applied between rate-limited actions of one account.
pub const DEFAULT_COOLDOWN_SECONDS: u32 = 30;

/// Number of encrypted components a participant submits per batch.
pub const COMPONENTS_PER_SUBMISSION: usize = 3;
