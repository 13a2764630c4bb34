use anchor_lang::prelude::*;

pub type ForgeResult<T> = core::result::Result<T, ForgeError>;

#[error_code]
#[derive(PartialEq, Eq)]
pub enum ForgeError {
    #[msg("Caller is not the owner")]
    NotOwner,
    #[msg("Caller is not a provider")]
    NotProvider,
    #[msg("Forge is paused")]
    Paused,
    #[msg("Caller acted too recently")]
    RateLimited,
    #[msg("Batch id is not the current batch")]
    InvalidBatch,
    #[msg("Batch is closed")]
    BatchClosed,
    #[msg("Batch is full")]
    BatchFull,
    #[msg("Ciphertext is not initialized")]
    InvalidCiphertext,
    #[msg("Decryption context is resolved or stale")]
    InvalidState,
    #[msg("Unknown decryption request")]
    InvalidRequest,
    #[msg("Account already submitted to this batch")]
    AlreadySubmitted,
    #[msg("Decryption proof failed verification")]
    InvalidProof,
    #[msg("Cleartext is not an 8-byte little-endian u64")]
    MalformedCleartext,
    #[msg("Request id is already bound to a decryption context")]
    DuplicateRequest,
    #[msg("Version counter already initialized")]
    AlreadyInitialized,
    #[msg("Sealed value does not belong to the aggregate handle")]
    SealedValueMismatch,
    #[msg("Caller is not the coprocessor")]
    NotCoprocessor,
    #[msg("The computation was aborted")]
    AbortedComputation,
    #[msg("Cluster not set")]
    ClusterNotSet,
    #[msg("Arithmetic overflow")]
    Overflow,
}
