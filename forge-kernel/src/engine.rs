//! Capability interface of the confidential arithmetic engine.
//!
//! The kernel never sees plaintext. It only combines ciphertexts through the
//! engine, and it identifies a ciphertext by its 32-byte handle in events and
//! digests.

use anchor_lang::prelude::*;

use crate::error::ForgeResult;

const HANDLE_CONTEXT: &str = "sealed-forge ciphertext handle v1";

const OP_ZERO: u8 = 0x00;
const OP_ADD: u8 = 0x01;
const OP_DIVIDE: u8 = 0x02;

/// Opaque identifier of a ciphertext held by the engine.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CiphertextHandle(pub [u8; 32]);

impl CiphertextHandle {
    pub const SPACE: usize = 32;

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn is_zeroed(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for CiphertextHandle {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

pub trait ConfidentialEngine {
    type Ciphertext: Clone;

    /// An encryption of zero.
    fn zero(&self) -> Self::Ciphertext;

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;

    /// Divides an encrypted value by a plaintext count. `count` is never zero.
    fn divide(&self, value: &Self::Ciphertext, count: u32) -> Self::Ciphertext;

    fn is_initialized(&self, value: &Self::Ciphertext) -> bool;

    fn handle(&self, value: &Self::Ciphertext) -> CiphertextHandle;
}

/// Checks the signatures binding a cleartext to a decryption request.
pub trait ProofVerifier {
    fn verify_proof(&self, request_id: u64, cleartext: &[u8], proof: &[u8]) -> bool;
}

/// Asynchronous decryption service. A request returns immediately with an id;
/// the cleartext arrives later through a separate callback.
pub trait DecryptionOracle: ProofVerifier {
    fn request_decryption(&mut self, handles: &[CiphertextHandle]) -> ForgeResult<u64>;
}

/// Symbolic engine whose ciphertexts are handles.
///
/// Every operation derives its result handle from the operation tag and the
/// operand handles; the ciphertext behind a handle is materialised by the
/// coprocessor off-chain. Operands of `add` are ordered first so that the
/// derived handle does not depend on argument order.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandleEngine;

impl HandleEngine {
    fn derive(op: u8, operands: &[&[u8]]) -> CiphertextHandle {
        let mut hasher = blake3::Hasher::new_derive_key(HANDLE_CONTEXT);
        hasher.update(&[op]);
        for operand in operands {
            hasher.update(operand);
        }
        CiphertextHandle(*hasher.finalize().as_bytes())
    }
}

impl ConfidentialEngine for HandleEngine {
    type Ciphertext = CiphertextHandle;

    fn zero(&self) -> CiphertextHandle {
        Self::derive(OP_ZERO, &[])
    }

    fn add(&self, lhs: &CiphertextHandle, rhs: &CiphertextHandle) -> CiphertextHandle {
        let (low, high) = if lhs <= rhs { (lhs, rhs) } else { (rhs, lhs) };
        Self::derive(OP_ADD, &[&low.0, &high.0])
    }

    fn divide(&self, value: &CiphertextHandle, count: u32) -> CiphertextHandle {
        Self::derive(OP_DIVIDE, &[&value.0, &count.to_le_bytes()])
    }

    fn is_initialized(&self, value: &CiphertextHandle) -> bool {
        !value.is_zeroed()
    }

    fn handle(&self, value: &CiphertextHandle) -> CiphertextHandle {
        *value
    }
}
