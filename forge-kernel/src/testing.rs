//! Test doubles: plaintext arithmetic behind opaque handles, and an oracle
//! that signs cleartexts with a keyed MAC.

use crate::engine::{CiphertextHandle, ConfidentialEngine, DecryptionOracle, HandleEngine, ProofVerifier};
use crate::error::{ForgeError, ForgeResult};

/// A "ciphertext" that carries its plaintext alongside the handle the
/// symbolic engine would derive for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clear {
    pub value: u64,
    pub handle: CiphertextHandle,
}

impl Clear {
    pub fn uninitialized() -> Self {
        Self {
            value: 0,
            handle: CiphertextHandle::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ClearEngine;

impl ClearEngine {
    pub fn seal(&self, value: u64) -> Clear {
        let mut hasher = blake3::Hasher::new_derive_key("sealed-forge test leaf");
        hasher.update(&value.to_le_bytes());
        Clear {
            value,
            handle: CiphertextHandle(*hasher.finalize().as_bytes()),
        }
    }
}

impl ConfidentialEngine for ClearEngine {
    type Ciphertext = Clear;

    fn zero(&self) -> Clear {
        Clear {
            value: 0,
            handle: HandleEngine.zero(),
        }
    }

    fn add(&self, lhs: &Clear, rhs: &Clear) -> Clear {
        Clear {
            value: lhs.value + rhs.value,
            handle: HandleEngine.add(&lhs.handle, &rhs.handle),
        }
    }

    fn divide(&self, value: &Clear, count: u32) -> Clear {
        Clear {
            value: value.value / u64::from(count),
            handle: HandleEngine.divide(&value.handle, count),
        }
    }

    fn is_initialized(&self, value: &Clear) -> bool {
        HandleEngine.is_initialized(&value.handle)
    }

    fn handle(&self, value: &Clear) -> CiphertextHandle {
        value.handle
    }
}

const ORACLE_KEY: [u8; 32] = [0x5a; 32];

/// Hands out sequential request ids and records what was asked for.
#[derive(Clone, Debug)]
pub struct ScriptedOracle {
    pub next_request_id: u64,
    pub requests: Vec<(u64, Vec<CiphertextHandle>)>,
    pub offline: bool,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self {
            next_request_id: 1_000,
            requests: Vec::new(),
            offline: false,
        }
    }
}

impl ScriptedOracle {
    pub fn sign(&self, request_id: u64, cleartext: &[u8]) -> Vec<u8> {
        let mut hasher = blake3::Hasher::new_keyed(&ORACLE_KEY);
        hasher.update(&request_id.to_le_bytes());
        hasher.update(cleartext);
        hasher.finalize().as_bytes().to_vec()
    }
}

impl ProofVerifier for ScriptedOracle {
    fn verify_proof(&self, request_id: u64, cleartext: &[u8], proof: &[u8]) -> bool {
        self.sign(request_id, cleartext) == proof
    }
}

impl DecryptionOracle for ScriptedOracle {
    fn request_decryption(&mut self, handles: &[CiphertextHandle]) -> ForgeResult<u64> {
        if self.offline {
            return Err(ForgeError::AbortedComputation);
        }
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.requests.push((request_id, handles.to_vec()));
        Ok(request_id)
    }
}
