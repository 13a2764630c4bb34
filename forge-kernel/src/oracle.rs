//! Decryption request/response protocol.
//!
//! A request pins the exact aggregate it asked for with a digest over the
//! deployment identity and the ciphertext handle. The callback recomputes that
//! digest from current state and refuses to publish on any mismatch; only then
//! is the oracle's proof checked. A context is settled at most once.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;

use crate::engine::{CiphertextHandle, ProofVerifier};
use crate::error::{ForgeError, ForgeResult};
use crate::events::{DecryptionRequested, DecryptionResolved};

const BINDING_CONTEXT: &str = "sealed-forge decryption binding v1";

pub type StateDigest = [u8; 32];

pub fn binding_digest(deployment: &Pubkey, handles: &[CiphertextHandle]) -> StateDigest {
    let mut hasher = blake3::Hasher::new_derive_key(BINDING_CONTEXT);
    hasher.update(deployment.as_ref());
    for handle in handles {
        hasher.update(&handle.0);
    }
    *hasher.finalize().as_bytes()
}

pub fn decode_cleartext(cleartext: &[u8]) -> ForgeResult<u64> {
    let bytes: [u8; 8] = cleartext.try_into().map_err(|_| ForgeError::MalformedCleartext)?;
    Ok(u64::from_le_bytes(bytes))
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptionContext {
    pub request_id: u64,
    pub batch_id: u64,
    pub state_hash: StateDigest,
    /// `Pubkey::default()` marks a context that was never requested.
    pub requester: Pubkey,
    pub requested_at: i64,
    pub processed: bool,
    pub result: Option<u64>,
}

impl DecryptionContext {
    pub const SPACE: usize = 8 + 8 + 32 + 32 + 8 + 1 + (1 + 8);

    pub fn pending(
        request_id: u64,
        batch_id: u64,
        state_hash: StateDigest,
        requester: Pubkey,
        now: i64,
    ) -> (Self, DecryptionRequested) {
        let context = Self {
            request_id,
            batch_id,
            state_hash,
            requester,
            requested_at: now,
            processed: false,
            result: None,
        };
        let event = DecryptionRequested {
            request_id,
            batch_id,
            requester,
        };
        (context, event)
    }

    pub fn ensure_open(&self) -> ForgeResult<()> {
        if self.processed {
            return Err(ForgeError::InvalidState);
        }
        if self.requester == Pubkey::default() {
            return Err(ForgeError::InvalidRequest);
        }
        Ok(())
    }

    /// Consumes the oracle response. `recomputed` is the binding digest of the
    /// batch aggregate as it stands now. Nothing is written unless every check
    /// passes.
    pub fn settle<V: ProofVerifier + ?Sized>(
        &mut self,
        recomputed: &StateDigest,
        verifier: &V,
        cleartext: &[u8],
        proof: &[u8],
    ) -> ForgeResult<DecryptionResolved> {
        self.ensure_open()?;
        if *recomputed != self.state_hash {
            return Err(ForgeError::InvalidState);
        }
        if !verifier.verify_proof(self.request_id, cleartext, proof) {
            return Err(ForgeError::InvalidProof);
        }
        let result = decode_cleartext(cleartext)?;
        self.processed = true;
        self.result = Some(result);
        Ok(DecryptionResolved {
            request_id: self.request_id,
            batch_id: self.batch_id,
            result,
        })
    }
}

/// Append-only table of decryption contexts, indexed by oracle request id.
#[derive(Clone, Debug, Default)]
pub struct DecryptionDesk {
    contexts: Vec<DecryptionContext>,
    by_request: BTreeMap<u64, usize>,
}

impl DecryptionDesk {
    pub fn get(&self, request_id: u64) -> Option<&DecryptionContext> {
        self.by_request.get(&request_id).map(|&i| &self.contexts[i])
    }

    pub(crate) fn get_mut(&mut self, request_id: u64) -> Option<&mut DecryptionContext> {
        let index = *self.by_request.get(&request_id)?;
        self.contexts.get_mut(index)
    }

    pub fn ensure_vacant(&self, request_id: u64) -> ForgeResult<()> {
        if self.by_request.contains_key(&request_id) {
            return Err(ForgeError::DuplicateRequest);
        }
        Ok(())
    }

    pub fn insert(&mut self, context: DecryptionContext) -> ForgeResult<()> {
        self.ensure_vacant(context.request_id)?;
        self.by_request.insert(context.request_id, self.contexts.len());
        self.contexts.push(context);
        Ok(())
    }

    pub fn pending(&self) -> impl Iterator<Item = &DecryptionContext> {
        self.contexts.iter().filter(|c| !c.processed)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
