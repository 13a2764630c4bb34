//! Batch lifecycle: open, accept encrypted submissions, close, aggregate.

use anchor_lang::prelude::*;

use crate::engine::ConfidentialEngine;
use crate::error::{ForgeError, ForgeResult};
use crate::events::{BatchClosed, BatchOpened};
use crate::COMPONENTS_PER_SUBMISSION;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Submission<C> {
    pub submitter: Pubkey,
    pub score: C,
    pub submitted_at: i64,
}

/// One collection window. Either open (accepting submissions) or closed
/// (decryptable); never both.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Batch<C> {
    pub id: u64,
    pub is_open: bool,
    pub opened_by: Pubkey,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub submissions: Vec<Submission<C>>,
}

impl<C> Batch<C> {
    /// Serialized size of a batch holding `capacity` submissions whose score
    /// encodes to `score_len` bytes.
    pub const fn space(capacity: usize, score_len: usize) -> usize {
        8 + 1 + 32 + 8 + (1 + 8) + 4 + capacity * (32 + score_len + 8)
    }

    pub fn open(id: u64, opener: Pubkey, now: i64) -> (Self, BatchOpened) {
        let batch = Self {
            id,
            is_open: true,
            opened_by: opener,
            opened_at: now,
            closed_at: None,
            submissions: Vec::new(),
        };
        (batch, BatchOpened { batch_id: id, opener })
    }

    pub fn submission_count(&self) -> u32 {
        self.submissions.len() as u32
    }

    pub fn has_submitted(&self, account: &Pubkey) -> bool {
        self.submission_of(account).is_some()
    }

    pub fn submission_of(&self, account: &Pubkey) -> Option<&Submission<C>> {
        self.submissions.iter().find(|s| s.submitter == *account)
    }

    pub fn ensure_accepting(&self, submitter: &Pubkey, max_batch_size: u32) -> ForgeResult<()> {
        if !self.is_open {
            return Err(ForgeError::BatchClosed);
        }
        if self.submission_count() >= max_batch_size {
            return Err(ForgeError::BatchFull);
        }
        if self.has_submitted(submitter) {
            return Err(ForgeError::AlreadySubmitted);
        }
        Ok(())
    }

    /// Decryption is only possible once submissions are frozen.
    pub fn ensure_closed(&self) -> ForgeResult<()> {
        if self.is_open {
            return Err(ForgeError::BatchClosed);
        }
        Ok(())
    }

    pub fn close(&mut self, closer: Pubkey, now: i64) -> ForgeResult<BatchClosed> {
        if !self.is_open {
            return Err(ForgeError::BatchClosed);
        }
        self.is_open = false;
        self.closed_at = Some(now);
        Ok(BatchClosed {
            batch_id: self.id,
            closer,
        })
    }

    /// Appends a submission. Callers run [`Batch::ensure_accepting`] first.
    pub fn record(&mut self, submitter: Pubkey, score: C, now: i64) -> &Submission<C> {
        let index = self.submissions.len();
        self.submissions.push(Submission {
            submitter,
            score,
            submitted_at: now,
        });
        &self.submissions[index]
    }
}

/// Batch ids start at 1; 0 is the "no batch yet" sentinel.
pub fn ensure_current(batch_id: u64, current_batch_id: u64) -> ForgeResult<()> {
    if batch_id == 0 || batch_id != current_batch_id {
        return Err(ForgeError::InvalidBatch);
    }
    Ok(())
}

/// Validates each component independently, then sums them into one encrypted score.
pub fn seal_score<E: ConfidentialEngine>(
    engine: &E,
    components: &[E::Ciphertext; COMPONENTS_PER_SUBMISSION],
) -> ForgeResult<E::Ciphertext> {
    if !components.iter().all(|c| engine.is_initialized(c)) {
        return Err(ForgeError::InvalidCiphertext);
    }
    let [first, second, third] = components;
    Ok(engine.add(&engine.add(first, second), third))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregate<C> {
    pub ciphertext: C,
    pub folded: u32,
}

/// Encrypted average of the initialized scores in `batch`. An empty batch
/// averages to the encrypted zero.
pub fn aggregate<E: ConfidentialEngine>(engine: &E, batch: &Batch<E::Ciphertext>) -> Aggregate<E::Ciphertext> {
    let mut sum = engine.zero();
    let mut folded = 0u32;
    for submission in &batch.submissions {
        if engine.is_initialized(&submission.score) {
            sum = engine.add(&sum, &submission.score);
            folded += 1;
        }
    }
    if folded == 0 {
        return Aggregate { ciphertext: sum, folded };
    }
    Aggregate {
        ciphertext: engine.divide(&sum, folded),
        folded,
    }
}

/// Append-only arena of batches; batch `n` lives at index `n - 1`.
#[derive(Clone, Debug)]
pub struct BatchLedger<C> {
    batches: Vec<Batch<C>>,
}

impl<C> Default for BatchLedger<C> {
    fn default() -> Self {
        Self { batches: Vec::new() }
    }
}

impl<C> BatchLedger<C> {
    pub fn current_id(&self) -> u64 {
        self.batches.len() as u64
    }

    pub fn get(&self, batch_id: u64) -> Option<&Batch<C>> {
        let index = usize::try_from(batch_id.checked_sub(1)?).ok()?;
        self.batches.get(index)
    }

    pub(crate) fn get_mut(&mut self, batch_id: u64) -> Option<&mut Batch<C>> {
        let index = usize::try_from(batch_id.checked_sub(1)?).ok()?;
        self.batches.get_mut(index)
    }

    pub fn current(&self, batch_id: u64) -> ForgeResult<&Batch<C>> {
        ensure_current(batch_id, self.current_id())?;
        self.get(batch_id).ok_or(ForgeError::InvalidBatch)
    }

    pub fn current_mut(&mut self, batch_id: u64) -> ForgeResult<&mut Batch<C>> {
        ensure_current(batch_id, self.current_id())?;
        self.get_mut(batch_id).ok_or(ForgeError::InvalidBatch)
    }

    pub fn open(&mut self, opener: Pubkey, now: i64) -> ForgeResult<BatchOpened> {
        let id = self.current_id().checked_add(1).ok_or(ForgeError::Overflow)?;
        let (batch, event) = Batch::open(id, opener, now);
        self.batches.push(batch);
        Ok(event)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Batch<C>> {
        self.batches.iter()
    }
}
