//! In-memory forge: one serializer over roles, batches and decryption
//! contexts. Each operation validates everything first and mutates last, so a
//! failed call leaves no trace.

use anchor_lang::prelude::*;

use crate::access::{AccessControl, Requirement, Roles};
use crate::batch::{aggregate, seal_score, Aggregate, Batch, BatchLedger};
use crate::engine::{CiphertextHandle, ConfidentialEngine, DecryptionOracle};
use crate::error::{ForgeError, ForgeResult};
use crate::events::{ForgeEvent, SubmissionAccepted};
use crate::oracle::{binding_digest, DecryptionContext, DecryptionDesk, StateDigest};
use crate::{COMPONENTS_PER_SUBMISSION, DEFAULT_COOLDOWN_SECONDS, MAX_BATCH_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForgeSettings {
    pub max_batch_size: u32,
    pub cooldown_seconds: u32,
}

impl Default for ForgeSettings {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
        }
    }
}

pub struct Forge<E: ConfidentialEngine, O: DecryptionOracle> {
    deployment: Pubkey,
    max_batch_size: u32,
    access: AccessControl,
    roles: Roles,
    batches: BatchLedger<E::Ciphertext>,
    desk: DecryptionDesk,
    engine: E,
    oracle: O,
    journal: Vec<ForgeEvent>,
}

impl<E: ConfidentialEngine, O: DecryptionOracle> Forge<E, O> {
    /// `deployment` identifies this instance inside every staleness digest.
    pub fn new(owner: Pubkey, deployment: Pubkey, settings: ForgeSettings, engine: E, oracle: O) -> Self {
        Self {
            deployment,
            max_batch_size: settings.max_batch_size,
            access: AccessControl::new(owner, settings.cooldown_seconds),
            roles: Roles::default(),
            batches: BatchLedger::default(),
            desk: DecryptionDesk::default(),
            engine,
            oracle,
            journal: Vec::new(),
        }
    }

    fn record(&mut self, event: impl Into<ForgeEvent>) {
        self.journal.push(event.into());
    }

    // ---- administration ----

    pub fn add_provider(&mut self, caller: Pubkey, account: Pubkey) -> ForgeResult<()> {
        let event = self.access.grant_provider(&caller, account)?;
        self.roles.add_provider(account);
        msg!("Provider added: {}", account);
        self.record(event);
        Ok(())
    }

    pub fn remove_provider(&mut self, caller: Pubkey, account: Pubkey) -> ForgeResult<()> {
        let event = self.access.revoke_provider(&caller, account)?;
        self.roles.remove_provider(&account);
        msg!("Provider removed: {}", account);
        self.record(event);
        Ok(())
    }

    pub fn set_cooldown(&mut self, caller: Pubkey, seconds: u32) -> ForgeResult<()> {
        let event = self.access.set_cooldown(&caller, seconds)?;
        msg!("Cooldown {}s -> {}s", event.old_seconds, event.new_seconds);
        self.record(event);
        Ok(())
    }

    pub fn pause(&mut self, caller: Pubkey) -> ForgeResult<()> {
        let event = self.access.pause(&caller)?;
        msg!("Forge paused by {}", caller);
        self.record(event);
        Ok(())
    }

    pub fn unpause(&mut self, caller: Pubkey) -> ForgeResult<()> {
        let event = self.access.unpause(&caller)?;
        msg!("Forge unpaused by {}", caller);
        self.record(event);
        Ok(())
    }

    pub fn initialize_version(&mut self, caller: Pubkey, version: u64) -> ForgeResult<()> {
        let event = self.access.initialize_version(&caller, version)?;
        msg!("Version initialized: {}", version);
        self.record(event);
        Ok(())
    }

    // ---- batch lifecycle ----

    pub fn open_batch(&mut self, caller: Pubkey, now: i64) -> ForgeResult<u64> {
        let admission = self.roles.admit(&self.access, caller, now, Requirement::Provider, true)?;
        let event = self.batches.open(caller, now)?;
        self.roles.commit(admission);
        let batch_id = event.batch_id;
        msg!("Batch {} opened by {}", batch_id, caller);
        self.record(event);
        Ok(batch_id)
    }

    pub fn close_batch(&mut self, caller: Pubkey, batch_id: u64, now: i64) -> ForgeResult<()> {
        let admission = self.roles.admit(&self.access, caller, now, Requirement::Provider, false)?;
        let event = self.batches.current_mut(batch_id)?.close(caller, now)?;
        self.roles.commit(admission);
        msg!("Batch {} closed by {}", batch_id, caller);
        self.record(event);
        Ok(())
    }

    /// Folds three encrypted components into one score for `caller` and
    /// returns the handle of the stored score.
    pub fn submit_encrypted_components(
        &mut self,
        caller: Pubkey,
        batch_id: u64,
        components: [E::Ciphertext; COMPONENTS_PER_SUBMISSION],
        now: i64,
    ) -> ForgeResult<CiphertextHandle> {
        let admission = self.roles.admit(&self.access, caller, now, Requirement::Anyone, true)?;
        let batch = self.batches.current(batch_id)?;
        batch.ensure_accepting(&caller, self.max_batch_size)?;
        let score = seal_score(&self.engine, &components)?;
        let handle = self.engine.handle(&score);

        self.batches.current_mut(batch_id)?.record(caller, score, now);
        self.roles.commit(admission);
        msg!("Submission accepted in batch {} from {}", batch_id, caller);
        self.record(SubmissionAccepted {
            submitter: caller,
            batch_id,
            handle: handle.to_bytes(),
        });
        Ok(handle)
    }

    // ---- decryption protocol ----

    fn digest_of(&self, batch: &Batch<E::Ciphertext>) -> StateDigest {
        let aggregate = aggregate(&self.engine, batch);
        binding_digest(&self.deployment, &[self.engine.handle(&aggregate.ciphertext)])
    }

    /// Asks the oracle to decrypt the aggregate of a closed batch. Returns the
    /// oracle-assigned request id immediately; the result arrives through
    /// [`Forge::fulfill_decryption`].
    ///
    /// The oracle assigns the id, so it is called before the id can be checked
    /// against the desk. If it hands back an id that is already bound, the
    /// forge fails with `DuplicateRequest` and keeps no state, but the oracle
    /// still holds that request. Its callback can only ever reach the context
    /// that already owns the id; the oracle side is left for its operator to
    /// drop.
    pub fn request_decryption(&mut self, caller: Pubkey, batch_id: u64, now: i64) -> ForgeResult<u64> {
        let admission = self.roles.admit(&self.access, caller, now, Requirement::Anyone, true)?;
        let batch = self.batches.current(batch_id)?;
        batch.ensure_closed()?;
        let aggregate = aggregate(&self.engine, batch);
        let handle = self.engine.handle(&aggregate.ciphertext);
        let state_hash = binding_digest(&self.deployment, &[handle]);

        let request_id = self.oracle.request_decryption(&[handle])?;
        self.desk.ensure_vacant(request_id)?;
        let (context, event) = DecryptionContext::pending(request_id, batch_id, state_hash, caller, now);
        self.desk.insert(context)?;
        self.roles.commit(admission);
        msg!(
            "Decryption {} requested for batch {} ({} scores folded)",
            request_id,
            batch_id,
            aggregate.folded
        );
        self.record(event);
        Ok(request_id)
    }

    /// Oracle callback. Re-derives the aggregate digest of the context's
    /// batch, rejects drift, then verifies the proof before publishing.
    pub fn fulfill_decryption(&mut self, request_id: u64, cleartext: &[u8], proof: &[u8]) -> ForgeResult<u64> {
        let context = self.desk.get(request_id).ok_or(ForgeError::InvalidRequest)?;
        context.ensure_open()?;
        let batch = self.batches.get(context.batch_id).ok_or(ForgeError::InvalidRequest)?;
        let recomputed = self.digest_of(batch);

        let context = self.desk.get_mut(request_id).ok_or(ForgeError::InvalidRequest)?;
        let event = match context.settle(&recomputed, &self.oracle, cleartext, proof) {
            Ok(event) => event,
            Err(ForgeError::InvalidState) => {
                msg!("Decryption {} rejected: aggregate drifted since request", request_id);
                return Err(ForgeError::InvalidState);
            }
            Err(err) => return Err(err),
        };
        let result = event.result;
        msg!("Decryption {} resolved for batch {}", request_id, event.batch_id);
        self.record(event);
        Ok(result)
    }

    // ---- views ----

    pub fn owner(&self) -> Pubkey {
        self.access.owner
    }

    pub fn is_paused(&self) -> bool {
        self.access.paused
    }

    pub fn cooldown_seconds(&self) -> u32 {
        self.access.cooldown_seconds
    }

    pub fn version(&self) -> u64 {
        self.access.version
    }

    pub fn is_provider(&self, account: &Pubkey) -> bool {
        self.roles.is_provider(account)
    }

    pub fn last_action_at(&self, account: &Pubkey) -> Option<i64> {
        self.roles.cooldown(account).last_action_at
    }

    pub fn current_batch_id(&self) -> u64 {
        self.batches.current_id()
    }

    pub fn batch(&self, batch_id: u64) -> Option<&Batch<E::Ciphertext>> {
        self.batches.get(batch_id)
    }

    pub fn batches(&self) -> impl Iterator<Item = &Batch<E::Ciphertext>> {
        self.batches.iter()
    }

    pub fn has_submitted(&self, batch_id: u64, account: &Pubkey) -> bool {
        self.batches
            .get(batch_id)
            .is_some_and(|batch| batch.has_submitted(account))
    }

    pub fn submission_handle(&self, batch_id: u64, account: &Pubkey) -> Option<CiphertextHandle> {
        let submission = self.batches.get(batch_id)?.submission_of(account)?;
        Some(self.engine.handle(&submission.score))
    }

    pub fn encrypted_aggregate(&self, batch_id: u64) -> ForgeResult<Aggregate<E::Ciphertext>> {
        let batch = self.batches.get(batch_id).ok_or(ForgeError::InvalidBatch)?;
        Ok(aggregate(&self.engine, batch))
    }

    pub fn decryption(&self, request_id: u64) -> Option<&DecryptionContext> {
        self.desk.get(request_id)
    }

    pub fn pending_decryptions(&self) -> impl Iterator<Item = &DecryptionContext> {
        self.desk.pending()
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn events(&self) -> &[ForgeEvent] {
        &self.journal
    }

    pub fn drain_events(&mut self) -> Vec<ForgeEvent> {
        std::mem::take(&mut self.journal)
    }

    #[cfg(test)]
    pub(crate) fn batch_mut(&mut self, batch_id: u64) -> Option<&mut Batch<E::Ciphertext>> {
        self.batches.get_mut(batch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::*;
    use crate::testing::{Clear, ClearEngine, ScriptedOracle};
    use proptest::prelude::*;

    type TestForge = Forge<ClearEngine, ScriptedOracle>;

    const T0: i64 = 1_700_000_000;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    fn owner() -> Pubkey {
        key(1)
    }

    fn provider() -> Pubkey {
        key(2)
    }

    fn forge_with(settings: ForgeSettings) -> TestForge {
        let mut forge = Forge::new(owner(), key(0xf0), settings, ClearEngine, ScriptedOracle::default());
        forge.add_provider(owner(), provider()).unwrap();
        forge
    }

    fn forge() -> TestForge {
        forge_with(ForgeSettings::default())
    }

    fn triple(a: u64, b: u64, c: u64) -> [Clear; 3] {
        let engine = ClearEngine;
        [engine.seal(a), engine.seal(b), engine.seal(c)]
    }

    fn resolve(forge: &mut TestForge, request_id: u64) -> ForgeResult<u64> {
        let batch_id = forge.decryption(request_id).unwrap().batch_id;
        let plaintext = forge.encrypted_aggregate(batch_id).unwrap().ciphertext.value;
        let cleartext = plaintext.to_le_bytes();
        let proof = forge.oracle().sign(request_id, &cleartext);
        forge.fulfill_decryption(request_id, &cleartext, &proof)
    }

    #[test]
    fn end_to_end_average_of_three_submitters() {
        let mut forge = forge();
        let batch_id = forge.open_batch(provider(), T0).unwrap();
        assert_eq!(batch_id, 1);

        for who in [key(10), key(11), key(12)] {
            forge.submit_encrypted_components(who, 1, triple(2, 3, 4), T0 + 1).unwrap();
        }
        assert_eq!(forge.batch(1).unwrap().submission_count(), 3);

        forge.close_batch(provider(), 1, T0 + 2).unwrap();
        let request_id = forge.request_decryption(key(10), 1, T0 + 100).unwrap();
        assert_eq!(forge.oracle().requests.len(), 1);

        assert_eq!(resolve(&mut forge, request_id), Ok(9));
        let context = forge.decryption(request_id).unwrap();
        assert!(context.processed);
        assert_eq!(context.result, Some(9));
        assert_eq!(
            forge.events().last(),
            Some(&ForgeEvent::DecryptionResolved(DecryptionResolved {
                request_id,
                batch_id: 1,
                result: 9,
            }))
        );
    }

    #[test]
    fn audit_trail_follows_every_transition() {
        let mut forge = forge();
        forge.drain_events();
        forge.open_batch(provider(), T0).unwrap();
        let handle = forge
            .submit_encrypted_components(key(10), 1, triple(1, 1, 1), T0)
            .unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let request_id = forge.request_decryption(key(11), 1, T0).unwrap();

        assert_eq!(
            forge.drain_events(),
            vec![
                ForgeEvent::BatchOpened(BatchOpened { batch_id: 1, opener: provider() }),
                ForgeEvent::SubmissionAccepted(SubmissionAccepted {
                    submitter: key(10),
                    batch_id: 1,
                    handle: handle.to_bytes(),
                }),
                ForgeEvent::BatchClosed(BatchClosed { batch_id: 1, closer: provider() }),
                ForgeEvent::DecryptionRequested(DecryptionRequested {
                    request_id,
                    batch_id: 1,
                    requester: key(11),
                }),
            ]
        );
        assert!(forge.events().is_empty());
        assert_eq!(forge.submission_handle(1, &key(10)), Some(handle));
    }

    #[test]
    fn only_providers_open_and_close() {
        let mut forge = forge();
        assert_eq!(forge.open_batch(key(9), T0), Err(ForgeError::NotProvider));
        assert_eq!(forge.open_batch(owner(), T0), Err(ForgeError::NotProvider));
        forge.open_batch(provider(), T0).unwrap();
        assert_eq!(forge.close_batch(key(9), 1, T0), Err(ForgeError::NotProvider));

        forge.remove_provider(owner(), provider()).unwrap();
        assert_eq!(forge.close_batch(provider(), 1, T0), Err(ForgeError::NotProvider));
        assert!(forge.batch(1).unwrap().is_open);
    }

    #[test]
    fn admin_surface_is_owner_only() {
        let mut forge = forge();
        let stranger = key(9);
        assert_eq!(forge.add_provider(stranger, stranger), Err(ForgeError::NotOwner));
        assert_eq!(forge.remove_provider(stranger, provider()), Err(ForgeError::NotOwner));
        assert_eq!(forge.set_cooldown(stranger, 0), Err(ForgeError::NotOwner));
        assert_eq!(forge.pause(stranger), Err(ForgeError::NotOwner));
        assert_eq!(forge.unpause(stranger), Err(ForgeError::NotOwner));
        assert_eq!(forge.initialize_version(stranger, 1), Err(ForgeError::NotOwner));
        assert!(forge.is_provider(&provider()));
        assert!(!forge.is_provider(&stranger));
    }

    #[test]
    fn pause_halts_gated_operations_but_not_admin() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.pause(owner()).unwrap();
        assert_eq!(forge.pause(owner()), Err(ForgeError::Paused));

        assert_eq!(forge.open_batch(provider(), T0 + 100), Err(ForgeError::Paused));
        assert_eq!(
            forge.submit_encrypted_components(key(10), 1, triple(1, 2, 3), T0 + 100),
            Err(ForgeError::Paused)
        );
        assert_eq!(forge.close_batch(provider(), 1, T0 + 100), Err(ForgeError::Paused));
        assert_eq!(forge.request_decryption(key(10), 1, T0 + 100), Err(ForgeError::Paused));

        forge.set_cooldown(owner(), 5).unwrap();
        forge.add_provider(owner(), key(3)).unwrap();
        forge.initialize_version(owner(), 2).unwrap();
        forge.unpause(owner()).unwrap();
        assert!(!forge.is_paused());
        assert_eq!(forge.version(), 2);
        forge.close_batch(provider(), 1, T0 + 100).unwrap();
    }

    #[test]
    fn rejected_calls_do_not_consume_the_cooldown() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        let bad = [ClearEngine.seal(1), Clear::uninitialized(), ClearEngine.seal(1)];
        assert_eq!(
            forge.submit_encrypted_components(key(10), 1, bad, T0),
            Err(ForgeError::InvalidCiphertext)
        );
        assert_eq!(forge.last_action_at(&key(10)), None);
        forge.submit_encrypted_components(key(10), 1, triple(1, 1, 1), T0).unwrap();
        assert_eq!(forge.last_action_at(&key(10)), Some(T0));
    }

    #[test]
    fn submission_checks_run_in_order() {
        let mut forge = forge_with(ForgeSettings {
            max_batch_size: 2,
            cooldown_seconds: 0,
        });
        assert_eq!(
            forge.submit_encrypted_components(key(10), 0, triple(1, 1, 1), T0),
            Err(ForgeError::InvalidBatch)
        );
        forge.open_batch(provider(), T0).unwrap();
        assert_eq!(
            forge.submit_encrypted_components(key(10), 2, triple(1, 1, 1), T0),
            Err(ForgeError::InvalidBatch)
        );
        forge.submit_encrypted_components(key(10), 1, triple(1, 1, 1), T0).unwrap();
        assert_eq!(
            forge.submit_encrypted_components(key(10), 1, triple(5, 5, 5), T0),
            Err(ForgeError::AlreadySubmitted)
        );
        forge.submit_encrypted_components(key(11), 1, triple(1, 1, 1), T0).unwrap();
        assert_eq!(
            forge.submit_encrypted_components(key(12), 1, triple(1, 1, 1), T0),
            Err(ForgeError::BatchFull)
        );
        forge.close_batch(provider(), 1, T0).unwrap();
        assert_eq!(
            forge.submit_encrypted_components(key(12), 1, triple(1, 1, 1), T0),
            Err(ForgeError::BatchClosed)
        );
        assert_eq!(forge.batch(1).unwrap().submission_count(), 2);
    }

    #[test]
    fn stale_batches_reject_close_and_decryption() {
        let mut forge = forge_with(ForgeSettings {
            max_batch_size: 100,
            cooldown_seconds: 0,
        });
        forge.open_batch(provider(), T0).unwrap();
        forge.open_batch(provider(), T0).unwrap();
        assert_eq!(forge.current_batch_id(), 2);
        assert_eq!(forge.close_batch(provider(), 1, T0), Err(ForgeError::InvalidBatch));
        forge.close_batch(provider(), 2, T0).unwrap();
        assert_eq!(forge.close_batch(provider(), 2, T0), Err(ForgeError::BatchClosed));
        assert_eq!(forge.request_decryption(key(10), 1, T0), Err(ForgeError::InvalidBatch));
        assert!(forge.batch(1).unwrap().is_open);
    }

    #[test]
    fn open_batch_cannot_be_decrypted() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        assert_eq!(forge.request_decryption(key(10), 1, T0), Err(ForgeError::BatchClosed));
        assert!(forge.oracle().requests.is_empty());
        assert_eq!(forge.last_action_at(&key(10)), None);
    }

    #[test]
    fn empty_batch_decrypts_to_zero() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let aggregate = forge.encrypted_aggregate(1).unwrap();
        assert_eq!(aggregate.folded, 0);
        assert_eq!(aggregate.ciphertext, ClearEngine.zero());

        let request_id = forge.request_decryption(key(10), 1, T0).unwrap();
        assert_eq!(forge.oracle().requests[0].1, vec![ClearEngine.zero().handle]);
        assert_eq!(resolve(&mut forge, request_id), Ok(0));
    }

    #[test]
    fn second_callback_fails_without_new_event() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.submit_encrypted_components(key(10), 1, triple(3, 3, 3), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let request_id = forge.request_decryption(key(10), 1, T0 + 60).unwrap();
        assert_eq!(resolve(&mut forge, request_id), Ok(9));

        let journal_len = forge.events().len();
        assert_eq!(resolve(&mut forge, request_id), Err(ForgeError::InvalidState));
        assert_eq!(forge.events().len(), journal_len);
    }

    #[test]
    fn unknown_request_is_rejected() {
        let mut forge = forge();
        assert_eq!(
            forge.fulfill_decryption(42, &0u64.to_le_bytes(), &[]),
            Err(ForgeError::InvalidRequest)
        );
    }

    #[test]
    fn drifted_aggregate_is_never_published() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.submit_encrypted_components(key(10), 1, triple(2, 3, 4), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let request_id = forge.request_decryption(key(10), 1, T0 + 60).unwrap();

        let forged_score = ClearEngine.seal(1_000);
        forge.batch_mut(1).unwrap().submissions[0].score = forged_score;
        let journal_len = forge.events().len();

        assert_eq!(resolve(&mut forge, request_id), Err(ForgeError::InvalidState));
        let context = forge.decryption(request_id).unwrap();
        assert!(!context.processed);
        assert_eq!(context.result, None);
        assert_eq!(forge.events().len(), journal_len);
    }

    #[test]
    fn forged_proof_aborts_without_state_change() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let request_id = forge.request_decryption(key(10), 1, T0).unwrap();

        let cleartext = 0u64.to_le_bytes();
        let proof = forge.oracle().sign(request_id + 1, &cleartext);
        assert_eq!(
            forge.fulfill_decryption(request_id, &cleartext, &proof),
            Err(ForgeError::InvalidProof)
        );
        assert!(!forge.decryption(request_id).unwrap().processed);
        assert_eq!(forge.pending_decryptions().count(), 1);
        assert_eq!(resolve(&mut forge, request_id), Ok(0));
        assert_eq!(forge.pending_decryptions().count(), 0);
    }

    #[test]
    fn repeated_request_ids_from_the_oracle_are_refused() {
        let mut forge = forge_with(ForgeSettings {
            max_batch_size: 100,
            cooldown_seconds: 0,
        });
        forge.open_batch(provider(), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let first = forge.request_decryption(key(10), 1, T0).unwrap();
        forge.oracle_mut().next_request_id = first;
        assert_eq!(forge.request_decryption(key(11), 1, T0), Err(ForgeError::DuplicateRequest));
        assert_eq!(forge.decryption(first).unwrap().requester, key(10));

        // the oracle kept the second request; the desk did not
        assert_eq!(forge.oracle().requests.len(), 2);
        assert_eq!(forge.pending_decryptions().count(), 1);
        assert_eq!(forge.last_action_at(&key(11)), None);
    }

    #[test]
    fn unreachable_oracle_leaves_no_context() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        forge.oracle_mut().offline = true;
        assert_eq!(
            forge.request_decryption(key(10), 1, T0),
            Err(ForgeError::AbortedComputation)
        );
        assert_eq!(forge.pending_decryptions().count(), 0);
        assert_eq!(forge.last_action_at(&key(10)), None);
    }

    #[test]
    fn late_callback_resolves_against_an_old_batch() {
        let mut forge = forge_with(ForgeSettings {
            max_batch_size: 100,
            cooldown_seconds: 0,
        });
        forge.open_batch(provider(), T0).unwrap();
        forge.submit_encrypted_components(key(10), 1, triple(4, 4, 4), T0).unwrap();
        forge.close_batch(provider(), 1, T0).unwrap();
        let request_id = forge.request_decryption(key(10), 1, T0).unwrap();

        forge.open_batch(provider(), T0 + 1).unwrap();
        forge.submit_encrypted_components(key(10), 2, triple(9, 9, 9), T0 + 1).unwrap();

        assert_eq!(resolve(&mut forge, request_id), Ok(12));
    }

    #[test]
    fn submissions_in_consecutive_batches_share_one_cooldown() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.submit_encrypted_components(key(10), 1, triple(1, 1, 1), T0 + 100).unwrap();
        forge.close_batch(provider(), 1, T0 + 100).unwrap();
        forge.open_batch(provider(), T0 + 100).unwrap();

        assert_eq!(
            forge.submit_encrypted_components(key(10), 2, triple(1, 1, 1), T0 + 129),
            Err(ForgeError::RateLimited)
        );
        assert!(!forge.has_submitted(2, &key(10)));
        forge.submit_encrypted_components(key(10), 2, triple(1, 1, 1), T0 + 130).unwrap();
        assert_eq!(forge.last_action_at(&key(10)), Some(T0 + 130));
    }

    #[test]
    fn submit_and_request_share_one_cooldown() {
        let mut forge = forge();
        forge.open_batch(provider(), T0).unwrap();
        forge.submit_encrypted_components(key(10), 1, triple(2, 2, 2), T0 + 100).unwrap();
        forge.close_batch(provider(), 1, T0 + 100).unwrap();

        assert_eq!(forge.request_decryption(key(10), 1, T0 + 110), Err(ForgeError::RateLimited));
        assert!(forge.oracle().requests.is_empty());
        let first = forge.request_decryption(key(10), 1, T0 + 130).unwrap();

        assert_eq!(forge.request_decryption(key(10), 1, T0 + 131), Err(ForgeError::RateLimited));
        assert_eq!(forge.request_decryption(key(10), 1, T0 + 159), Err(ForgeError::RateLimited));
        let second = forge.request_decryption(key(10), 1, T0 + 160).unwrap();
        assert_ne!(first, second);
        assert_eq!(forge.oracle().requests.len(), 2);
    }

    proptest! {
        #[test]
        fn submission_count_tracks_distinct_submitters(picks in proptest::collection::vec(0u8..40, 0..120)) {
            let mut forge = forge_with(ForgeSettings { max_batch_size: MAX_BATCH_SIZE, cooldown_seconds: 0 });
            forge.open_batch(provider(), T0).unwrap();
            let mut accepted = std::collections::BTreeSet::new();
            for pick in picks {
                let who = key(100 + pick);
                let outcome = forge.submit_encrypted_components(who, 1, triple(1, 2, 3), T0);
                if accepted.insert(who) {
                    prop_assert!(outcome.is_ok());
                } else {
                    prop_assert_eq!(outcome, Err(ForgeError::AlreadySubmitted));
                }
            }
            prop_assert_eq!(forge.batch(1).unwrap().submission_count() as usize, accepted.len());
            prop_assert_eq!(forge.encrypted_aggregate(1).unwrap().folded as usize, accepted.len());
        }

        #[test]
        fn foreign_batch_ids_always_fail(batch_id in any::<u64>(), opened in 0u8..4, as_provider in any::<bool>()) {
            let mut forge = forge_with(ForgeSettings { max_batch_size: MAX_BATCH_SIZE, cooldown_seconds: 0 });
            for _ in 0..opened {
                forge.open_batch(provider(), T0).unwrap();
            }
            prop_assume!(batch_id != u64::from(opened) || opened == 0);
            let who = if as_provider { provider() } else { key(50) };
            prop_assert_eq!(
                forge.submit_encrypted_components(who, batch_id, triple(1, 1, 1), T0),
                Err(ForgeError::InvalidBatch)
            );
        }

        #[test]
        fn cooldown_gates_repeat_actions(cooldown in 1u32..10_000, elapsed in 0i64..20_000) {
            let mut forge = forge_with(ForgeSettings { max_batch_size: MAX_BATCH_SIZE, cooldown_seconds: cooldown });
            forge.open_batch(provider(), T0).unwrap();
            let second = forge.open_batch(provider(), T0 + elapsed);
            if elapsed < i64::from(cooldown) {
                prop_assert_eq!(second, Err(ForgeError::RateLimited));
                prop_assert_eq!(forge.current_batch_id(), 1);
            } else {
                prop_assert_eq!(second, Ok(2));
            }
        }

        #[test]
        fn cooldown_gates_request_after_submit(cooldown in 1u32..10_000, elapsed in 0i64..20_000) {
            let mut forge = forge_with(ForgeSettings { max_batch_size: MAX_BATCH_SIZE, cooldown_seconds: cooldown });
            forge.open_batch(provider(), T0).unwrap();
            forge.submit_encrypted_components(key(10), 1, triple(1, 2, 3), T0).unwrap();
            forge.close_batch(provider(), 1, T0).unwrap();
            let request = forge.request_decryption(key(10), 1, T0 + elapsed);
            if elapsed < i64::from(cooldown) {
                prop_assert_eq!(request, Err(ForgeError::RateLimited));
                prop_assert_eq!(forge.pending_decryptions().count(), 0);
            } else {
                prop_assert!(request.is_ok());
                prop_assert_eq!(forge.last_action_at(&key(10)), Some(T0 + elapsed));
            }
        }
    }
}
