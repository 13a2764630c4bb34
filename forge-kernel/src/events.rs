//! Audit trail. Transitions return these values; the program emits them and
//! the in-memory forge journals them.

use anchor_lang::prelude::*;

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderAdded {
    pub account: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRemoved {
    pub account: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paused {
    pub by: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unpaused {
    pub by: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CooldownUpdated {
    pub old_seconds: u32,
    pub new_seconds: u32,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionInitialized {
    pub version: u64,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOpened {
    pub batch_id: u64,
    pub opener: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchClosed {
    pub batch_id: u64,
    pub closer: Pubkey,
}

/// Carries the handle of the stored score, never a plaintext.
#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionAccepted {
    pub submitter: Pubkey,
    pub batch_id: u64,
    pub handle: [u8; 32],
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionRequested {
    pub request_id: u64,
    pub batch_id: u64,
    pub requester: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptionResolved {
    pub request_id: u64,
    pub batch_id: u64,
    pub result: u64,
}

#[event]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedValuePosted {
    pub handle: [u8; 32],
    pub coprocessor: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForgeEvent {
    ProviderAdded(ProviderAdded),
    ProviderRemoved(ProviderRemoved),
    Paused(Paused),
    Unpaused(Unpaused),
    CooldownUpdated(CooldownUpdated),
    VersionInitialized(VersionInitialized),
    BatchOpened(BatchOpened),
    BatchClosed(BatchClosed),
    SubmissionAccepted(SubmissionAccepted),
    DecryptionRequested(DecryptionRequested),
    DecryptionResolved(DecryptionResolved),
}

macro_rules! journal_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ForgeEvent {
                fn from(event: $variant) -> Self {
                    ForgeEvent::$variant(event)
                }
            }
        )*
    };
}

journal_from!(
    ProviderAdded,
    ProviderRemoved,
    Paused,
    Unpaused,
    CooldownUpdated,
    VersionInitialized,
    BatchOpened,
    BatchClosed,
    SubmissionAccepted,
    DecryptionRequested,
    DecryptionResolved,
);
