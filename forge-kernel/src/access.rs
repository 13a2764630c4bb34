//! Owner/provider roles, the pause switch and the per-account cooldown.
//!
//! Gated operations check, in order: pause state, role, cooldown. The gate is
//! evaluated without side effects and yields an [`Admission`]; the caller's
//! timestamp is stamped only when the admission is committed, after every
//! other precondition of the operation has passed.

use std::collections::{BTreeMap, BTreeSet};

use anchor_lang::prelude::*;

use crate::error::{ForgeError, ForgeResult};
use crate::events::{CooldownUpdated, Paused, ProviderAdded, ProviderRemoved, Unpaused, VersionInitialized};

/// Process-wide administrative state.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccessControl {
    pub owner: Pubkey,
    pub paused: bool,
    pub cooldown_seconds: u32,
    pub version: u64,
}

impl AccessControl {
    pub const SPACE: usize = 32 + 1 + 4 + 8;

    pub fn new(owner: Pubkey, cooldown_seconds: u32) -> Self {
        Self {
            owner,
            paused: false,
            cooldown_seconds,
            version: 0,
        }
    }

    pub fn ensure_owner(&self, caller: &Pubkey) -> ForgeResult<()> {
        if *caller != self.owner {
            return Err(ForgeError::NotOwner);
        }
        Ok(())
    }

    pub fn ensure_live(&self) -> ForgeResult<()> {
        if self.paused {
            return Err(ForgeError::Paused);
        }
        Ok(())
    }

    pub fn pause(&mut self, caller: &Pubkey) -> ForgeResult<Paused> {
        self.ensure_owner(caller)?;
        self.ensure_live()?;
        self.paused = true;
        Ok(Paused { by: *caller })
    }

    /// No guard on the current state: unpausing a live forge is a no-op that
    /// still emits.
    pub fn unpause(&mut self, caller: &Pubkey) -> ForgeResult<Unpaused> {
        self.ensure_owner(caller)?;
        self.paused = false;
        Ok(Unpaused { by: *caller })
    }

    pub fn set_cooldown(&mut self, caller: &Pubkey, seconds: u32) -> ForgeResult<CooldownUpdated> {
        self.ensure_owner(caller)?;
        let old_seconds = self.cooldown_seconds;
        self.cooldown_seconds = seconds;
        Ok(CooldownUpdated {
            old_seconds,
            new_seconds: seconds,
        })
    }

    pub fn initialize_version(&mut self, caller: &Pubkey, version: u64) -> ForgeResult<VersionInitialized> {
        self.ensure_owner(caller)?;
        if self.version != 0 {
            return Err(ForgeError::AlreadyInitialized);
        }
        self.version = version;
        Ok(VersionInitialized { version })
    }

    pub fn grant_provider(&self, caller: &Pubkey, account: Pubkey) -> ForgeResult<ProviderAdded> {
        self.ensure_owner(caller)?;
        Ok(ProviderAdded { account })
    }

    pub fn revoke_provider(&self, caller: &Pubkey, account: Pubkey) -> ForgeResult<ProviderRemoved> {
        self.ensure_owner(caller)?;
        Ok(ProviderRemoved { account })
    }
}

pub fn ensure_provider(is_provider: bool) -> ForgeResult<()> {
    if !is_provider {
        return Err(ForgeError::NotProvider);
    }
    Ok(())
}

/// Last rate-limited action of one account.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cooldown {
    pub last_action_at: Option<i64>,
}

impl Cooldown {
    pub const SPACE: usize = 1 + 8;

    pub fn check(&self, now: i64, cooldown_seconds: u32) -> ForgeResult<()> {
        match self.last_action_at {
            Some(last) if now.saturating_sub(last) < i64::from(cooldown_seconds) => {
                Err(ForgeError::RateLimited)
            }
            _ => Ok(()),
        }
    }

    pub fn stamp(&mut self, now: i64) {
        self.last_action_at = Some(now);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Anyone,
    Provider,
}

/// Proof that a caller passed the gate; consumed by [`Roles::commit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Admission {
    pub caller: Pubkey,
    stamp: Option<i64>,
}

/// Provider flags and cooldown records, keyed by account.
#[derive(Clone, Debug, Default)]
pub struct Roles {
    providers: BTreeSet<Pubkey>,
    activity: BTreeMap<Pubkey, Cooldown>,
}

impl Roles {
    pub fn is_provider(&self, account: &Pubkey) -> bool {
        self.providers.contains(account)
    }

    pub fn cooldown(&self, account: &Pubkey) -> Cooldown {
        self.activity.get(account).copied().unwrap_or_default()
    }

    pub fn add_provider(&mut self, account: Pubkey) {
        self.providers.insert(account);
    }

    pub fn remove_provider(&mut self, account: &Pubkey) {
        self.providers.remove(account);
    }

    pub fn admit(
        &self,
        access: &AccessControl,
        caller: Pubkey,
        now: i64,
        requirement: Requirement,
        rate_limited: bool,
    ) -> ForgeResult<Admission> {
        access.ensure_live()?;
        if requirement == Requirement::Provider {
            ensure_provider(self.is_provider(&caller))?;
        }
        let stamp = if rate_limited {
            self.cooldown(&caller).check(now, access.cooldown_seconds)?;
            Some(now)
        } else {
            None
        };
        Ok(Admission { caller, stamp })
    }

    pub fn commit(&mut self, admission: Admission) {
        if let Some(now) = admission.stamp {
            self.activity.entry(admission.caller).or_default().stamp(now);
        }
    }
}
