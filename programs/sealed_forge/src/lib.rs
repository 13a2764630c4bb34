use anchor_lang::prelude::*;
use arcium_anchor::prelude::*;
use arcium_anchor::LUT_PROGRAM_ID;
use arcium_client::idl::arcium::types::{CallbackAccount, CircuitSource, OffChainCircuitSource};
use arcium_macros::circuit_hash;
use forge_kernel::{
    aggregate, binding_digest, ensure_current, ensure_provider, seal_score, AccessControl, Batch,
    CiphertextHandle, Cooldown, DecryptionContext, HandleEngine, ProofVerifier, SealedValuePosted,
    SubmissionAccepted, COMPONENTS_PER_SUBMISSION, MAX_BATCH_SIZE,
};

pub use forge_kernel::ForgeError as ErrorCode;

const COMP_DEF_OFFSET_REVEAL_AGGREGATE: u32 = comp_def_offset("reveal_aggregate");

// Seeds for PDAs
pub const FORGE_SEED: &[u8] = b"forge";
pub const PROVIDER_SEED: &[u8] = b"provider";
pub const ACTIVITY_SEED: &[u8] = b"activity";
pub const BATCH_SEED: &[u8] = b"batch";
pub const SEALED_SEED: &[u8] = b"sealed";
pub const DECRYPTION_SEED: &[u8] = b"decryption";

declare_id!("5Fq1wD8nBqYtX6yKc3Hp9tVJmLr2Rk7sAe4uNz1GhQoP");

#[arcium_program]
pub mod sealed_forge {
    use super::*;

    /// Register the reveal_aggregate circuit.
    /// Pass None on localnet (circuit pre-loaded in genesis), or the URL of the
    /// published .arcis file on devnet/mainnet.
    pub fn init_reveal_aggregate_comp_def(
        ctx: Context<InitRevealAggregateCompDef>,
        circuit_url: Option<String>,
    ) -> Result<()> {
        let source = circuit_url.map(|source| {
            CircuitSource::OffChain(OffChainCircuitSource {
                source,
                hash: circuit_hash!("reveal_aggregate"),
            })
        });
        init_comp_def(ctx.accounts, source, None)?;
        Ok(())
    }

    /// Create the forge config (only needs to be called once). The signer becomes owner.
    pub fn initialize_forge(ctx: Context<InitializeForge>, cooldown_seconds: u32, coprocessor: Pubkey) -> Result<()> {
        let config = &mut ctx.accounts.forge_config;
        config.access = AccessControl::new(ctx.accounts.owner.key(), cooldown_seconds);
        config.current_batch_id = 0;
        config.coprocessor = coprocessor;
        config.bump = ctx.bumps.forge_config;
        msg!("Forge initialized with owner: {}", ctx.accounts.owner.key());
        Ok(())
    }

    pub fn initialize_version(ctx: Context<Administer>, version: u64) -> Result<()> {
        let event = ctx.accounts.forge_config.access.initialize_version(&ctx.accounts.owner.key(), version)?;
        msg!("Version initialized: {}", version);
        emit!(event);
        Ok(())
    }

    pub fn add_provider(ctx: Context<AddProvider>, account: Pubkey) -> Result<()> {
        let event = ctx.accounts.forge_config.access.grant_provider(&ctx.accounts.owner.key(), account)?;
        let role = &mut ctx.accounts.provider_role;
        role.account = account;
        role.active = true;
        role.bump = ctx.bumps.provider_role;
        msg!("Provider added: {}", account);
        emit!(event);
        Ok(())
    }

    pub fn remove_provider(ctx: Context<RemoveProvider>, account: Pubkey) -> Result<()> {
        let event = ctx.accounts.forge_config.access.revoke_provider(&ctx.accounts.owner.key(), account)?;
        ctx.accounts.provider_role.active = false;
        msg!("Provider removed: {}", account);
        emit!(event);
        Ok(())
    }

    pub fn set_cooldown(ctx: Context<Administer>, seconds: u32) -> Result<()> {
        let event = ctx.accounts.forge_config.access.set_cooldown(&ctx.accounts.owner.key(), seconds)?;
        msg!("Cooldown {}s -> {}s", event.old_seconds, event.new_seconds);
        emit!(event);
        Ok(())
    }

    pub fn pause(ctx: Context<Administer>) -> Result<()> {
        let event = ctx.accounts.forge_config.access.pause(&ctx.accounts.owner.key())?;
        msg!("Forge paused by {}", event.by);
        emit!(event);
        Ok(())
    }

    pub fn unpause(ctx: Context<Administer>) -> Result<()> {
        let event = ctx.accounts.forge_config.access.unpause(&ctx.accounts.owner.key())?;
        msg!("Forge unpaused by {}", event.by);
        emit!(event);
        Ok(())
    }

    /// Open the next batch. `batch_id` must be `current_batch_id + 1`; it only
    /// exists to derive the batch PDA.
    pub fn open_batch(ctx: Context<OpenBatch>, batch_id: u64) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let provider = ctx.accounts.provider.key();
        let config = &ctx.accounts.forge_config;

        config.access.ensure_live()?;
        ensure_provider(ctx.accounts.provider_role.active)?;
        ctx.accounts.activity.cooldown.check(now, config.access.cooldown_seconds)?;

        let next_id = config.current_batch_id.checked_add(1).ok_or(ErrorCode::Overflow)?;
        require!(batch_id == next_id, ErrorCode::InvalidBatch);

        let (batch, event) = Batch::open(batch_id, provider, now);
        ctx.accounts.batch_account.batch = batch;
        ctx.accounts.batch_account.bump = ctx.bumps.batch_account;
        ctx.accounts.forge_config.current_batch_id = batch_id;
        stamp_activity(&mut ctx.accounts.activity, ctx.bumps.activity, now);

        msg!("Batch {} opened by {}", batch_id, provider);
        emit!(event);
        Ok(())
    }

    pub fn close_batch(ctx: Context<CloseBatch>, batch_id: u64) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let provider = ctx.accounts.provider.key();
        let config = &ctx.accounts.forge_config;

        config.access.ensure_live()?;
        ensure_provider(ctx.accounts.provider_role.active)?;
        ensure_current(batch_id, config.current_batch_id)?;

        let event = ctx.accounts.batch_account.batch.close(provider, now)?;
        msg!("Batch {} closed by {}", batch_id, provider);
        emit!(event);
        Ok(())
    }

    /// Submit three encrypted components (as coprocessor handles) for the
    /// current batch. They are folded into one score.
    pub fn submit_encrypted_components(
        ctx: Context<SubmitEncryptedComponents>,
        batch_id: u64,
        components: [[u8; 32]; COMPONENTS_PER_SUBMISSION],
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let participant = ctx.accounts.participant.key();
        let config = &ctx.accounts.forge_config;

        config.access.ensure_live()?;
        ctx.accounts.activity.cooldown.check(now, config.access.cooldown_seconds)?;
        ensure_current(batch_id, config.current_batch_id)?;

        let batch = &mut ctx.accounts.batch_account.batch;
        batch.ensure_accepting(&participant, MAX_BATCH_SIZE)?;
        let score = seal_score(&HandleEngine, &components.map(CiphertextHandle::from))?;
        batch.record(participant, score, now);
        stamp_activity(&mut ctx.accounts.activity, ctx.bumps.activity, now);

        msg!("Submission accepted in batch {} from {}", batch_id, participant);
        emit!(SubmissionAccepted {
            submitter: participant,
            batch_id,
            handle: score.to_bytes(),
        });
        Ok(())
    }

    /// Coprocessor publishes the Mxe ciphertext materialised for a handle.
    pub fn post_sealed_value(
        ctx: Context<PostSealedValue>,
        handle: [u8; 32],
        ciphertext: [u8; 32],
        nonce: u128,
    ) -> Result<()> {
        let slot = &mut ctx.accounts.sealed_slot;
        slot.handle = handle;
        slot.ciphertext = ciphertext;
        slot.nonce = nonce;
        slot.bump = ctx.bumps.sealed_slot;

        msg!("Sealed value posted for handle {:?}", &handle[..8]);
        emit!(SealedValuePosted {
            handle,
            coprocessor: ctx.accounts.coprocessor.key(),
        });
        Ok(())
    }

    /// Ask the MXE cluster to reveal the average of a closed batch. The
    /// computation offset doubles as the request id.
    pub fn request_decryption(
        ctx: Context<RequestDecryption>,
        computation_offset: u64,
        batch_id: u64,
        aggregate_handle: [u8; 32],
    ) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let requester = ctx.accounts.requester.key();
        let config = &ctx.accounts.forge_config;

        config.access.ensure_live()?;
        ctx.accounts.activity.cooldown.check(now, config.access.cooldown_seconds)?;
        ensure_current(batch_id, config.current_batch_id)?;

        let batch = &ctx.accounts.batch_account.batch;
        batch.ensure_closed()?;
        let average = aggregate(&HandleEngine, batch);
        require!(
            average.ciphertext.to_bytes() == aggregate_handle,
            ErrorCode::SealedValueMismatch
        );
        let state_hash = binding_digest(&crate::ID, &[average.ciphertext]);

        let (context, event) = DecryptionContext::pending(computation_offset, batch_id, state_hash, requester, now);
        ctx.accounts.decryption_record.context = context;
        ctx.accounts.decryption_record.bump = ctx.bumps.decryption_record;
        ctx.accounts.sign_pda_account.bump = ctx.bumps.sign_pda_account;

        // Take keys up front; queue_computation borrows the accounts mutably
        let record_key = ctx.accounts.decryption_record.key();
        let batch_key = ctx.accounts.batch_account.key();
        let slot_key = ctx.accounts.sealed_slot.key();

        let args = ArgBuilder::new()
            .plaintext_u128(ctx.accounts.sealed_slot.nonce)
            .account(
                slot_key,
                SealedSlot::CIPHERTEXT_OFFSET,
                SealedSlot::CIPHERTEXT_SIZE,
            )
            .build();

        queue_computation(
            ctx.accounts,
            computation_offset,
            args,
            vec![RevealAggregateCallback::callback_ix(
                computation_offset,
                &ctx.accounts.mxe_account,
                &[
                    CallbackAccount {
                        pubkey: record_key,
                        is_writable: true,
                    },
                    CallbackAccount {
                        pubkey: batch_key,
                        is_writable: false,
                    },
                ],
            )?],
            1,
            0, // cu_price_micro
        )?;
        stamp_activity(&mut ctx.accounts.activity, ctx.bumps.activity, now);

        msg!(
            "Decryption {} requested for batch {} ({} scores folded)",
            computation_offset,
            batch_id,
            average.folded
        );
        emit!(event);
        Ok(())
    }

    /// Callback from the MXE cluster with the revealed average. Not gated by
    /// pause so in-flight requests can still settle.
    #[arcium_callback(encrypted_ix = "reveal_aggregate")]
    pub fn reveal_aggregate_callback(
        ctx: Context<RevealAggregateCallback>,
        output: SignedComputationOutputs<RevealAggregateOutput>,
    ) -> Result<()> {
        let verdict = ClusterVerdict(
            output
                .verify_output(&ctx.accounts.cluster_account, &ctx.accounts.computation_account)
                .ok()
                .map(|RevealAggregateOutput { field_0 }| field_0),
        );

        let batch = &ctx.accounts.batch_account.batch;
        let record = &mut ctx.accounts.decryption_record;
        require!(batch.id == record.context.batch_id, ErrorCode::InvalidRequest);

        let recomputed = binding_digest(&crate::ID, &[aggregate(&HandleEngine, batch).ciphertext]);
        let cleartext = verdict.0.unwrap_or_default().to_le_bytes();
        let event = record.context.settle(&recomputed, &verdict, &cleartext, &[])?;

        msg!("Decryption {} resolved for batch {}", event.request_id, event.batch_id);
        emit!(event);
        Ok(())
    }
}

fn stamp_activity(activity: &mut ActivityRecord, bump: u8, now: i64) {
    activity.cooldown.stamp(now);
    activity.bump = bump;
}

/// Output of the cluster signature check. The signature covers the whole
/// computation output, so the cleartext is accepted iff it is what the
/// cluster signed.
struct ClusterVerdict(Option<u64>);

impl ProofVerifier for ClusterVerdict {
    fn verify_proof(&self, _request_id: u64, cleartext: &[u8], _proof: &[u8]) -> bool {
        self.0.is_some_and(|value| value.to_le_bytes() == cleartext)
    }
}

// ============= Account Structs =============

#[account]
pub struct ForgeConfig {
    pub access: AccessControl,
    pub current_batch_id: u64,
    pub coprocessor: Pubkey,
    pub bump: u8,
}

#[account]
pub struct ProviderRole {
    pub account: Pubkey,
    pub active: bool,
    pub bump: u8,
}

#[account]
pub struct ActivityRecord {
    pub cooldown: Cooldown,
    pub bump: u8,
}

#[account]
pub struct BatchAccount {
    pub batch: Batch<CiphertextHandle>,
    pub bump: u8,
}

/// Mxe ciphertext behind a coprocessor handle.
#[account]
pub struct SealedSlot {
    pub handle: [u8; 32],
    pub ciphertext: [u8; 32],
    pub nonce: u128,
    pub bump: u8,
}

#[account]
pub struct DecryptionRecord {
    pub context: DecryptionContext,
    pub bump: u8,
}

impl ForgeConfig {
    pub const SPACE: usize = 8 + AccessControl::SPACE + 8 + 32 + 1;
}

impl ProviderRole {
    pub const SPACE: usize = 8 + 32 + 1 + 1;
}

impl ActivityRecord {
    pub const SPACE: usize = 8 + Cooldown::SPACE + 1;
}

// Space: 8 (discriminator) + batch header and MAX_BATCH_SIZE submissions + 1 (bump)
impl BatchAccount {
    pub const SPACE: usize = 8 + Batch::<CiphertextHandle>::space(MAX_BATCH_SIZE as usize, CiphertextHandle::SPACE) + 1;
}

impl SealedSlot {
    pub const SPACE: usize = 8 + 32 + 32 + 16 + 1;
    pub const CIPHERTEXT_OFFSET: u32 = 8 + 32;
    pub const CIPHERTEXT_SIZE: u32 = 32;
}

impl DecryptionRecord {
    pub const SPACE: usize = 8 + DecryptionContext::SPACE + 1;
}

// ============= Context Structs =============

#[derive(Accounts)]
pub struct InitializeForge<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,
    #[account(
        init,
        payer = owner,
        space = ForgeConfig::SPACE,
        seeds = [FORGE_SEED],
        bump,
    )]
    pub forge_config: Account<'info, ForgeConfig>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Administer<'info> {
    pub owner: Signer<'info>,
    #[account(
        mut,
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Account<'info, ForgeConfig>,
}

#[derive(Accounts)]
#[instruction(account: Pubkey)]
pub struct AddProvider<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,
    #[account(
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Account<'info, ForgeConfig>,
    #[account(
        init_if_needed,
        payer = owner,
        space = ProviderRole::SPACE,
        seeds = [PROVIDER_SEED, account.as_ref()],
        bump,
    )]
    pub provider_role: Account<'info, ProviderRole>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(account: Pubkey)]
pub struct RemoveProvider<'info> {
    pub owner: Signer<'info>,
    #[account(
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Account<'info, ForgeConfig>,
    #[account(
        mut,
        seeds = [PROVIDER_SEED, account.as_ref()],
        bump = provider_role.bump,
    )]
    pub provider_role: Account<'info, ProviderRole>,
}

#[derive(Accounts)]
#[instruction(batch_id: u64)]
pub struct OpenBatch<'info> {
    #[account(mut)]
    pub provider: Signer<'info>,
    #[account(
        mut,
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Box<Account<'info, ForgeConfig>>,
    #[account(
        seeds = [PROVIDER_SEED, provider.key().as_ref()],
        bump = provider_role.bump,
    )]
    pub provider_role: Account<'info, ProviderRole>,
    #[account(
        init_if_needed,
        payer = provider,
        space = ActivityRecord::SPACE,
        seeds = [ACTIVITY_SEED, provider.key().as_ref()],
        bump,
    )]
    pub activity: Account<'info, ActivityRecord>,
    #[account(
        init,
        payer = provider,
        space = BatchAccount::SPACE,
        seeds = [BATCH_SEED, batch_id.to_le_bytes().as_ref()],
        bump,
    )]
    pub batch_account: Box<Account<'info, BatchAccount>>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(batch_id: u64)]
pub struct CloseBatch<'info> {
    pub provider: Signer<'info>,
    #[account(
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Box<Account<'info, ForgeConfig>>,
    #[account(
        seeds = [PROVIDER_SEED, provider.key().as_ref()],
        bump = provider_role.bump,
    )]
    pub provider_role: Account<'info, ProviderRole>,
    #[account(
        mut,
        seeds = [BATCH_SEED, batch_id.to_le_bytes().as_ref()],
        bump = batch_account.bump,
    )]
    pub batch_account: Box<Account<'info, BatchAccount>>,
}

#[derive(Accounts)]
#[instruction(batch_id: u64)]
pub struct SubmitEncryptedComponents<'info> {
    #[account(mut)]
    pub participant: Signer<'info>,
    #[account(
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Box<Account<'info, ForgeConfig>>,
    #[account(
        init_if_needed,
        payer = participant,
        space = ActivityRecord::SPACE,
        seeds = [ACTIVITY_SEED, participant.key().as_ref()],
        bump,
    )]
    pub activity: Account<'info, ActivityRecord>,
    #[account(
        mut,
        seeds = [BATCH_SEED, batch_id.to_le_bytes().as_ref()],
        bump = batch_account.bump,
    )]
    pub batch_account: Box<Account<'info, BatchAccount>>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(handle: [u8; 32])]
pub struct PostSealedValue<'info> {
    #[account(mut)]
    pub coprocessor: Signer<'info>,
    #[account(
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
        constraint = forge_config.coprocessor == coprocessor.key() @ ErrorCode::NotCoprocessor,
    )]
    pub forge_config: Account<'info, ForgeConfig>,
    #[account(
        init,
        payer = coprocessor,
        space = SealedSlot::SPACE,
        seeds = [SEALED_SEED, handle.as_ref()],
        bump,
    )]
    pub sealed_slot: Account<'info, SealedSlot>,
    pub system_program: Program<'info, System>,
}

#[queue_computation_accounts("reveal_aggregate", requester)]
#[derive(Accounts)]
#[instruction(computation_offset: u64, batch_id: u64, aggregate_handle: [u8; 32])]
pub struct RequestDecryption<'info> {
    #[account(mut)]
    pub requester: Signer<'info>,

    #[account(
        seeds = [FORGE_SEED],
        bump = forge_config.bump,
    )]
    pub forge_config: Box<Account<'info, ForgeConfig>>,

    #[account(
        init_if_needed,
        payer = requester,
        space = ActivityRecord::SPACE,
        seeds = [ACTIVITY_SEED, requester.key().as_ref()],
        bump,
    )]
    pub activity: Box<Account<'info, ActivityRecord>>,

    #[account(
        seeds = [BATCH_SEED, batch_id.to_le_bytes().as_ref()],
        bump = batch_account.bump,
    )]
    pub batch_account: Box<Account<'info, BatchAccount>>,

    #[account(
        seeds = [SEALED_SEED, aggregate_handle.as_ref()],
        bump = sealed_slot.bump,
    )]
    pub sealed_slot: Box<Account<'info, SealedSlot>>,

    #[account(
        init,
        payer = requester,
        space = DecryptionRecord::SPACE,
        seeds = [DECRYPTION_SEED, computation_offset.to_le_bytes().as_ref()],
        bump,
    )]
    pub decryption_record: Box<Account<'info, DecryptionRecord>>,

    #[account(
        init_if_needed,
        space = 9,
        payer = requester,
        seeds = [b"ArciumSignerAccount"],
        bump,
        address = derive_sign_pda!(),
    )]
    pub sign_pda_account: Account<'info, ArciumSignerAccount>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    #[account(mut, address = derive_mempool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: mempool_account, checked by the arcium program.
    pub mempool_account: UncheckedAccount<'info>,

    #[account(mut, address = derive_execpool_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: executing_pool, checked by the arcium program.
    pub executing_pool: UncheckedAccount<'info>,

    #[account(mut, address = derive_comp_pda!(computation_offset, mxe_account, ErrorCode::ClusterNotSet))]
    /// CHECK: computation_account, checked by the arcium program.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_AGGREGATE))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(mut, address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(mut, address = ARCIUM_FEE_POOL_ACCOUNT_ADDRESS)]
    pub pool_account: Box<Account<'info, FeePool>>,

    #[account(mut, address = ARCIUM_CLOCK_ACCOUNT_ADDRESS)]
    pub clock_account: Box<Account<'info, ClockAccount>>,

    pub system_program: Program<'info, System>,
    pub arcium_program: Program<'info, Arcium>,
}

#[callback_accounts("reveal_aggregate")]
#[derive(Accounts)]
pub struct RevealAggregateCallback<'info> {
    pub arcium_program: Program<'info, Arcium>,

    #[account(address = derive_comp_def_pda!(COMP_DEF_OFFSET_REVEAL_AGGREGATE))]
    pub comp_def_account: Box<Account<'info, ComputationDefinitionAccount>>,

    #[account(address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,

    /// CHECK: computation_account, checked by arcium program via constraints in the callback context.
    pub computation_account: UncheckedAccount<'info>,

    #[account(address = derive_cluster_pda!(mxe_account, ErrorCode::ClusterNotSet))]
    pub cluster_account: Box<Account<'info, Cluster>>,

    #[account(address = ::anchor_lang::solana_program::sysvar::instructions::ID)]
    /// CHECK: instructions_sysvar, checked by the account constraint
    pub instructions_sysvar: AccountInfo<'info>,

    // Custom accounts passed via CallbackAccount
    #[account(mut)]
    pub decryption_record: Box<Account<'info, DecryptionRecord>>,

    pub batch_account: Box<Account<'info, BatchAccount>>,
}

#[init_computation_definition_accounts("reveal_aggregate", payer)]
#[derive(Accounts)]
pub struct InitRevealAggregateCompDef<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,
    #[account(mut, address = derive_mxe_pda!())]
    pub mxe_account: Box<Account<'info, MXEAccount>>,
    #[account(mut)]
    /// CHECK: comp_def_account, checked by arcium program.
    pub comp_def_account: UncheckedAccount<'info>,
    #[account(mut, address = derive_mxe_lut_pda!(mxe_account.lut_offset_slot))]
    /// CHECK: address_lookup_table, checked by arcium program.
    pub address_lookup_table: UncheckedAccount<'info>,
    #[account(address = LUT_PROGRAM_ID)]
    /// CHECK: lut_program is the Address Lookup Table program.
    pub lut_program: UncheckedAccount<'info>,
    pub arcium_program: Program<'info, Arcium>,
    pub system_program: Program<'info, System>,
}
