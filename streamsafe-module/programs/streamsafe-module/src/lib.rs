use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;

pub use errors::*;
pub use events::*;
pub use state::*;
pub use utils::*;

declare_id!("48m5anaQDxCWcLScDQwqoduoohCcmHkxZUosewNDRQHm");

#[program]
pub mod streamsafe_module {
    use super::*;

    // --- Protocol fees ---

    pub fn create_fee_vault(ctx: Context<CreateFeeVault>, fee_percentage: u64) -> Result<()> {
        instructions::vault::create_fee_vault(ctx, fee_percentage)
    }

    pub fn update_fee_percentage(
        ctx: Context<UpdateFeePercentage>,
        fee_percentage: u64,
    ) -> Result<()> {
        instructions::vault::update_fee_percentage(ctx, fee_percentage)
    }

    pub fn withdraw_fees(ctx: Context<WithdrawFees>) -> Result<()> {
        instructions::vault::withdraw_fees(ctx)
    }

    // --- Escrow vaults ---

    pub fn create_vault(
        ctx: Context<CreateVault>,
        token_kind: TokenKind,
        authority: Pubkey,
    ) -> Result<()> {
        instructions::vault::create_vault(ctx, token_kind, authority)
    }

    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::vault::deposit(ctx, amount)
    }

    pub fn withdraw_vault(ctx: Context<WithdrawVault>, amount: u64) -> Result<()> {
        instructions::vault::withdraw_vault(ctx, amount)
    }

    // --- Direct streams ---

    pub fn init_stream(
        ctx: Context<InitStream>,
        receiver: Pubkey,
        start_time: u64,
        end_time: u64,
        amount: u64,
        withdraw_limit: Option<u64>,
    ) -> Result<()> {
        instructions::stream::init_stream(ctx, receiver, start_time, end_time, amount, withdraw_limit)
    }

    pub fn withdraw_stream(ctx: Context<WithdrawStream>, amount: Option<u64>) -> Result<()> {
        instructions::stream::withdraw_stream(ctx, amount)
    }

    pub fn pause_stream(ctx: Context<PauseStream>) -> Result<()> {
        instructions::stream::pause_stream(ctx)
    }

    pub fn resume_stream(ctx: Context<ResumeStream>) -> Result<()> {
        instructions::stream::resume_stream(ctx)
    }

    pub fn cancel_stream(ctx: Context<CancelStream>) -> Result<()> {
        instructions::stream::cancel_stream(ctx)
    }

    pub fn instant_transfer(
        ctx: Context<InstantTransfer>,
        receiver: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::stream::instant_transfer(ctx, receiver, amount)
    }

    // --- Safe-guarded operations ---

    pub fn create_safe(ctx: Context<CreateSafe>, owners: Vec<Pubkey>, threshold: u8) -> Result<()> {
        instructions::safe::create_safe(ctx, owners, threshold)
    }

    pub fn propose_stream_operation(
        ctx: Context<ProposeStreamOperation>,
        operation: StreamOperation,
    ) -> Result<()> {
        instructions::safe::propose_stream_operation(ctx, operation)
    }

    pub fn approve_init_stream(
        ctx: Context<ApproveInitStream>,
        proposal_id: u64,
        expected_approvals: Option<u8>,
    ) -> Result<()> {
        instructions::safe::approve_init_stream(ctx, proposal_id, expected_approvals)
    }

    pub fn approve_pause_stream(
        ctx: Context<ApprovePauseStream>,
        proposal_id: u64,
        expected_approvals: Option<u8>,
    ) -> Result<()> {
        instructions::safe::approve_pause_stream(ctx, proposal_id, expected_approvals)
    }

    pub fn approve_resume_stream(
        ctx: Context<ApproveResumeStream>,
        proposal_id: u64,
        expected_approvals: Option<u8>,
    ) -> Result<()> {
        instructions::safe::approve_resume_stream(ctx, proposal_id, expected_approvals)
    }

    pub fn approve_cancel_stream(
        ctx: Context<ApproveCancelStream>,
        proposal_id: u64,
        expected_approvals: Option<u8>,
    ) -> Result<()> {
        instructions::safe::approve_cancel_stream(ctx, proposal_id, expected_approvals)
    }

    pub fn approve_instant_transfer(
        ctx: Context<ApproveInstantTransfer>,
        proposal_id: u64,
        expected_approvals: Option<u8>,
    ) -> Result<()> {
        instructions::safe::approve_instant_transfer(ctx, proposal_id, expected_approvals)
    }
}
