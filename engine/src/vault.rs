//! Share-vault arithmetic.
//!
//! Pure helpers over [`VaultAccount`] values; the engine stages the results
//! on a frame so a failed operation never reaches the backend. All math is
//! u128-widened and floor-divided.

use boxcars_types::craps::{VaultAccount, BASIS_POINTS_SCALE};

use crate::error::EngineError;

/// Shares minted for a deposit: proportional to current assets, or 1:1 when
/// the vault is empty.
pub fn shares_for_deposit(vault: &VaultAccount, amount: u64) -> Result<u64, EngineError> {
    if vault.total_shares == 0 || vault.total_assets == 0 {
        return Ok(amount);
    }
    let shares = (amount as u128)
        .checked_mul(vault.total_shares as u128)
        .map(|scaled| scaled / vault.total_assets as u128)
        .ok_or(EngineError::InvariantViolation("share mint overflow"))?;
    u64::try_from(shares).map_err(|_| EngineError::InvariantViolation("share mint overflow"))
}

/// Assets redeemed for burning shares, proportional to current assets.
pub fn assets_for_shares(vault: &VaultAccount, shares: u64) -> Result<u64, EngineError> {
    if vault.total_shares == 0 {
        return Err(EngineError::InvariantViolation("burn against empty vault"));
    }
    let amount = (shares as u128)
        .checked_mul(vault.total_assets as u128)
        .map(|scaled| scaled / vault.total_shares as u128)
        .ok_or(EngineError::InvariantViolation("share burn overflow"))?;
    u64::try_from(amount).map_err(|_| EngineError::InvariantViolation("share burn overflow"))
}

/// Basis-point fee on an amount, rounded down.
pub fn fee_for(amount: u64, fee_bps: u16) -> u64 {
    ((amount as u128) * (fee_bps as u128) / (BASIS_POINTS_SCALE as u128)) as u64
}
