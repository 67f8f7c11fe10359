//! Cause derivation
//!
//! Pure conversion from raw registry records to display-ready views, and the
//! single place in the backend that crosses the wei/ETH unit boundary. No
//! other layer re-derives amounts or percentages.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::warn;

use crate::models::cause::{CauseRecord, CauseView};

/// Wei per ETH
const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// ETH decimal places
const ETH_SCALE: u32 = 18;

/// Convert a wei amount to ETH.
///
/// Values beyond Decimal's 96-bit mantissa fall back to whole-ETH precision
/// rather than failing; registry amounts never get near that in practice.
pub fn wei_to_eth(wei: U256) -> Decimal {
    let wei = u128::try_from(wei).unwrap_or(u128::MAX);
    match i128::try_from(wei) {
        Ok(v) => Decimal::try_from_i128_with_scale(v, ETH_SCALE)
            .unwrap_or_else(|_| whole_eth(wei)),
        Err(_) => whole_eth(wei),
    }
}

fn whole_eth(wei: u128) -> Decimal {
    let eth = wei / WEI_PER_ETH;
    Decimal::try_from_i128_with_scale(eth as i128, 0).unwrap_or(Decimal::MAX)
}

/// Convert an ETH amount to wei, truncating below-wei precision.
///
/// Rejects negative amounts and amounts too large to represent.
pub fn eth_to_wei(eth: Decimal) -> Result<U256, String> {
    if eth.is_sign_negative() {
        return Err("amount must not be negative".to_string());
    }
    let wei = eth
        .checked_mul(dec!(1_000_000_000_000_000_000))
        .ok_or_else(|| "amount too large".to_string())?
        .trunc()
        .normalize();
    U256::from_str_radix(&wei.to_string(), 10).map_err(|e| e.to_string())
}

/// Funding percentage: round(raised / goal * 100), half away from zero.
///
/// A zero goal counts as fully funded (avoids division by zero); no upper
/// clamp, so an over-funded cause reports more than 100. Ratios too large
/// for Decimal saturate to `u64::MAX` instead of panicking.
pub fn funded_percentage(goal_eth: Decimal, raised_eth: Decimal) -> u64 {
    if goal_eth > Decimal::ZERO {
        raised_eth
            .checked_div(goal_eth)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .and_then(|pct| {
                pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_u64()
            })
            .unwrap_or(u64::MAX)
    } else {
        100
    }
}

/// Derive the display view for one raw record.
///
/// Returns `None` for records with id 0, which is how registry slots that
/// were never populated read back.
pub fn derive_view(record: &CauseRecord) -> Option<CauseView> {
    if record.id == 0 {
        warn!("Skipping cause record with invalid id 0");
        return None;
    }

    let goal_eth = wei_to_eth(record.goal);
    let raised_eth = wei_to_eth(record.raised);

    Some(CauseView {
        id: record.id,
        name: record.name.clone(),
        description: record.description.clone(),
        long_description: record.long_description.clone(),
        image_src: record.image_src.clone(),
        category: record.category.clone(),
        website: record.website.clone(),
        goal_eth,
        raised_eth,
        donors_count: record.donors_count,
        wallet_address: record.wallet_address.clone(),
        is_active: record.is_active,
        featured: record.featured,
        funded_percentage: funded_percentage(goal_eth, raised_eth),
    })
}
