//! Risk-based position sizing

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Whole shares for a trade risking `risk_per_trade` of `max_position_value`
///
/// Takes the smaller of the risk-limited and value-limited share counts,
/// floored, and at least one share when that minimum is positive. Returns
/// zero when the stop is not below the entry or either limit is zero.
pub fn calculate_position_size(
    entry_price: Decimal,
    stop_loss_price: Decimal,
    max_position_value: Decimal,
    risk_per_trade: Decimal,
) -> u64 {
    let risk_per_share = entry_price - stop_loss_price;
    if risk_per_share <= Decimal::ZERO || entry_price <= Decimal::ZERO {
        return 0;
    }

    let by_risk = max_position_value * risk_per_trade / risk_per_share;
    let by_value = max_position_value / entry_price;
    let shares = by_risk.min(by_value);
    if shares <= Decimal::ZERO {
        return 0;
    }

    shares.floor().to_u64().unwrap_or(0).max(1)
}
