//! Position sizing for option contracts.
//!
//! Every contract covers [`CONTRACT_MULTIPLIER`] shares, so a premium quoted
//! per share costs a hundred times that per contract.

/// Shares per listed equity option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Display cap on suggested contract counts.
pub const MAX_SUGGESTED_CONTRACTS: u32 = 10;

/// Contracts affordable when risking `risk_tolerance` of `portfolio_value`
/// on premium alone.
pub fn risk_adjusted_qty(portfolio_value: f64, premium: f64, risk_tolerance: f64) -> u32 {
    if premium <= 0.0 {
        return 0;
    }
    let qty = (portfolio_value * risk_tolerance) / (premium * CONTRACT_MULTIPLIER);
    if qty.is_finite() && qty > 0.0 {
        qty.floor() as u32
    } else {
        0
    }
}

/// Cash-secured puts that `cash` can collateralize at `strike`, holding
/// `cash_ratio` times the assignment cost in reserve.
pub fn secured_put_capacity(cash: f64, strike: f64, cash_ratio: f64) -> u32 {
    let per_contract = strike * CONTRACT_MULTIPLIER * cash_ratio;
    if per_contract <= 0.0 || cash <= 0.0 {
        return 0;
    }
    (cash / per_contract).floor() as u32
}

/// Contracts of covered calls the share count supports.
pub fn covered_call_capacity(shares: u32) -> u32 {
    shares / CONTRACT_MULTIPLIER as u32
}

/// Dollar amount for `qty` contracts at a per-share `price`.
pub fn contract_value(price: f64, qty: u32) -> f64 {
    price * qty as f64 * CONTRACT_MULTIPLIER
}
