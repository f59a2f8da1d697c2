//! Covered-call income strategy.
//!
//! Sells calls a fixed percentage above the current price against shares
//! already held, one contract per hundred shares.

use crate::config::AdvisorConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::strategy::{
    round_cents, Recommendation, RecommendationAction, Strategy, StrategyContext, StrategyKind,
};
use crate::domain::values::indicators::{annualized_yield, estimate_premium, round_strike};
use crate::domain::values::option_type::OptionType;
use crate::domain::values::sizing::{contract_value, covered_call_capacity, MAX_SUGGESTED_CONTRACTS};

pub struct CoveredCallStrategy;

impl Strategy for CoveredCallStrategy {
    fn name(&self) -> &'static str {
        "covered_calls"
    }

    fn enabled(&self, config: &AdvisorConfig) -> bool {
        config.enable_covered_calls
    }

    fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<Recommendation>, DomainError> {
        let qty = covered_call_capacity(ctx.shares).min(MAX_SUGGESTED_CONTRACTS);
        if qty == 0 {
            return Ok(vec![]);
        }

        let mut out = Vec::new();
        for (expiration, chain) in ctx.chains {
            for otm in &ctx.config.covered_call_otm_pct {
                let strike = round_strike(ctx.price * (1.0 + otm));
                let premium = estimate_premium(chain, strike, OptionType::Call);
                if premium <= 0.0 {
                    continue;
                }

                let mut rec = Recommendation::new(
                    StrategyKind::CoveredCalls,
                    RecommendationAction::SellCoveredCall,
                    *expiration,
                    strike,
                    premium,
                    qty,
                    format!("Generate income ({:.1}% OTM, RSI {:.1})", otm * 100.0, ctx.rsi),
                );
                rec.total_premium = Some(round_cents(contract_value(premium, qty)));
                rec.annualized_yield_pct = Some(round_cents(annualized_yield(
                    premium,
                    ctx.price,
                    *expiration,
                    ctx.today,
                )));
                out.push(rec);
            }
        }
        Ok(out)
    }
}
