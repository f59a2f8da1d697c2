//! Wheel strategy.
//!
//! Phase 1 sells cash-secured puts below the market. Phase 2 shows the
//! covered call that would follow an assignment, 5% above the put strike.

use crate::config::AdvisorConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::strategy::{
    round_cents, Recommendation, RecommendationAction, Strategy, StrategyContext, StrategyKind,
};
use crate::domain::values::indicators::{annualized_yield, estimate_premium, round_strike};
use crate::domain::values::option_type::OptionType;
use crate::domain::values::sizing::{contract_value, secured_put_capacity, MAX_SUGGESTED_CONTRACTS};

/// Call strike after assignment, relative to the put strike.
const ASSIGNED_CALL_MARKUP: f64 = 1.05;

pub struct WheelStrategy;

impl Strategy for WheelStrategy {
    fn name(&self) -> &'static str {
        "wheel"
    }

    fn enabled(&self, config: &AdvisorConfig) -> bool {
        config.enable_wheel_strategy
    }

    fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<Recommendation>, DomainError> {
        let mut out = Vec::new();

        for (expiration, chain) in ctx.chains {
            for otm in &ctx.config.wheel_put_otm_pct {
                let put_strike = round_strike(ctx.price * (1.0 - otm));
                let put_premium = estimate_premium(chain, put_strike, OptionType::Put);
                if put_premium <= 0.0 {
                    continue;
                }

                let max_contracts =
                    secured_put_capacity(ctx.cash, put_strike, ctx.config.wheel_min_cash_ratio);
                if max_contracts == 0 {
                    continue;
                }
                let qty = max_contracts.min(MAX_SUGGESTED_CONTRACTS);
                let put_total = contract_value(put_premium, qty);
                let assignment_cost = contract_value(put_strike, qty);

                let mut put = Recommendation::new(
                    StrategyKind::Wheel,
                    RecommendationAction::SellCashSecuredPut,
                    *expiration,
                    put_strike,
                    put_premium,
                    qty,
                    format!(
                        "Phase 1: Collect premium, acquire shares at {put_strike} if assigned \
                         ({:.1}% below current, RSI {:.1})",
                        otm * 100.0,
                        ctx.rsi
                    ),
                );
                put.total_premium = Some(round_cents(put_total));
                put.required_cash = Some(round_cents(assignment_cost));
                put.break_even_price = Some(round_cents(put_strike - put_premium));
                put.annualized_yield_pct = Some(round_cents(annualized_yield(
                    put_premium,
                    ctx.price,
                    *expiration,
                    ctx.today,
                )));
                out.push(put);

                let call_strike = round_strike(put_strike * ASSIGNED_CALL_MARKUP);
                let call_premium = estimate_premium(chain, call_strike, OptionType::Call);
                if call_premium <= 0.0 {
                    continue;
                }
                let call_total = contract_value(call_premium, qty);
                let wheel_income = put_total + call_total;

                let mut call = Recommendation::new(
                    StrategyKind::Wheel,
                    RecommendationAction::SellCoveredCallAfterAssignment,
                    *expiration,
                    call_strike,
                    call_premium,
                    qty,
                    format!(
                        "Phase 2: After assignment at {put_strike}, sell CC at {call_strike} \
                         for additional income"
                    ),
                );
                call.total_premium = Some(round_cents(call_total));
                call.annualized_yield_pct = Some(round_cents(annualized_yield(
                    call_premium,
                    put_strike,
                    *expiration,
                    ctx.today,
                )));
                call.total_wheel_income = Some(round_cents(wheel_income));
                call.total_wheel_yield_pct = Some(round_cents(if assignment_cost > 0.0 {
                    wheel_income / assignment_cost * 100.0
                } else {
                    0.0
                }));
                out.push(call);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::market::{OptionChain, OptionQuote};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn chains() -> BTreeMap<NaiveDate, OptionChain> {
        BTreeMap::from([(
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            OptionChain {
                calls: vec![
                    OptionQuote::new(190.0, 12.0),
                    OptionQuote::new(200.0, 10.0),
                    OptionQuote::new(210.0, 8.0),
                ],
                puts: vec![
                    OptionQuote::new(180.0, 2.0),
                    OptionQuote::new(190.0, 3.0),
                    OptionQuote::new(200.0, 4.0),
                ],
            },
        )])
    }

    fn ctx<'a>(
        chains: &'a BTreeMap<NaiveDate, OptionChain>,
        config: &'a AdvisorConfig,
        cash: f64,
    ) -> StrategyContext<'a> {
        StrategyContext {
            price: 200.0,
            rsi: 45.0,
            ma50: 195.0,
            chains,
            shares: 0,
            cash,
            portfolio_value: cash,
            today: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            config,
        }
    }

    #[test]
    fn test_put_and_follow_up_call() {
        let chains = chains();
        let config = AdvisorConfig {
            wheel_put_otm_pct: vec![0.05],
            ..AdvisorConfig::default()
        };
        let recs = WheelStrategy.recommend(&ctx(&chains, &config, 50_000.0)).unwrap();
        assert_eq!(recs.len(), 2);

        let put = &recs[0];
        assert_eq!(put.action, RecommendationAction::SellCashSecuredPut);
        assert_eq!(put.strike, 190.0);
        assert_eq!(put.premium, 3.0);
        // 50,000 / (190 * 100 * 1.1) = 2.39
        assert_eq!(put.qty, 2);
        assert_eq!(put.required_cash, Some(38_000.0));
        assert_eq!(put.break_even_price, Some(187.0));

        let call = &recs[1];
        assert_eq!(call.action, RecommendationAction::SellCoveredCallAfterAssignment);
        // round(190 * 1.05) lands on the 200 call
        assert_eq!(call.premium, 10.0);
        assert_eq!(call.qty, 2);
        assert_eq!(call.total_wheel_income, Some(600.0 + 2_000.0));
        assert_eq!(call.total_wheel_yield_pct, Some(round_cents(2_600.0 / 38_000.0 * 100.0)));
    }

    #[test]
    fn test_half_dollar_strikes_round_to_even() {
        let chains = BTreeMap::from([(
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            OptionChain {
                calls: vec![OptionQuote::new(136.0, 2.5), OptionQuote::new(137.0, 2.0)],
                puts: vec![OptionQuote::new(130.0, 1.5)],
            },
        )]);
        let config = AdvisorConfig {
            wheel_put_otm_pct: vec![0.48],
            ..AdvisorConfig::default()
        };
        let mut c = ctx(&chains, &config, 50_000.0);
        c.price = 250.0;
        let recs = WheelStrategy.recommend(&c).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].strike, 130.0);
        // 130 * 1.05 = 136.5
        assert_eq!(recs[1].strike, 136.0);
        assert_eq!(recs[1].premium, 2.5);
    }

    #[test]
    fn test_no_cash_no_puts() {
        let chains = chains();
        let config = AdvisorConfig::default();
        assert!(WheelStrategy.recommend(&ctx(&chains, &config, 0.0)).unwrap().is_empty());
        // below one contract of collateral at every offset
        assert!(WheelStrategy.recommend(&ctx(&chains, &config, 15_000.0)).unwrap().is_empty());
    }
}
