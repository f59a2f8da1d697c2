//! Directional speculation.
//!
//! Buys 5% OTM calls on a bullish trend (price above the 50-day average and
//! RSI above the bullish threshold) and 5% OTM puts on a dip (RSI below the
//! dip threshold). Size comes from the risk budget on total portfolio value.

use crate::config::AdvisorConfig;
use crate::domain::error::DomainError;
use crate::domain::ports::strategy::{
    round_cents, Recommendation, RecommendationAction, Strategy, StrategyContext, StrategyKind,
};
use crate::domain::values::indicators::{estimate_premium, project_yield, round_strike};
use crate::domain::values::option_type::OptionType;
use crate::domain::values::sizing::{risk_adjusted_qty, CONTRACT_MULTIPLIER};

/// EPS growth rate behind the one-year projection quoted in call rationales.
pub const DEFAULT_EPS_GROWTH_RATE: f64 = 0.33;

const OTM_OFFSET: f64 = 0.05;
/// Move assumed when estimating profit, in either direction.
const TARGET_MOVE: f64 = 0.10;

pub struct SpeculativeStrategy;

impl SpeculativeStrategy {
    pub fn is_bullish(ctx: &StrategyContext<'_>) -> bool {
        ctx.price > ctx.ma50 && ctx.rsi > ctx.config.bullish_threshold
    }

    pub fn is_dip(ctx: &StrategyContext<'_>) -> bool {
        ctx.rsi < ctx.config.dip_threshold
    }

    fn buy_calls(ctx: &StrategyContext<'_>, out: &mut Vec<Recommendation>) {
        let strike = round_strike(ctx.price * (1.0 + OTM_OFFSET));
        let proj = project_yield(ctx.config.base_eps(), ctx.price, DEFAULT_EPS_GROWTH_RATE, 1);

        for (expiration, chain) in ctx.chains {
            let premium = estimate_premium(chain, strike, OptionType::Call);
            let qty = risk_adjusted_qty(ctx.portfolio_value, premium, ctx.config.risk_tolerance);
            if qty == 0 {
                continue;
            }
            let upside = (ctx.price * (1.0 + TARGET_MOVE) - strike - premium).max(0.0);
            let mut rec = Recommendation::new(
                StrategyKind::Speculative,
                RecommendationAction::BuyCall,
                *expiration,
                strike,
                premium,
                qty,
                format!(
                    "Bullish signal (RSI {:.2}); mid-term EPS growth to {proj:.2}% yield",
                    ctx.rsi
                ),
            );
            rec.proj_profit = Some(round_cents(qty as f64 * CONTRACT_MULTIPLIER * upside));
            out.push(rec);
        }
    }

    fn buy_puts(ctx: &StrategyContext<'_>, out: &mut Vec<Recommendation>) {
        let strike = round_strike(ctx.price * (1.0 - OTM_OFFSET));
        let long_term = match ctx.config.long_term_eps() {
            Some((year, eps)) => format!(", long-term EPS to ${eps:.2} by {year}"),
            None => String::new(),
        };

        for (expiration, chain) in ctx.chains {
            let premium = estimate_premium(chain, strike, OptionType::Put);
            let qty = risk_adjusted_qty(ctx.portfolio_value, premium, ctx.config.risk_tolerance);
            if qty == 0 {
                continue;
            }
            let downside = (strike - ctx.price * (1.0 - TARGET_MOVE) - premium).max(0.0);
            let mut rec = Recommendation::new(
                StrategyKind::Speculative,
                RecommendationAction::BuyPut,
                *expiration,
                strike,
                premium,
                qty,
                format!(
                    "Dip detected (RSI {:.2}); hedge for current volatility{long_term}",
                    ctx.rsi
                ),
            );
            rec.proj_profit = Some(round_cents(qty as f64 * CONTRACT_MULTIPLIER * downside));
            out.push(rec);
        }
    }
}

impl Strategy for SpeculativeStrategy {
    fn name(&self) -> &'static str {
        "speculative"
    }

    fn enabled(&self, config: &AdvisorConfig) -> bool {
        config.enable_speculative
    }

    fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<Recommendation>, DomainError> {
        let mut out = Vec::new();
        if Self::is_bullish(ctx) {
            Self::buy_calls(ctx, &mut out);
        }
        if Self::is_dip(ctx) {
            Self::buy_puts(ctx, &mut out);
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
                calls: vec![OptionQuote::new(200.0, 10.0), OptionQuote::new(210.0, 8.0)],
                puts: vec![OptionQuote::new(190.0, 3.0), OptionQuote::new(200.0, 4.0)],
            },
        )])
    }

    fn ctx<'a>(
        chains: &'a BTreeMap<NaiveDate, OptionChain>,
        config: &'a AdvisorConfig,
        rsi: f64,
        ma50: f64,
    ) -> StrategyContext<'a> {
        StrategyContext {
            price: 200.0,
            rsi,
            ma50,
            chains,
            shares: 500,
            cash: 0.0,
            portfolio_value: 100_000.0,
            today: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            config,
        }
    }

    #[test]
    fn test_bullish_buys_calls() {
        let chains = chains();
        let config = AdvisorConfig::default();
        let recs = SpeculativeStrategy.recommend(&ctx(&chains, &config, 60.0, 180.0)).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.action, RecommendationAction::BuyCall);
        assert_eq!(r.strike, 210.0);
        // 100,000 * 0.05 / 800 = 6.25
        assert_eq!(r.qty, 6);
        // 6 * 100 * (220 - 210 - 8)
        assert!((r.proj_profit.unwrap() - 1_200.0).abs() < 0.01);
        assert!(r.rationale.starts_with("Bullish signal (RSI 60.00)"));
    }

    #[test]
    fn test_half_dollar_call_strike_rounds_to_even() {
        let chains = BTreeMap::from([(
            NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            OptionChain {
                calls: vec![OptionQuote::new(262.0, 6.0), OptionQuote::new(263.0, 5.5)],
                puts: vec![],
            },
        )]);
        let config = AdvisorConfig::default();
        let mut c = ctx(&chains, &config, 70.0, 200.0);
        c.price = 250.0;
        let recs = SpeculativeStrategy.recommend(&c).unwrap();
        assert_eq!(recs.len(), 1);
        // 250 * 1.05 = 262.5
        assert_eq!(recs[0].strike, 262.0);
        assert_eq!(recs[0].premium, 6.0);
    }

    #[test]
    fn test_dip_buys_puts() {
        let chains = chains();
        let config = AdvisorConfig::default();
        let recs = SpeculativeStrategy.recommend(&ctx(&chains, &config, 25.0, 220.0)).unwrap();
        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert_eq!(r.action, RecommendationAction::BuyPut);
        assert_eq!(r.strategy, StrategyKind::Speculative);
        assert_eq!(r.strike, 190.0);
        assert_eq!(r.qty, 16);
        assert!(r.rationale.contains("long-term EPS to $11.24 by 2030"));
    }

    #[test]
    fn test_neutral_market_is_quiet() {
        let chains = chains();
        let config = AdvisorConfig::default();
        assert!(SpeculativeStrategy.recommend(&ctx(&chains, &config, 45.0, 180.0)).unwrap().is_empty());
        // above the average but RSI not bullish enough
        assert!(SpeculativeStrategy.recommend(&ctx(&chains, &config, 50.0, 180.0)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_qty_skipped() {
        let chains = chains();
        let config = AdvisorConfig::default();
        let mut c = ctx(&chains, &config, 60.0, 180.0);
        c.portfolio_value = 1_000.0;
        assert!(SpeculativeStrategy.recommend(&c).unwrap().is_empty());
    }
}
