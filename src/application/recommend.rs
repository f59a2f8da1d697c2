//! Recommendation use case: runs every enabled rule set over one market
//! snapshot and collects their suggestions.

use serde::Serialize;
use tracing::warn;

use crate::application::strategies::covered_calls::CoveredCallStrategy;
use crate::application::strategies::speculative::SpeculativeStrategy;
use crate::application::strategies::wheel::WheelStrategy;
use crate::domain::ports::strategy::{Recommendation, Strategy, StrategyContext};

#[derive(Debug, Serialize)]
pub struct RecommendationRun {
    pub strategies_run: usize,
    pub strategies_failed: usize,
    pub recommendations: Vec<Recommendation>,
}

pub struct RecommendUseCase {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for RecommendUseCase {
    fn default() -> Self {
        Self::new(vec![
            Box::new(CoveredCallStrategy),
            Box::new(WheelStrategy),
            Box::new(SpeculativeStrategy),
        ])
    }
}

impl RecommendUseCase {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Run enabled rule sets in registration order. Output keeps that order;
    /// a rule set that errors is logged and skipped.
    pub fn execute(&self, ctx: &StrategyContext<'_>) -> RecommendationRun {
        let mut recommendations = Vec::new();
        let mut run = 0usize;
        let mut failed = 0usize;

        for strategy in self.strategies.iter().filter(|s| s.enabled(ctx.config)) {
            run += 1;
            match strategy.recommend(ctx) {
                Ok(mut recs) => recommendations.append(&mut recs),
                Err(e) => {
                    failed += 1;
                    warn!(strategy = strategy.name(), error = %e, "strategy failed");
                }
            }
        }

        RecommendationRun {
            strategies_run: run - failed,
            strategies_failed: failed,
            recommendations,
        }
    }
}
