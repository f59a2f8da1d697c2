//! Technical indicators and closed-form option helpers.
//!
//! Series functions return one slot per input close, `None` where the
//! lookback window is not yet full.

use chrono::NaiveDate;

use crate::domain::entities::market::OptionChain;
use crate::domain::values::option_type::OptionType;

pub const DEFAULT_MA_WINDOW: usize = 50;
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Price/earnings multiple assumed by [`project_yield`].
pub const PROJECTION_PE_RATIO: f64 = 300.0;

/// Rolling simple moving average.
pub fn moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }
    (0..closes.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &closes[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Relative Strength Index using simple rolling means of gains and losses.
///
/// A window with no losses reads 100; a window with no movement at all
/// reads 50.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    for (i, slot) in out.iter_mut().enumerate().skip(period) {
        let window = &deltas[i - period..i];
        let gain = window.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
        let loss = -window.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

        *slot = Some(if loss == 0.0 {
            if gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        });
    }
    out
}

/// Last defined value of a series.
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}

/// Last traded price of the contract whose strike is nearest to `strike`.
/// The first row wins on ties; an empty side yields 0.
pub fn estimate_premium(chain: &OptionChain, strike: f64, option_type: OptionType) -> f64 {
    let mut best: Option<(f64, f64)> = None;
    for q in chain.side(option_type) {
        let dist = (q.strike - strike).abs();
        match best {
            Some((d, _)) if d <= dist => {}
            _ => best = Some((dist, q.last_price)),
        }
    }
    best.map(|(_, p)| p).unwrap_or(0.0)
}

/// Annualized percentage return implied by growing `base_eps` at
/// `eps_growth_rate` for `years` and pricing it at [`PROJECTION_PE_RATIO`].
pub fn project_yield(base_eps: f64, current_price: f64, eps_growth_rate: f64, years: u32) -> f64 {
    if current_price <= 0.0 || years == 0 {
        return 0.0;
    }
    let future_eps = base_eps * (1.0 + eps_growth_rate).powi(years as i32);
    let future_price = future_eps * PROJECTION_PE_RATIO;
    ((future_price - current_price) / current_price) * 100.0 / years as f64
}

/// Premium yield scaled to a 365-day year. Zero once the expiration has passed.
pub fn annualized_yield(premium: f64, base_price: f64, expiration: NaiveDate, today: NaiveDate) -> f64 {
    let days = (expiration - today).num_days();
    if days > 0 && base_price > 0.0 {
        (premium / base_price) * (365.0 / days as f64) * 100.0
    } else {
        0.0
    }
}

/// Weeks between `today` and `expiration`, fractional.
pub fn weeks_until(expiration: NaiveDate, today: NaiveDate) -> f64 {
    (expiration - today).num_days() as f64 / 7.0
}

/// Keep expirations whose distance from `today` lies in `[min_weeks, max_weeks]`.
pub fn filter_by_weeks<I>(expirations: I, min_weeks: f64, max_weeks: f64, today: NaiveDate) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    expirations
        .into_iter()
        .filter(|d| {
            let w = weeks_until(*d, today);
            min_weeks <= w && w <= max_weeks
        })
        .collect()
}

/// Signed distance from the money in percent; positive is OTM.
pub fn otm_pct(strike: f64, current_price: f64, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => (strike - current_price) / current_price * 100.0,
        OptionType::Put => (current_price - strike) / current_price * 100.0,
    }
}

/// One-line rationale shown next to each chain row.
pub fn option_rationale(strike: f64, current_price: f64, rsi: f64, option_type: OptionType) -> String {
    let pct = otm_pct(strike, current_price, option_type);
    match (option_type, pct >= 0.0) {
        (OptionType::Call, true) => format!("Generate income ({pct:.1}% OTM, RSI {rsi:.1})"),
        (OptionType::Call, false) => format!("ITM call ({pct:.1}% ITM, RSI {rsi:.1})"),
        (OptionType::Put, true) => format!("Wheel strategy ({pct:.1}% OTM, RSI {rsi:.1})"),
        (OptionType::Put, false) => format!("ITM put ({pct:.1}% ITM, RSI {rsi:.1})"),
    }
}

/// Whole-dollar strike, exact halves going to the even dollar.
pub fn round_strike(value: f64) -> f64 {
    value.round_ties_even()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::market::OptionQuote;

    fn chain() -> OptionChain {
        OptionChain {
            calls: vec![
                OptionQuote::new(200.0, 10.0),
                OptionQuote::new(210.0, 8.0),
                OptionQuote::new(220.0, 6.0),
                OptionQuote::new(230.0, 4.0),
            ],
            puts: vec![
                OptionQuote::new(200.0, 2.0),
                OptionQuote::new(210.0, 3.0),
                OptionQuote::new(220.0, 4.0),
            ],
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_moving_average_basic() {
        let closes: Vec<f64> = (100..200).map(|v| v as f64).collect();
        let ma = moving_average(&closes, 50);
        assert_eq!(ma.len(), 100);
        assert!(ma[..49].iter().all(|v| v.is_none()));
        assert!(ma[49..].iter().all(|v| v.is_some()));
        assert!((ma[49].unwrap() - 124.5).abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_custom_window() {
        let closes: Vec<f64> = (1..=30).map(|v| v as f64).collect();
        let ma = moving_average(&closes, 10);
        assert!(ma[..9].iter().all(|v| v.is_none()));
        assert_eq!(ma[9], Some(5.5));
        assert_eq!(latest(&ma), Some(25.5));
    }

    #[test]
    fn test_rsi_rising_and_falling() {
        let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let falling: Vec<f64> = (0..30).map(|i| 200.0 - i as f64 * 2.0).collect();
        assert!(latest(&rsi(&rising, 14)).unwrap() > 50.0);
        assert!(latest(&rsi(&falling, 14)).unwrap() < 50.0);
    }

    #[test]
    fn test_rsi_bounded() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64).sin() * 10.0).collect();
        let series = rsi(&closes, 14);
        assert!(series[..14].iter().all(|v| v.is_none()));
        for v in series.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let closes = vec![100.0; 20];
        assert_eq!(latest(&rsi(&closes, 14)), Some(50.0));
    }

    #[test]
    fn test_rsi_short_series() {
        assert!(latest(&rsi(&[1.0, 2.0, 3.0], 14)).is_none());
    }

    #[test]
    fn test_estimate_premium_exact_and_nearest() {
        let c = chain();
        assert_eq!(estimate_premium(&c, 210.0, OptionType::Call), 8.0);
        assert_eq!(estimate_premium(&c, 213.0, OptionType::Call), 8.0);
        // tie between 210 and 220: first row wins
        assert_eq!(estimate_premium(&c, 215.0, OptionType::Call), 8.0);
        assert_eq!(estimate_premium(&c, 210.0, OptionType::Put), 3.0);
    }

    #[test]
    fn test_estimate_premium_empty() {
        assert_eq!(estimate_premium(&OptionChain::default(), 210.0, OptionType::Call), 0.0);
    }

    #[test]
    fn test_project_yield() {
        let y5 = project_yield(1.64, 200.0, 0.33, 5);
        assert!(y5 > 0.0);
        let future = 1.64 * 1.33f64.powi(5) * 300.0;
        assert!((y5 - (future - 200.0) / 200.0 * 100.0 / 5.0).abs() < 1e-9);
        assert!(project_yield(1.64, 200.0, 0.5, 5) > project_yield(1.64, 200.0, 0.1, 5));
        assert_eq!(project_yield(1.64, 0.0, 0.33, 5), 0.0);
    }

    #[test]
    fn test_annualized_yield() {
        let today = d(2026, 1, 1);
        let y = annualized_yield(5.0, 200.0, d(2026, 1, 31), today);
        assert!((y - 5.0 / 200.0 * 365.0 / 30.0 * 100.0).abs() < 1e-9);
        assert_eq!(annualized_yield(5.0, 200.0, today, today), 0.0);
    }

    #[test]
    fn test_filter_by_weeks() {
        let today = d(2026, 1, 1);
        let exps = vec![d(2026, 1, 9), d(2026, 1, 15), d(2026, 1, 29), d(2026, 2, 20)];
        let kept = filter_by_weeks(exps, 2.0, 4.0, today);
        assert_eq!(kept, vec![d(2026, 1, 15), d(2026, 1, 29)]);
    }

    #[test]
    fn test_option_rationale() {
        assert_eq!(
            option_rationale(210.0, 200.0, 55.3, OptionType::Call),
            "Generate income (5.0% OTM, RSI 55.3)"
        );
        assert!(option_rationale(190.0, 200.0, 40.0, OptionType::Call).starts_with("ITM call"));
        assert_eq!(
            option_rationale(190.0, 200.0, 40.0, OptionType::Put),
            "Wheel strategy (5.0% OTM, RSI 40.0)"
        );
        assert!(option_rationale(210.0, 200.0, 40.0, OptionType::Put).starts_with("ITM put"));
    }

    #[test]
    fn test_round_strike_half_to_even() {
        assert_eq!(round_strike(202.5), 202.0);
        assert_eq!(round_strike(203.5), 204.0);
        assert_eq!(round_strike(262.5), 262.0);
        assert_eq!(round_strike(202.6), 203.0);
        assert_eq!(round_strike(210.0), 210.0);
    }
}
