//! Covered-call monitor.
//!
//! Watches one short call: distance to strike, current premium, unrealized
//! P/L against the original credit, and whether price or time to expiry
//! warrants an alert.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::application::market::current_price;
use crate::config::MonitorSettings;
use crate::domain::entities::market::OptionChain;
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataSource;
use crate::domain::ports::notifier::AlertNotifier;
use crate::domain::values::sizing::contract_value;

const NOT_AVAILABLE: &str = "N/A";

/// Calendar days until `expiration`; negative once it has passed.
pub fn days_to_expiration(expiration: NaiveDate, today: NaiveDate) -> i64 {
    (expiration - today).num_days()
}

/// Bid/ask/last for the watched contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PremiumQuote {
    pub bid: f64,
    pub ask: f64,
    pub last: f64,
    /// Midpoint when both sides quote, otherwise the last trade.
    pub mid: f64,
}

impl PremiumQuote {
    pub fn new(bid: f64, ask: f64, last: f64) -> Self {
        let mid = if bid > 0.0 && ask > 0.0 { (bid + ask) / 2.0 } else { last };
        Self { bid, ask, last, mid }
    }
}

/// The call row at exactly `strike`, with its volume and open interest.
pub fn find_call(chain: &OptionChain, strike: f64) -> Option<(PremiumQuote, Option<u64>, Option<u64>)> {
    chain
        .calls
        .iter()
        .find(|q| (q.strike - strike).abs() < 1e-9)
        .map(|q| (PremiumQuote::new(q.bid, q.ask, q.last_price), q.volume, q.open_interest))
}

/// Display strings for the position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallStatus {
    pub distance: String,
    pub premium: String,
    pub pnl: String,
}

pub fn calculate_status(settings: &MonitorSettings, price: f64, quote: Option<&PremiumQuote>) -> CallStatus {
    let Some(q) = quote else {
        return CallStatus {
            distance: NOT_AVAILABLE.into(),
            premium: NOT_AVAILABLE.into(),
            pnl: NOT_AVAILABLE.into(),
        };
    };

    let distance_pct = (settings.strike - price) / price * 100.0;
    let distance = if distance_pct > 0.0 {
        format!("{distance_pct:.2}% OTM")
    } else {
        format!("{:.2}% ITM", distance_pct.abs())
    };

    let pnl_per_share = settings.original_credit_per_share - q.mid;
    let pnl_total = contract_value(pnl_per_share, settings.contracts);

    CallStatus {
        distance,
        premium: format!("${:.2} (bid ${:.2} / ask ${:.2})", q.mid, q.bid, q.ask),
        pnl: format!(
            "${pnl_per_share:.2} per share | ${} total (unrealized)",
            group_thousands(pnl_total, 0)
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCheck {
    pub should_alert: bool,
    pub reasons: Vec<String>,
}

/// Alert when price is strictly above `price_threshold` or fewer than
/// `dte_threshold` days remain.
pub fn check_alert_conditions(price: f64, dte: i64, price_threshold: f64, dte_threshold: i64) -> AlertCheck {
    let mut reasons = Vec::new();
    if price > price_threshold {
        reasons.push(format!(
            "Stock price {} > {}",
            money(price),
            money(price_threshold)
        ));
    }
    if dte < dte_threshold {
        reasons.push(format!("Days to expiration ({dte}) < {dte_threshold}"));
    }
    AlertCheck {
        should_alert: !reasons.is_empty(),
        reasons,
    }
}

pub fn roll_advice(price: f64, strike: f64) -> &'static str {
    if price > strike * 0.95 {
        "YES - near strike"
    } else if price > strike * 0.85 {
        "Monitor"
    } else {
        "No action needed"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReport {
    pub symbol: String,
    pub price: f64,
    pub dte: i64,
    pub strike: f64,
    pub contracts: u32,
    pub quote: Option<PremiumQuote>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub status: CallStatus,
    pub roll_advice: String,
    pub alert: AlertCheck,
}

impl MonitorReport {
    pub fn build(
        settings: &MonitorSettings,
        price: f64,
        call: Option<(PremiumQuote, Option<u64>, Option<u64>)>,
        today: NaiveDate,
    ) -> Self {
        let dte = days_to_expiration(settings.expiration, today);
        let quote = call.map(|(q, _, _)| q);
        Self {
            symbol: settings.symbol.clone(),
            price,
            dte,
            strike: settings.strike,
            contracts: settings.contracts,
            status: calculate_status(settings, price, quote.as_ref()),
            quote,
            volume: call.and_then(|(_, v, _)| v),
            open_interest: call.and_then(|(_, _, oi)| oi),
            roll_advice: roll_advice(price, settings.strike).to_string(),
            alert: check_alert_conditions(price, dte, settings.price_threshold, settings.dte_threshold),
        }
    }
}

/// Subject and plain-text body of the alert e-mail.
pub fn alert_email(report: &MonitorReport, now: NaiveDateTime) -> (String, String) {
    let stamp = now.format("%Y-%m-%d %I:%M %p");
    let subject = format!("{} Covered Call Alert - {stamp}", report.symbol);

    let reasons: Vec<String> = report.alert.reasons.iter().map(|r| format!("- {r}")).collect();
    let body = format!(
        "{sym} Covered Call Monitor Alert\n\
         \n\
         Alert Conditions Met:\n\
         {reasons}\n\
         \n\
         Current Status:\n\
         - {sym} Price: {price}\n\
         - Days to Expiration: {dte} days\n\
         - Strike: {strike}\n\
         - Status: {status}\n\
         - Call Premium: {premium}\n\
         - Unrealized P/L: {pnl}\n\
         - Roll Alert: {roll}\n\
         \n\
         Action Recommended:\n\
         Consider rolling up/out for fresh premium if stock nears strike or DTE is low.\n\
         \n\
         Generated: {stamp}\n",
        sym = report.symbol,
        reasons = reasons.join("\n"),
        price = money(report.price),
        dte = report.dte,
        strike = money(report.strike),
        status = report.status.distance,
        premium = report.status.premium,
        pnl = report.status.pnl,
        roll = report.roll_advice,
    );
    (subject, body)
}

/// Send the alert when any condition is met. Returns whether mail went out.
pub async fn send_monitor_alert(
    report: &MonitorReport,
    notifier: &dyn AlertNotifier,
    now: NaiveDateTime,
) -> Result<bool, DomainError> {
    if !report.alert.should_alert {
        return Ok(false);
    }
    let (subject, body) = alert_email(report, now);
    notifier.send(&subject, &body).await?;
    Ok(true)
}

pub struct MonitorUseCase {
    source: Arc<dyn MarketDataSource>,
}

impl MonitorUseCase {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    /// Fetch price and the watched call. A missing chain or strike leaves the
    /// premium fields unavailable rather than failing the report.
    pub async fn report(&self, settings: &MonitorSettings, today: NaiveDate) -> Result<MonitorReport, DomainError> {
        let price = current_price(self.source.as_ref(), &settings.symbol).await?;

        let call = match self.source.option_chain(&settings.symbol, settings.expiration).await {
            Ok(chain) => {
                let call = find_call(&chain, settings.strike);
                if call.is_none() {
                    warn!(strike = settings.strike, "no data found for strike");
                }
                call
            }
            Err(e) => {
                warn!(error = %e, "error fetching options chain");
                None
            }
        };

        let report = MonitorReport::build(settings, price, call, today);
        info!(symbol = %report.symbol, price, dte = report.dte, alert = report.alert.should_alert, "monitor check");
        Ok(report)
    }
}

/// `$1,234.56`
pub fn money(v: f64) -> String {
    format!("${}", group_thousands(v, 2))
}

/// Format with `decimals` places and comma thousands separators.
pub fn group_thousands(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if v < 0.0 && s.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
