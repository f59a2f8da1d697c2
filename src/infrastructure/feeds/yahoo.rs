use crate::domain::entities::market::{OptionChain, OptionQuote, PriceBar, Quote};
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Yahoo Finance adapter: v8 chart API for prices, v7 options API for chains.
pub struct YahooMarketData {
    base_url: String,
    client: reqwest::Client,
}

impl Default for YahooMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooMarketData {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .user_agent(
                    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                     AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/120.0.0.0 Safari/537.36",
                )
                .build()
                .unwrap_or_default(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, DomainError> {
        debug!(url, "yahoo request");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::MarketData(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(DomainError::MarketData(format!(
                "Yahoo API returned {} for {what}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| DomainError::Parse(format!("Yahoo {what}: {e}")))
    }

    async fn chart(&self, symbol: &str, range: &str) -> Result<ChartData, DomainError> {
        let url = format!(
            "{}/v8/finance/chart/{symbol}?range={range}&interval=1d",
            self.base_url
        );
        let data: ChartResponse = self.get_json(&url, symbol).await?;

        if let Some(err) = data.chart.error.filter(|e| !e.is_null()) {
            return Err(DomainError::MarketData(format!("Yahoo error: {err}")));
        }

        data.chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| DomainError::MarketData(format!("No chart results for {symbol}")))
    }

    async fn options(&self, symbol: &str, date: Option<i64>) -> Result<OptionResult, DomainError> {
        let mut url = format!("{}/v7/finance/options/{symbol}", self.base_url);
        if let Some(ts) = date {
            url.push_str(&format!("?date={ts}"));
        }
        let data: OptionsResponse = self.get_json(&url, symbol).await?;

        if let Some(err) = data.option_chain.error.filter(|e| !e.is_null()) {
            return Err(DomainError::MarketData(format!("Yahoo error: {err}")));
        }

        data.option_chain
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| DomainError::MarketData(format!("No options results for {symbol}")))
    }
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    regular_market_volume: Option<u64>,
    #[serde(default)]
    regular_market_day_high: Option<f64>,
    #[serde(default)]
    regular_market_day_low: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResponse {
    option_chain: OptionsResult,
}

#[derive(Debug, serde::Deserialize)]
struct OptionsResult {
    result: Option<Vec<OptionResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<OptionsBlock>,
}

#[derive(Debug, serde::Deserialize)]
struct OptionsBlock {
    #[serde(default)]
    calls: Vec<YahooContract>,
    #[serde(default)]
    puts: Vec<YahooContract>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooContract {
    #[serde(default)]
    contract_symbol: Option<String>,
    strike: f64,
    #[serde(default)]
    last_price: Option<f64>,
    #[serde(default)]
    bid: Option<f64>,
    #[serde(default)]
    ask: Option<f64>,
    #[serde(default)]
    volume: Option<u64>,
    #[serde(default)]
    open_interest: Option<u64>,
}

impl From<YahooContract> for OptionQuote {
    fn from(c: YahooContract) -> Self {
        OptionQuote {
            contract_symbol: c.contract_symbol,
            strike: c.strike,
            last_price: c.last_price.unwrap_or(0.0),
            bid: c.bid.unwrap_or(0.0),
            ask: c.ask.unwrap_or(0.0),
            volume: c.volume,
            open_interest: c.open_interest,
        }
    }
}

fn unix_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

#[async_trait]
impl MarketDataSource for YahooMarketData {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>, DomainError> {
        let data = self.chart(symbol, range).await?;
        let closes = data
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .map(|q| q.close)
            .unwrap_or_default();

        // Yahoo leaves holes (null closes) for halted sessions
        Ok(data
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                Some(PriceBar {
                    date: unix_to_date(*ts)?,
                    close: close?,
                })
            })
            .collect())
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, DomainError> {
        let meta = self.chart(symbol, "1d").await?.meta;
        Ok(Quote {
            short_name: meta.short_name.or(meta.long_name),
            symbol: meta.symbol,
            regular_market_price: meta.regular_market_price,
            previous_close: meta.chart_previous_close,
            day_high: meta.regular_market_day_high,
            day_low: meta.regular_market_day_low,
            volume: meta.regular_market_volume,
        })
    }

    async fn expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, DomainError> {
        let result = self.options(symbol, None).await?;
        let mut dates: Vec<NaiveDate> = result
            .expiration_dates
            .into_iter()
            .filter_map(unix_to_date)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    async fn option_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<OptionChain, DomainError> {
        let ts = expiration
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| DomainError::InvalidInput(format!("bad expiration {expiration}")))?;
        let result = self.options(symbol, Some(ts)).await?;
        let block = result.options.into_iter().next().unwrap_or(OptionsBlock {
            calls: vec![],
            puts: vec![],
        });
        Ok(OptionChain {
            calls: block.calls.into_iter().map(OptionQuote::from).collect(),
            puts: block.puts.into_iter().map(OptionQuote::from).collect(),
        })
    }
}
