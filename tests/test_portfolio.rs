mod common;

use std::sync::Arc;

use common::{d, flat_closes, setup, FakeMarketData};
use wheelhouse::application::portfolio::Portfolio;
use wheelhouse::config::AdvisorConfig;
use wheelhouse::domain::ports::ledger_repository::LedgerRepository;
use wheelhouse::domain::values::option_type::OptionType;
use wheelhouse::domain::values::trade_action::TradeAction;
use wheelhouse::domain::values::transaction_kind::TransactionKind;
use wheelhouse::infrastructure::json::ledger_store::JsonLedgerStore;

fn ledger() -> (tempfile::TempDir, Arc<dyn LedgerRepository>) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonLedgerStore::open(dir.path().join("portfolio.json")).unwrap();
    (dir, Arc::new(store))
}

#[test]
fn test_load_uses_config_on_empty_ledger() {
    let (_dir, ledger) = ledger();
    let config = AdvisorConfig {
        shares: 300,
        cash_available: 12_000.0,
        ..AdvisorConfig::default()
    };
    let p = Portfolio::load(&config, Some(ledger)).unwrap();
    assert_eq!(p.symbol, "TSLA");
    assert_eq!(p.shares, 300);
    assert_eq!(p.cash, 12_000.0);
    assert!(p.has_ledger());
}

#[test]
fn test_load_prefers_stock_position_over_snapshot() {
    let (_dir, ledger) = ledger();
    ledger.save_snapshot(400, 5_000.0, 85_000.0, None).unwrap();

    let p = Portfolio::load(&AdvisorConfig::default(), Some(ledger.clone())).unwrap();
    assert_eq!(p.shares, 400);
    assert_eq!(p.cash, 5_000.0);

    ledger.update_stock_position("TSLA", 650, 190.0, None, None).unwrap();
    let p = Portfolio::load(&AdvisorConfig::default(), Some(ledger)).unwrap();
    assert_eq!(p.shares, 650);
    // cash still comes from the snapshot
    assert_eq!(p.cash, 5_000.0);
}

#[test]
fn test_sell_with_expiration_is_recorded() {
    let (_dir, ledger) = ledger();
    let mut p = Portfolio::load(&AdvisorConfig::default(), Some(ledger.clone())).unwrap();

    let held = p
        .add_position(OptionType::Call, 475.0, 3.15, 2, Some(d(2026, 1, 30)), TradeAction::Sell)
        .unwrap();
    assert_eq!(held.ledger_id, Some(1));
    assert!((p.cash - 630.0).abs() < 1e-9);

    let open = ledger.open_options_positions("TSLA").unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].strike, 475.0);
    assert_eq!(open[0].quantity, 2);

    let txs = ledger.recent_transactions(10).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TransactionKind::SellCall);
    assert!((txs[0].total_cost + 630.0).abs() < 1e-9);
    assert_eq!(txs[0].expiration, Some(d(2026, 1, 30)));
}

#[test]
fn test_position_without_expiration_stays_in_memory() {
    let (_dir, ledger) = ledger();
    let mut p = Portfolio::load(&AdvisorConfig::default(), Some(ledger.clone())).unwrap();
    let held = p
        .add_position(OptionType::Put, 190.0, 4.0, 1, None, TradeAction::Sell)
        .unwrap();
    assert_eq!(held.ledger_id, None);
    assert_eq!(p.positions.len(), 1);
    assert!(ledger.recent_transactions(10).unwrap().is_empty());
}

#[test]
fn test_value_counts_intrinsic_and_time_value() {
    let mut p = Portfolio::new("TSLA", 100, 0.0);
    p.add_position(OptionType::Call, 190.0, 4.0, 1, None, TradeAction::Sell)
        .unwrap();
    // shares 20,000 + cash 400 + intrinsic 1,000 + half of 400 premium
    assert!((p.value(200.0) - 21_600.0).abs() < 1e-9);
}

#[test]
fn test_update_shares_records_trades_and_snapshots() {
    let (_dir, ledger) = ledger();
    let config = AdvisorConfig {
        shares: 500,
        ..AdvisorConfig::default()
    };
    let mut p = Portfolio::load(&config, Some(ledger.clone())).unwrap();

    p.update_shares(600, Some(200.0)).unwrap();
    p.update_shares(550, Some(210.0)).unwrap();
    p.update_shares(550, Some(210.0)).unwrap();

    let txs = ledger.recent_transactions(10).unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].kind, TransactionKind::SellStock);
    assert_eq!(txs[0].quantity, 50);
    assert_eq!(txs[1].kind, TransactionKind::BuyStock);
    assert_eq!(txs[1].quantity, 100);
    assert!((txs[1].total_cost - 20_000.0).abs() < 1e-9);

    let snapshots = ledger.portfolio_history(10).unwrap();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].shares, 550);
    assert!((snapshots[0].total_value - 115_500.0).abs() < 1e-9);

    assert_eq!(ledger.stock_position("TSLA").unwrap().unwrap().quantity, 550);
}

#[tokio::test]
async fn test_wheelhouse_update_shares_and_summary() {
    let (_dir, wh) = setup(AdvisorConfig::default(), FakeMarketData::new(200.0, flat_closes()));

    let snapshot = wh.update_shares(700, None).await.unwrap();
    assert_eq!(snapshot.shares, 700);
    assert!((snapshot.total_value - 140_000.0).abs() < 1e-9);

    let summary = wh.portfolio_summary().await.unwrap();
    assert_eq!(summary.shares, 700);
    assert_eq!(summary.price, 200.0);
    assert!(summary.open_positions.is_empty());
}

#[tokio::test]
async fn test_snapshot_uses_live_price() {
    let config = AdvisorConfig {
        shares: 100,
        cash_available: 1_000.0,
        ..AdvisorConfig::default()
    };
    let (_dir, wh) = setup(config, FakeMarketData::new(250.0, flat_closes()));

    let snap = wh.snapshot(None, Some("weekly".into())).await.unwrap();
    assert!((snap.total_value - 26_000.0).abs() < 1e-9);
    assert_eq!(snap.notes.as_deref(), Some("weekly"));
    assert_eq!(wh.history(5).unwrap().len(), 1);
}
