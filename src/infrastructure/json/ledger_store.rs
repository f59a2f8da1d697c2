//! Flat-file portfolio ledger.
//!
//! The whole ledger is one pretty-printed JSON document with four lists.
//! Every operation reads the file, and every mutation rewrites it; the
//! document stays small enough for that to be fine.

use crate::domain::entities::options_position::OptionsPosition;
use crate::domain::entities::snapshot::PortfolioSnapshot;
use crate::domain::entities::stock_position::StockPosition;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::ports::ledger_repository::*;
use crate::domain::values::position_status::PositionStatus;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

const SECTIONS: [&str; 4] = [
    "portfolio_snapshots",
    "transactions",
    "options_positions",
    "stock_positions",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerDocument {
    pub portfolio_snapshots: Vec<PortfolioSnapshot>,
    pub transactions: Vec<Transaction>,
    pub options_positions: Vec<OptionsPosition>,
    pub stock_positions: Vec<StockPosition>,
    /// Content this store does not model, written back untouched.
    #[serde(skip)]
    pub foreign: ForeignContent,
}

/// Records that failed to parse, per section, and unknown top-level keys.
#[derive(Debug, Clone, Default)]
pub struct ForeignContent {
    pub records: BTreeMap<String, Vec<Value>>,
    pub keys: Map<String, Value>,
}

impl ForeignContent {
    fn records(&self, section: &str) -> &[Value] {
        self.records.get(section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids held by unparsed records of `section`.
    fn ids<'a>(&'a self, section: &str) -> impl Iterator<Item = u64> + 'a {
        self.records(section)
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_u64))
    }
}

impl LedgerDocument {
    /// Next id for `section`, past every id in it, parsed or not.
    fn next_id(&self, section: &str, ids: impl Iterator<Item = u64>) -> u64 {
        ids.chain(self.foreign.ids(section)).max().unwrap_or(0) + 1
    }

    fn to_value(&self) -> Result<Value, DomainError> {
        let mut value =
            serde_json::to_value(self).map_err(|e| DomainError::Storage(format!("serialize ledger: {e}")))?;
        if let Some(obj) = value.as_object_mut() {
            for (section, records) in &self.foreign.records {
                if let Some(Value::Array(items)) = obj.get_mut(section) {
                    items.extend(records.iter().cloned());
                }
            }
            for (key, v) in &self.foreign.keys {
                obj.entry(key.clone()).or_insert_with(|| v.clone());
            }
        }
        Ok(value)
    }
}

pub struct JsonLedgerStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLedgerStore {
    /// Open the ledger at `path`, creating the directory and an empty document if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        let store = Self {
            path,
            lock: Mutex::new(()),
        };
        if !store.path.exists() {
            store.write(&LedgerDocument::default())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. Unreadable files and malformed sections read as empty.
    pub fn read(&self) -> LedgerDocument {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read ledger, treating as empty");
                return LedgerDocument::default();
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ledger is not valid JSON, treating as empty");
                return LedgerDocument::default();
            }
        };
        let Some(obj) = value.as_object() else {
            warn!(path = %self.path.display(), "ledger is not a JSON object, treating as empty");
            return LedgerDocument::default();
        };

        let mut foreign = ForeignContent {
            keys: obj
                .iter()
                .filter(|(k, _)| !SECTIONS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..Default::default()
        };
        LedgerDocument {
            portfolio_snapshots: section(obj, SECTIONS[0], &mut foreign),
            transactions: section(obj, SECTIONS[1], &mut foreign),
            options_positions: section(obj, SECTIONS[2], &mut foreign),
            stock_positions: section(obj, SECTIONS[3], &mut foreign),
            foreign,
        }
    }

    fn write(&self, doc: &LedgerDocument) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(&doc.to_value()?)
            .map_err(|e| DomainError::Storage(format!("serialize ledger: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| DomainError::Storage(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| DomainError::Storage(format!("replace {}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Read-modify-write under the store lock.
    fn mutate<T>(&self, f: impl FnOnce(&mut LedgerDocument) -> T) -> Result<T, DomainError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| DomainError::Storage("ledger lock poisoned".into()))?;
        let mut doc = self.read();
        let out = f(&mut doc);
        self.write(&doc)?;
        Ok(out)
    }
}

/// Parse one section. Records that do not parse are kept in `foreign`.
fn section<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, foreign: &mut ForeignContent) -> Vec<T> {
    let Some(items) = obj.get(key).and_then(Value::as_array) else {
        if obj.contains_key(key) {
            warn!(section = key, "ledger section is not a list, treating as empty");
        }
        return Vec::new();
    };
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(section = key, error = %e, "keeping unrecognized ledger record as is");
                foreign.records.entry(key.to_string()).or_default().push(item.clone());
            }
        }
    }
    records
}

impl LedgerRepository for JsonLedgerStore {
    fn save_snapshot(
        &self,
        shares: u32,
        cash: f64,
        total_value: f64,
        notes: Option<String>,
    ) -> Result<PortfolioSnapshot, DomainError> {
        self.mutate(|doc| {
            let snapshot = PortfolioSnapshot {
                id: doc.next_id(SECTIONS[0], doc.portfolio_snapshots.iter().map(|s| s.id)),
                timestamp: Utc::now(),
                shares,
                cash,
                total_value,
                notes,
            };
            doc.portfolio_snapshots.push(snapshot.clone());
            snapshot
        })
    }

    fn add_transaction(&self, tx: NewTransaction) -> Result<Transaction, DomainError> {
        self.mutate(|doc| {
            let record = Transaction {
                id: doc.next_id(SECTIONS[1], doc.transactions.iter().map(|t| t.id)),
                timestamp: Utc::now(),
                kind: tx.kind,
                symbol: tx.symbol,
                quantity: tx.quantity,
                price: tx.price,
                strike: tx.strike,
                expiration: tx.expiration,
                premium: tx.premium,
                total_cost: tx.total_cost,
                notes: tx.notes,
            };
            debug!(id = record.id, kind = %record.kind, "transaction recorded");
            doc.transactions.push(record.clone());
            record
        })
    }

    fn add_options_position(&self, position: NewOptionsPosition) -> Result<u64, DomainError> {
        self.mutate(|doc| {
            let now = Utc::now();
            let id = doc.next_id(SECTIONS[2], doc.options_positions.iter().map(|p| p.id));
            doc.options_positions.push(OptionsPosition {
                id,
                created_at: now,
                updated_at: now,
                option_type: position.option_type,
                action: position.action,
                symbol: position.symbol,
                strike: position.strike,
                expiration: position.expiration,
                quantity: position.quantity,
                premium: position.premium,
                status: PositionStatus::Open,
                closed_at: None,
                profit_loss: None,
                notes: position.notes,
            });
            id
        })
    }

    fn update_options_position(
        &self,
        id: u64,
        status: PositionStatus,
        profit_loss: Option<f64>,
        notes: Option<String>,
    ) -> Result<bool, DomainError> {
        self.mutate(|doc| {
            match doc.options_positions.iter_mut().find(|p| p.id == id) {
                Some(pos) => {
                    pos.transition(status, profit_loss, notes, Utc::now());
                    true
                }
                None => false,
            }
        })
    }

    fn delete_options_position(&self, id: u64) -> Result<bool, DomainError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| DomainError::Storage("ledger lock poisoned".into()))?;
        let mut doc = self.read();
        let before = doc.options_positions.len();
        doc.options_positions.retain(|p| p.id != id);
        if doc.options_positions.len() == before {
            return Ok(false);
        }
        self.write(&doc)?;
        Ok(true)
    }

    fn open_options_positions(&self, symbol: &str) -> Result<Vec<OptionsPosition>, DomainError> {
        let mut positions: Vec<OptionsPosition> = self
            .read()
            .options_positions
            .into_iter()
            .filter(|p| p.symbol == symbol && p.is_open())
            .collect();
        positions.sort_by(|a, b| {
            a.expiration
                .cmp(&b.expiration)
                .then_with(|| a.strike.partial_cmp(&b.strike).unwrap_or(std::cmp::Ordering::Equal))
        });
        Ok(positions)
    }

    fn all_options_positions(&self, symbol: &str, limit: usize) -> Result<Vec<OptionsPosition>, DomainError> {
        let mut positions: Vec<OptionsPosition> = self
            .read()
            .options_positions
            .into_iter()
            .filter(|p| p.symbol == symbol)
            .collect();
        positions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        positions.truncate(limit);
        Ok(positions)
    }

    fn recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>, DomainError> {
        let mut txs = self.read().transactions;
        txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        txs.truncate(limit);
        Ok(txs)
    }

    fn portfolio_history(&self, limit: usize) -> Result<Vec<PortfolioSnapshot>, DomainError> {
        let mut snapshots = self.read().portfolio_snapshots;
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        snapshots.truncate(limit);
        Ok(snapshots)
    }

    fn latest_snapshot(&self) -> Result<Option<PortfolioSnapshot>, DomainError> {
        Ok(self.portfolio_history(1)?.into_iter().next())
    }

    fn update_stock_position(
        &self,
        symbol: &str,
        quantity: u32,
        avg_cost: f64,
        current_price: Option<f64>,
        notes: Option<String>,
    ) -> Result<StockPosition, DomainError> {
        self.mutate(|doc| {
            let now = Utc::now();
            let total_value = StockPosition::mark(quantity, avg_cost, current_price);
            if let Some(existing) = doc.stock_positions.iter_mut().find(|p| p.symbol == symbol) {
                existing.updated_at = now;
                existing.quantity = quantity;
                existing.avg_cost = avg_cost;
                existing.current_price = current_price;
                existing.total_value = total_value;
                if let Some(n) = notes.filter(|n| !n.is_empty()) {
                    existing.notes = Some(n);
                }
                return existing.clone();
            }
            let position = StockPosition {
                id: doc.next_id(SECTIONS[3], doc.stock_positions.iter().map(|p| p.id)),
                created_at: now,
                updated_at: now,
                symbol: symbol.to_string(),
                quantity,
                avg_cost,
                current_price,
                total_value,
                notes,
            };
            doc.stock_positions.push(position.clone());
            position
        })
    }

    fn stock_position(&self, symbol: &str) -> Result<Option<StockPosition>, DomainError> {
        Ok(self
            .read()
            .stock_positions
            .into_iter()
            .find(|p| p.symbol == symbol))
    }
}
