//! In-memory journaling backend.
//!
//! `MemJournalBackend` implements the [`Backend`] contract against plain
//! in-process state. Each transaction buffers its mutation records in a
//! journal slot; stopping with a zero result applies them to the device
//! tables in one step, any other result discards them. It is the reference
//! implementation used by tests and benchmarks, and a template for backends
//! that wrap a real journal.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

use crate::env::Env;
use crate::error::BackendError;
use crate::traits::{Backend, TxnToken};

/// Configuration for [`MemJournalBackend`].
#[derive(Debug, Clone)]
pub struct MemJournalConfig {
    /// Maximum number of in-flight transactions across all devices.
    ///
    /// Models journal-credit exhaustion: `create` fails with
    /// [`BackendError::ResourceExhausted`] once the cap is reached.
    pub max_live_txns: usize,
}

impl Default for MemJournalConfig {
    fn default() -> Self {
        Self { max_live_txns: 64 }
    }
}

/// A buffered mutation record. `value: None` is a delete.
struct Record {
    table: String,
    key: Vec<u8>,
    value: Option<Vec<u8>>,
}

/// Journal slot for one in-flight transaction.
struct LiveTxn {
    device: String,
    started: bool,
    records: Vec<Record>,
}

/// Committed tables for one device, created lazily on first use.
#[derive(Default)]
struct DeviceTables {
    tables: HashMap<String, BTreeMap<Vec<u8>, Vec<u8>>>,
}

/// Backend-wide mutable state, guarded by a single mutex.
#[derive(Default)]
struct State {
    devices: HashMap<String, DeviceTables>,
    live: HashMap<u64, LiveTxn>,
}

/// An in-memory journaling backend.
///
/// # Example
///
/// ```ignore
/// use fsxact_backend::backends::MemJournalBackend;
/// use fsxact_backend::{Backend, Env};
///
/// let backend = MemJournalBackend::new("ext4fs");
/// let env = Env::new().with_op("mkdir");
///
/// let token = backend.create(&env, "mds0")?;
/// backend.start(&env, "mds0", &token)?;
/// backend.record(&token, "inodes", b"17", Some(b"dir".to_vec()))?;
/// let committed = backend.stop(&env, "mds0", token, 0)?;
/// assert!(committed);
/// ```
pub struct MemJournalBackend {
    /// The format name this backend registers under.
    name: String,

    /// Configuration.
    config: MemJournalConfig,

    /// Next transaction token.
    next_token: AtomicU64,

    /// Devices and journal slots (single mutex, short critical sections).
    state: Mutex<State>,
}

impl MemJournalBackend {
    /// Create a backend with the default configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MemJournalConfig::default())
    }

    /// Create a backend with an explicit configuration.
    #[must_use]
    pub fn with_config(name: impl Into<String>, config: MemJournalConfig) -> Self {
        Self {
            name: name.into(),
            config,
            next_token: AtomicU64::new(1),
            state: Mutex::new(State::default()),
        }
    }

    /// Buffer a mutation into an in-flight transaction.
    ///
    /// The record is not visible to readers until the transaction is
    /// stopped with a zero result. `value: None` records a delete.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnknownTransaction`] if the token does not
    /// refer to an in-flight transaction, or [`BackendError::Internal`] if
    /// the transaction has not been started.
    pub fn record(
        &self,
        token: &TxnToken,
        table: &str,
        key: &[u8],
        value: Option<Vec<u8>>,
    ) -> Result<(), BackendError> {
        let mut state = self.lock_state()?;
        let txn = state
            .live
            .get_mut(&token.as_u64())
            .ok_or(BackendError::UnknownTransaction(token.as_u64()))?;
        if !txn.started {
            return Err(BackendError::Internal(format!(
                "transaction {} recorded before start",
                token.as_u64()
            )));
        }
        txn.records.push(Record { table: table.to_string(), key: key.to_vec(), value });
        Ok(())
    }

    /// Read a committed value from a device table.
    ///
    /// Returns `Ok(None)` if the device, table or key does not exist.
    pub fn get(
        &self,
        device: &str,
        table: &str,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, BackendError> {
        let state = self.lock_state()?;
        Ok(state
            .devices
            .get(device)
            .and_then(|d| d.tables.get(table))
            .and_then(|t| t.get(key))
            .cloned())
    }

    /// Number of in-flight transactions.
    #[must_use]
    pub fn live_txns(&self) -> usize {
        self.state.lock().map(|s| s.live.len()).unwrap_or(0)
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, State>, BackendError> {
        self.state.lock().map_err(|_| BackendError::Internal("state lock poisoned".into()))
    }
}

impl Backend for MemJournalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, _env: &Env, device: &str) -> Result<TxnToken, BackendError> {
        let mut state = self.lock_state()?;
        if state.live.len() >= self.config.max_live_txns {
            return Err(BackendError::ResourceExhausted(format!(
                "journal full: {} live transactions",
                state.live.len()
            )));
        }

        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        state.live.insert(
            token,
            LiveTxn { device: device.to_string(), started: false, records: Vec::new() },
        );
        Ok(TxnToken::new(token))
    }

    fn start(&self, _env: &Env, device: &str, token: &TxnToken) -> Result<(), BackendError> {
        let mut state = self.lock_state()?;
        let txn = state
            .live
            .get_mut(&token.as_u64())
            .ok_or(BackendError::UnknownTransaction(token.as_u64()))?;
        if txn.device != device {
            return Err(BackendError::NoSuchDevice(device.to_string()));
        }
        if txn.started {
            return Err(BackendError::Internal(format!(
                "transaction {} started twice",
                token.as_u64()
            )));
        }
        txn.started = true;
        Ok(())
    }

    fn stop(
        &self,
        env: &Env,
        device: &str,
        token: TxnToken,
        result: i32,
    ) -> Result<bool, BackendError> {
        let mut state = self.lock_state()?;
        let txn = state
            .live
            .remove(&token.as_u64())
            .ok_or(BackendError::UnknownTransaction(token.as_u64()))?;
        if txn.device != device {
            return Err(BackendError::NoSuchDevice(device.to_string()));
        }

        let committed = result == 0 && txn.started;
        if committed {
            let tables = &mut state.devices.entry(txn.device).or_default().tables;
            for record in txn.records {
                let table = tables.entry(record.table).or_default();
                match record.value {
                    Some(value) => {
                        table.insert(record.key, value);
                    }
                    None => {
                        table.remove(&record.key);
                    }
                }
            }
        }

        debug!(
            token = token.as_u64(),
            device,
            result,
            committed,
            op = env.op().unwrap_or(""),
            "memjournal transaction stopped"
        );
        Ok(committed)
    }
}
