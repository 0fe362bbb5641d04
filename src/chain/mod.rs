//! The execution environment the strategy runs against.
//!
//! Every collaborator (token ledgers, reward pool, router, pair) is reached
//! through ABI-encoded calls on a [`Chain`]. The chain also owns the
//! all-or-nothing guarantee: public strategy operations run inside
//! [`atomically`], which rolls the chain back on any error.

pub mod memory;

pub use memory::MemoryChain;

use alloy_primitives::{Address, Bytes, Log};
use thiserror::Error;

/// Revert raised by a collaborator contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("execution reverted: {reason}")]
pub struct Revert {
    pub reason: String,
}

impl Revert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Handle to a journaled chain state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotId(pub usize);

/// Synchronous, journaled view of an EVM-like chain.
pub trait Chain {
    /// Timestamp of the block the current operation executes in
    fn block_timestamp(&self) -> u64;

    /// State-changing call from `from` to `to`
    fn call(&mut self, from: Address, to: Address, input: Bytes) -> Result<Bytes, Revert>;

    /// Read-only call; must never change state
    fn static_call(&self, from: Address, to: Address, input: Bytes) -> Result<Bytes, Revert>;

    /// Append a log emitted by `log.address`
    fn emit(&mut self, log: Log);

    /// Open a journal entry
    fn snapshot(&mut self) -> SnapshotId;

    /// Discard everything since `id` (and `id` itself)
    fn revert_to(&mut self, id: SnapshotId);

    /// Keep everything since `id` and close the journal entry
    fn commit(&mut self, id: SnapshotId);
}

/// Run `op` as one indivisible unit of work.
///
/// On `Err` the chain is rewound to the state before `op` started; nothing
/// `op` did (balances, allowances, logs) stays observable.
pub fn atomically<C, T, E, F>(chain: &mut C, op: F) -> Result<T, E>
where
    C: Chain + ?Sized,
    F: FnOnce(&mut C) -> Result<T, E>,
{
    let id = chain.snapshot();
    match op(chain) {
        Ok(value) => {
            chain.commit(id);
            Ok(value)
        }
        Err(e) => {
            chain.revert_to(id);
            Err(e)
        }
    }
}
