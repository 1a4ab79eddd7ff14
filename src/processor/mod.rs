//! Withdrawal Processor
//!
//! The worker's core: discovery, conversion, transfer, bookkeeping.
//!
//! # Flow
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     WITHDRAWAL FLOW                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │                                                                │
//! │  1. Poller lists pending requests from the store               │
//! │                                                                │
//! │  2. Pipeline claims a request (pending -> processing)          │
//! │     └── Claim lost or store down: skip, retry next cycle       │
//! │                                                                │
//! │  3. Conversion engine turns tokens into a SOL payout           │
//! │     └── Below minimum: mark failed, no transfer                │
//! │                                                                │
//! │  4. Transfer executor pays out from the treasury               │
//! │     └── Validate address, preflight balance, sign, submit      │
//! │                                                                │
//! │  5. Status updater records the outcome                         │
//! │     └── completed + signature, or failed + message             │
//! │                                                                │
//! └────────────────────────────────────────────────────────────────┘
//! ```

pub mod convert;
pub mod pipeline;
pub mod poller;
pub mod status;
pub mod transfer;

// Re-exports
pub use convert::Converter;
pub use pipeline::{Outcome, Pipeline};
pub use poller::{CycleResult, Poller, PollerStats, REQUEST_PACING};
pub use status::StatusUpdater;
pub use transfer::{TransferError, TransferExecutor, FEE_RESERVE_LAMPORTS};
