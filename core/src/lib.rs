// src/lib.rs

//! Ordermirror: order writes over a relational system of record, mirrored
//! into a key-value cache for read-heavy reports.
//!
//! The crate provides:
//!  - `OrderWriteService`: validated, priced, transactional create and delete,
//!    with best-effort mirror publication after each commit.
//!  - `BackfillService`: one-shot repopulation of an empty mirror.
//!  - `ReportQueryService`: highest spenders and best sellers, read from the mirror.
//!  - The `OrderStore` and `MirrorStore` seams, with PostgreSQL and Redis
//!    implementations and in-process ones for tests and local runs.
//!
//! The mirror is eventually consistent with the store, per order. A mirror
//! failure never undoes a committed relational write; it is returned as a
//! distinct outcome and logged under [`service::DRIFT_TARGET`].

pub mod error;
pub mod mirror;
pub mod models;
pub mod pricing;
pub mod service;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{MirrorError, OrderError, Result, StoreError, SyncError};
pub use crate::mirror::{MemoryMirror, MirrorFault, MirrorStore, RedisMirror};
pub use crate::models::{
  MirrorRecord, NewOrder, Order, OrderItem, OrderLine, OrderRequest, OrderSummary, PricedItem, ProductSales,
  Quantity, UserSpend,
};
pub use crate::service::{
  BackfillService, CreateOutcome, DeleteOutcome, OrderWriteService, ReportQueryService, SyncReport, DRIFT_TARGET,
};
pub use crate::store::{MemoryOrderStore, OrderStore, PgOrderStore, StoreFault};
