// core/src/models/mod.rs

//! Data structures for the system of record, the mirror and the reports.

pub mod mirror_record;
pub mod order;
pub mod order_item;
pub mod product;
pub mod report;
pub mod request;

pub use mirror_record::MirrorRecord;
pub use order::{NewOrder, Order, OrderSummary};
pub use order_item::{OrderItem, PricedItem};
pub use product::Product;
pub use report::{ProductSales, UserSpend};
pub use request::{OrderLine, OrderRequest, Quantity};
