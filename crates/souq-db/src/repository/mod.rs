//! # Repository Implementations
//!
//! Each repository owns a clone of the pool and exposes the queries one
//! aggregate needs.
//!
//! - [`product`] - Catalog reads and the low-stock query
//! - [`sale`] - Sale persistence, sale number sequence, atomic stock
//!   decrements with their markers
//! - [`stats`] - Windowed revenue aggregation and top products
//! - [`settings`] - Key/value store configuration

pub mod product;
pub mod sale;
pub mod settings;
pub mod stats;
