//! Aggregation over classified samples.
//!
//! [`aggregate`] and [`warning`] are pure functions from a snapshot to
//! report views; [`analyzer::Dashboard`] fetches the snapshot from a store
//! and ties them together. Reports can be published as JSON to S3 via
//! [`writetos3`].

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
pub mod warning;
pub mod writetos3;
