pub mod ledger;
pub mod lifecycle;
pub mod service;
pub mod stats;

pub use crate::domain::model::{AggregateComponent, BucketStatus, Buckets, Component, ComponentStatus};
pub use crate::domain::ports::{ComponentApi, ConfigProvider, ReportStorage};
pub use crate::utils::error::Result;
