use crate::core::stats::{to_rows, StatusStat};
use crate::utils::error::{DashboardError, Result};
use std::fmt::Display;

pub const HEADER: [&str; 3] = ["status", "count", "percent"];

/// CSV with one `status,count,percent` row per status.
pub fn stats_csv<S: Display>(stats: &[StatusStat<S>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in to_rows(stats) {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))
}
