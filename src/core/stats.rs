use crate::domain::model::{AggregateComponent, BucketStatus, Component, ComponentStatus, Project};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusStat<S> {
    pub status: S,
    pub count: u64,
    pub percent: f64,
}

/// Share of `count` in `total` as a percentage rounded to two decimals.
/// Zero when `total` is zero.
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Per-status counts over unit components, one row per status.
pub fn unit_stats<'a, I>(components: I) -> Vec<StatusStat<ComponentStatus>>
where
    I: IntoIterator<Item = &'a Component>,
{
    let mut counts = [0u64; ComponentStatus::ALL.len()];
    let mut total = 0u64;
    for component in components {
        if let Some(index) = ComponentStatus::ALL.iter().position(|s| *s == component.status) {
            counts[index] += 1;
        }
        total += 1;
    }

    ComponentStatus::ALL
        .into_iter()
        .zip(counts)
        .map(|(status, count)| StatusStat {
            status,
            count,
            percent: percent(count, total),
        })
        .collect()
}

pub fn project_stats(project: &Project) -> Vec<StatusStat<ComponentStatus>> {
    unit_stats(project.components())
}

/// Per-bucket counts of an aggregate component against its `total`.
pub fn bucket_stats(ledger: &AggregateComponent) -> Vec<StatusStat<BucketStatus>> {
    ledger
        .statuses
        .iter()
        .map(|(status, count)| StatusStat {
            status,
            count,
            percent: percent(count, ledger.total),
        })
        .collect()
}

/// Rows of `status,count,percent` for display or export.
pub fn to_rows<S: Display>(stats: &[StatusStat<S>]) -> Vec<[String; 3]> {
    stats
        .iter()
        .map(|stat| {
            [
                stat.status.to_string(),
                stat.count.to_string(),
                format!("{:.2}", stat.percent),
            ]
        })
        .collect()
}
