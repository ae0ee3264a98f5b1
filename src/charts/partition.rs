//! Chart grouping table
//!
//! [`ChartSet`] keeps the user's charts as a partition of the charted metrics:
//! every metric belongs to at most one chart and no chart is ever empty. Each
//! operation returns the list of charts it created, changed or destroyed so a
//! renderer can replay exactly that work.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque chart identifier, unique for the lifetime of a [`ChartSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(u64);

impl ChartId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

/// One chart and the metrics it shows, in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartGroup {
    pub id: ChartId,
    pub metrics: Vec<String>,
}

impl ChartGroup {
    pub fn contains(&self, metric: &str) -> bool {
        self.metrics.iter().any(|m| m == metric)
    }

    /// Title shown above the chart
    pub fn title(&self) -> String {
        self.metrics.join(", ")
    }

    pub fn is_merged(&self) -> bool {
        self.metrics.len() > 1
    }
}

/// Structural effect of an operation on one chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartChange {
    Created(ChartId),
    Updated(ChartId),
    Destroyed(ChartId),
}

impl ChartChange {
    pub fn id(&self) -> ChartId {
        match self {
            ChartChange::Created(id) | ChartChange::Updated(id) | ChartChange::Destroyed(id) => *id,
        }
    }
}

/// Partition of charted metrics into chart groups
#[derive(Debug, Clone, Default)]
pub struct ChartSet {
    groups: BTreeMap<ChartId, ChartGroup>,
    last_id: u64,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chart a metric on its own. A metric already charted is left where it is.
    pub fn add_metric(&mut self, metric: &str) -> Vec<ChartChange> {
        if self.group_of(metric).is_some() {
            return Vec::new();
        }
        let id = self.create(vec![metric.to_string()]);
        vec![ChartChange::Created(id)]
    }

    /// Stop charting a metric; its chart is destroyed when left empty
    pub fn remove_metric(&mut self, metric: &str) -> Vec<ChartChange> {
        let mut changes = Vec::new();
        self.detach(metric, &mut changes);
        changes
    }

    /// Chart several metrics together on a new chart. Metrics charted
    /// elsewhere are moved off their current chart first.
    pub fn merge_metrics<S: AsRef<str>>(&mut self, metrics: &[S]) -> Vec<ChartChange> {
        let mut merged: Vec<String> = Vec::new();
        for metric in metrics {
            let metric = metric.as_ref();
            if !merged.iter().any(|m| m == metric) {
                merged.push(metric.to_string());
            }
        }
        if merged.is_empty() {
            return Vec::new();
        }

        let mut changes = Vec::new();
        for metric in &merged {
            self.detach(metric, &mut changes);
        }
        let id = self.create(merged);
        changes.push(ChartChange::Created(id));
        changes
    }

    /// Move every metric of `source` onto `target` and destroy `source`.
    /// Unknown ids and `source == target` change nothing.
    pub fn merge_groups(&mut self, source: ChartId, target: ChartId) -> Vec<ChartChange> {
        if source == target || !self.groups.contains_key(&target) {
            return Vec::new();
        }
        let Some(moved) = self.groups.remove(&source) else {
            return Vec::new();
        };

        if let Some(group) = self.groups.get_mut(&target) {
            for metric in moved.metrics {
                if !group.contains(&metric) {
                    group.metrics.push(metric);
                }
            }
        }
        vec![ChartChange::Updated(target), ChartChange::Destroyed(source)]
    }

    /// Split `metric` out of chart `id` onto a chart of its own. A singleton
    /// chart is destroyed and recreated under a new id.
    pub fn unmerge_metric(&mut self, id: ChartId, metric: &str) -> Vec<ChartChange> {
        if !self.groups.get(&id).is_some_and(|g| g.contains(metric)) {
            return Vec::new();
        }

        let mut changes = Vec::new();
        self.detach(metric, &mut changes);
        let id = self.create(vec![metric.to_string()]);
        changes.push(ChartChange::Created(id));
        changes
    }

    /// Destroy one chart
    pub fn remove_group(&mut self, id: ChartId) -> Vec<ChartChange> {
        match self.groups.remove(&id) {
            Some(_) => vec![ChartChange::Destroyed(id)],
            None => Vec::new(),
        }
    }

    /// Destroy every chart
    pub fn clear(&mut self) -> Vec<ChartChange> {
        let changes = self.groups.keys().copied().map(ChartChange::Destroyed).collect();
        self.groups.clear();
        changes
    }

    pub fn group(&self, id: ChartId) -> Option<&ChartGroup> {
        self.groups.get(&id)
    }

    /// Charts in creation order
    pub fn groups(&self) -> impl Iterator<Item = &ChartGroup> {
        self.groups.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.groups.keys().copied()
    }

    /// Chart currently showing `metric`
    pub fn group_of(&self, metric: &str) -> Option<ChartId> {
        self.groups
            .values()
            .find(|group| group.contains(metric))
            .map(|group| group.id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn create(&mut self, metrics: Vec<String>) -> ChartId {
        self.last_id += 1;
        let id = ChartId(self.last_id);
        self.groups.insert(id, ChartGroup { id, metrics });
        id
    }

    /// Take `metric` off its chart, recording the effect
    fn detach(&mut self, metric: &str, changes: &mut Vec<ChartChange>) {
        let Some(id) = self.group_of(metric) else {
            return;
        };
        let now_empty = match self.groups.get_mut(&id) {
            Some(group) => {
                group.metrics.retain(|m| m != metric);
                group.metrics.is_empty()
            }
            None => return,
        };

        if now_empty {
            self.groups.remove(&id);
            changes.retain(|c| c.id() != id);
            changes.push(ChartChange::Destroyed(id));
        } else if !changes.contains(&ChartChange::Updated(id)) {
            changes.push(ChartChange::Updated(id));
        }
    }
}
