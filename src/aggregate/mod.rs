// src/aggregate/mod.rs
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::dataset::{CrimeRecord, CrimeTable};

/// Column used to bucket rows before reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Year,
    State,
}

/// Reduction applied within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    Mean,
    Max,
    Min,
    /// Period-over-period growth of the per-group sum, in percent.
    PercentChange,
}

impl Reduction {
    /// Human-readable prefix used in trace names.
    pub fn label(self) -> &'static str {
        match self {
            Reduction::Sum => "Total",
            Reduction::Mean => "Average",
            Reduction::Max => "Highest",
            Reduction::Min => "Lowest",
            Reduction::PercentChange => "Growth",
        }
    }
}

/// A group key value. Years serialize as numbers, states as strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupLabel {
    Year(i32),
    State(String),
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Year(year) => write!(f, "{}", year),
            GroupLabel::State(state) => f.write_str(state),
        }
    }
}

impl GroupLabel {
    fn of(record: &CrimeRecord, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Year => GroupLabel::Year(record.year),
            GroupBy::State => GroupLabel::State(record.state.clone()),
        }
    }
}

/// One labeled series of (group, value) pairs, in ascending group order.
/// `None` marks an undefined value, e.g. the first period of a growth rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSeries {
    pub column: String,
    pub reduction: Reduction,
    pub points: Vec<(GroupLabel, Option<f64>)>,
}

impl AggregateSeries {
    pub fn labels(&self) -> Vec<GroupLabel> {
        self.points.iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|(_, v)| *v).collect()
    }
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
    max: f64,
    min: f64,
}

impl Accumulator {
    fn push(&mut self, v: f64) {
        if self.count == 0 {
            self.max = v;
            self.min = v;
        } else {
            self.max = self.max.max(v);
            self.min = self.min.min(v);
        }
        self.sum += v;
        self.count += 1;
    }
}

/// Group `table` by `group_by` and reduce `column` within each group.
/// Returns `None` if the table has no such column.
pub fn aggregate(
    table: &CrimeTable,
    group_by: GroupBy,
    column: &str,
    reduction: Reduction,
) -> Option<AggregateSeries> {
    let idx = table.column_index(column)?;

    let mut groups: BTreeMap<GroupLabel, Accumulator> = BTreeMap::new();
    // rows built without this column contribute nothing
    for record in table.records() {
        if let Some(&v) = record.counts.get(idx) {
            groups
                .entry(GroupLabel::of(record, group_by))
                .or_default()
                .push(v);
        }
    }

    let points = match reduction {
        Reduction::Sum => reduce(groups, |acc| acc.sum),
        Reduction::Mean => reduce(groups, |acc| acc.sum / acc.count as f64),
        Reduction::Max => reduce(groups, |acc| acc.max),
        Reduction::Min => reduce(groups, |acc| acc.min),
        Reduction::PercentChange => percent_change(reduce(groups, |acc| acc.sum)),
    };

    Some(AggregateSeries {
        column: column.to_string(),
        reduction,
        points,
    })
}

fn reduce<F>(groups: BTreeMap<GroupLabel, Accumulator>, f: F) -> Vec<(GroupLabel, Option<f64>)>
where
    F: Fn(&Accumulator) -> f64,
{
    groups
        .into_iter()
        .map(|(label, acc)| {
            let v = f(&acc);
            (label, Some(v))
        })
        .collect()
}

/// `(current - previous) / previous * 100`; undefined for the first period
/// and whenever the previous value is zero.
fn percent_change(totals: Vec<(GroupLabel, Option<f64>)>) -> Vec<(GroupLabel, Option<f64>)> {
    let mut previous: Option<f64> = None;
    totals
        .into_iter()
        .map(|(label, current)| {
            let growth = match (previous, current) {
                (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev * 100.0),
                _ => None,
            };
            previous = current;
            (label, growth)
        })
        .collect()
}
