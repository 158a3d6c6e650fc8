// src/chart/mod.rs
use plotly::common::Mode;
use plotly::{Bar, Pie, Scatter, Trace as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::{AggregateSeries, GroupLabel};
use crate::error::EncodingError;

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

/// One named series ready for plotting. Undefined values become `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    kind: ChartKind,
    name: String,
    labels: Vec<GroupLabel>,
    values: Vec<Option<f64>>,
}

impl Trace {
    pub fn from_series(kind: ChartKind, series: &AggregateSeries, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            labels: series.labels(),
            values: series.values(),
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn to_json(&self) -> String {
        let (labels, values) = (self.labels.clone(), self.values.clone());
        match self.kind {
            ChartKind::Line => Scatter::new(labels, values)
                .mode(Mode::LinesMarkers)
                .name(self.name.as_str())
                .to_json(),
            ChartKind::Bar => Bar::new(labels, values).name(self.name.as_str()).to_json(),
            // pie slices are keyed by text
            ChartKind::Pie => Pie::new(values)
                .labels(labels.iter().map(ToString::to_string).collect())
                .name(self.name.as_str())
                .to_json(),
        }
    }
}

/// Serialize `traces` as a JSON array of Plotly trace objects, in order.
pub fn encode_traces(traces: &[Trace]) -> Result<String, EncodingError> {
    let mut data = Vec::with_capacity(traces.len());
    for trace in traces {
        if let Some(index) = trace
            .values
            .iter()
            .position(|v| v.map_or(false, |v| !v.is_finite()))
        {
            return Err(EncodingError::NonFinite {
                trace: trace.name.clone(),
                index,
            });
        }
        data.push(serde_json::from_str::<Value>(&trace.to_json())?);
    }
    Ok(serde_json::to_string(&data)?)
}
