pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pages;
pub mod server;

pub use aggregate::{aggregate, AggregateSeries, GroupBy, GroupLabel, Reduction};
pub use chart::{encode_traces, ChartKind, Trace};
pub use config::{DashboardConfig, Variant};
pub use dataset::{load_table, CrimeRecord, CrimeTable};
pub use error::{DataLoadError, EncodingError, PageError};
