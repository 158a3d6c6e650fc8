// src/pages/mod.rs
use askama::Template;
use tracing::{debug, warn};

use crate::aggregate::{aggregate, GroupBy, Reduction};
use crate::chart::{encode_traces, ChartKind, Trace};
use crate::dataset::CrimeTable;
use crate::error::{EncodingError, PageError};

pub mod definitions;

pub use definitions::{default_pages, required_columns};

/// One chart on a page: every (column, reduction) pair becomes a trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSpec {
    /// DOM id and payload slot.
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
    pub group_by: GroupBy,
    pub columns: &'static [&'static str],
    pub reductions: &'static [Reduction],
    /// Trace name; `{column}` and `{reduction}` are substituted.
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub path: &'static str,
    pub title: &'static str,
    pub heading: &'static str,
    pub charts: &'static [ChartSpec],
}

impl PageSpec {
    /// File stem used when the page is exported: `/` is `index`.
    pub fn slug(&self) -> &'static str {
        match self.path.trim_start_matches('/') {
            "" => "index",
            s => s,
        }
    }
}

/// A computed chart ready to be embedded in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub id: &'static str,
    pub title: &'static str,
    pub payload: String,
}

impl ChartSpec {
    /// Compute the chart's traces, column-major: for each column, each reduction.
    pub fn traces(&self, table: &CrimeTable) -> Vec<Trace> {
        let mut traces = Vec::with_capacity(self.columns.len() * self.reductions.len());
        for &column in self.columns {
            for &reduction in self.reductions {
                let Some(series) = aggregate(table, self.group_by, column, reduction) else {
                    warn!(chart = self.id, column, "column not in dataset; skipping");
                    continue;
                };
                let name = self
                    .name
                    .replace("{column}", column)
                    .replace("{reduction}", reduction.label());
                traces.push(Trace::from_series(self.kind, &series, name));
            }
        }
        traces
    }

    pub fn render(&self, table: &CrimeTable) -> Result<RenderedChart, EncodingError> {
        let traces = self.traces(table);
        let payload = encode_traces(&traces)?;
        debug!(chart = self.id, traces = traces.len(), bytes = payload.len(), "encoded chart");
        Ok(RenderedChart {
            id: self.id,
            title: self.title,
            // keep the payload from closing its <script> element; `\/` is a valid JSON escape
            payload: payload.replace("</", "<\\/"),
        })
    }
}

/// How navigation links point at other pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// Server routes, e.g. `/overview`.
    Routes,
    /// Sibling exported files, e.g. `overview.html`.
    Files,
}

struct NavLink {
    href: String,
    title: &'static str,
    active: bool,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    title: &'a str,
    heading: &'a str,
    nav: Vec<NavLink>,
    charts: Vec<RenderedChart>,
}

/// Compute every chart on `page` and render the full HTML document.
/// `site` supplies the navigation links.
pub fn render_page(
    table: &CrimeTable,
    site: &[PageSpec],
    page: &PageSpec,
    links: LinkStyle,
) -> Result<String, PageError> {
    let charts = page
        .charts
        .iter()
        .map(|chart| chart.render(table))
        .collect::<Result<Vec<_>, _>>()?;

    let nav = site
        .iter()
        .map(|p| NavLink {
            href: match links {
                LinkStyle::Routes => p.path.to_string(),
                LinkStyle::Files => format!("{}.html", p.slug()),
            },
            title: p.title,
            active: p.path == page.path,
        })
        .collect();

    let html = PageTemplate {
        title: page.title,
        heading: page.heading,
        nav,
        charts,
    }
    .render()?;
    Ok(html)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::dataset::CrimeRecord;
    use serde_json::Value;

    /// Small table carrying the columns of both variants.
    pub(crate) fn sample_table() -> CrimeTable {
        let columns: Vec<String> = [
            "Rape",
            "K&A",
            "DD",
            "AoW",
            "AoM",
            "DV",
            "WT",
            "Total Crimes",
            "Other Crimes",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let row = |year, state: &str, base: f64| CrimeRecord {
            year,
            state: state.to_string(),
            counts: (0..columns.len()).map(|i| base + i as f64).collect(),
        };
        let records = vec![
            row(2010, "ASSAM", 100.0),
            row(2010, "GOA", 10.0),
            row(2011, "ASSAM", 140.0),
            row(2011, "GOA", 20.0),
            row(2012, "ASSAM", 90.0),
        ];
        CrimeTable::new(columns, records)
    }

    /// Pull the JSON payload for chart `id` out of a rendered page.
    pub(crate) fn extract_payload(html: &str, id: &str) -> Value {
        let marker = format!("id=\"chart-{id}-data\">");
        let start = html.find(&marker).expect("payload marker") + marker.len();
        let end = start + html[start..].find("</script>").expect("closing script");
        serde_json::from_str(&html[start..end]).expect("payload is valid JSON")
    }

    fn names(payload: &Value) -> Vec<String> {
        payload
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_highest_lowest_interleaved() {
        let chart = definitions::default_pages(Variant::Categories)[4].charts[2];
        let traces = chart.traces(&sample_table());
        let names: Vec<&str> = traces.iter().map(|t| t.name()).collect();
        assert_eq!(
            &names[..4],
            &["Highest K&A", "Lowest K&A", "Highest DD", "Lowest DD"]
        );
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_missing_column_skipped() {
        let table = CrimeTable::new(vec!["Rape".into()], sample_table().records()[..1].to_vec());
        let chart = definitions::default_pages(Variant::Categories)[1].charts[1];
        let traces = chart.traces(&table);
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].name(), "Rape");
    }

    #[test]
    fn test_every_page_renders_valid_payloads() {
        let table = sample_table();
        for variant in [Variant::Categories, Variant::Totals] {
            let site = default_pages(variant);
            for page in site {
                let html = render_page(&table, site, page, LinkStyle::Routes).unwrap();
                assert!(html.contains(page.heading));
                for chart in page.charts {
                    let payload = extract_payload(&html, chart.id);
                    assert!(!payload.as_array().unwrap().is_empty(), "{}", chart.id);
                }
            }
        }
    }

    #[test]
    fn test_growth_rate_payload() {
        let table = sample_table();
        let site = default_pages(Variant::Totals);
        let html = render_page(&table, site, &site[1], LinkStyle::Routes).unwrap();
        let payload = extract_payload(&html, "growth_rate");

        // Total Crimes per year: 2010 = 107 + 17, 2011 = 147 + 27, 2012 = 97
        assert_eq!(names(&payload), vec!["Total Crimes"]);
        assert_eq!(payload[0]["type"], "scatter");
        assert_eq!(payload[0]["x"], serde_json::json!([2010, 2011, 2012]));
        assert!(payload[0]["y"][0].is_null());
        let y1 = payload[0]["y"][1].as_f64().unwrap();
        assert!((y1 - (174.0 - 124.0) / 124.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_pies_per_category() {
        let table = sample_table();
        let site = default_pages(Variant::Categories);
        let html = render_page(&table, site, &site[2], LinkStyle::Routes).unwrap();
        let payload = extract_payload(&html, "average_cases");

        assert_eq!(
            names(&payload),
            vec!["Rape", "K&A", "DD", "AoW", "AoM", "DV", "WT"]
        );
        assert_eq!(payload[0]["labels"], serde_json::json!(["ASSAM", "GOA"]));
        // ASSAM Rape: (100 + 140 + 90) / 3
        assert_eq!(payload[0]["values"][0].as_f64().unwrap(), 110.0);
    }

    #[test]
    fn test_script_close_is_escaped() {
        let mut records = sample_table().records()[..1].to_vec();
        records[0].state = "</script><b>".into();
        let table = CrimeTable::new(sample_table().columns().to_vec(), records);
        let chart = definitions::default_pages(Variant::Categories)[2].charts[0];

        let rendered = chart.render(&table).unwrap();
        assert!(!rendered.payload.contains("</script>"));
        let payload: Value = serde_json::from_str(&rendered.payload).unwrap();
        assert_eq!(payload[0]["labels"][0], "</script><b>");
    }

    #[test]
    fn test_file_links() {
        let table = sample_table();
        let site = default_pages(Variant::Totals);
        let html = render_page(&table, site, &site[3], LinkStyle::Files).unwrap();

        assert!(html.contains(r#"href="index.html""#));
        assert!(html.contains(r#"href="crime-categories.html" class="active""#));
    }

    #[test]
    fn test_slug() {
        let site = default_pages(Variant::Categories);
        let slugs: Vec<&str> = site.iter().map(|p| p.slug()).collect();
        assert_eq!(
            slugs,
            vec![
                "index",
                "overview",
                "crime-distribution",
                "crime-categories",
                "yearly-comparison"
            ]
        );
    }
}
