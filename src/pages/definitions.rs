// src/pages/definitions.rs
//
// Built-in page tables for the two dataset layouts.

use super::{ChartSpec, PageSpec};
use crate::aggregate::{GroupBy, Reduction};
use crate::chart::ChartKind;
use crate::config::Variant;

const CATEGORIES: &[&str] = &["Rape", "K&A", "DD", "AoW", "AoM", "DV", "WT"];
const OTHER_CATEGORIES: &[&str] = &["K&A", "DD", "AoW", "AoM", "DV", "WT"];

const TOTALS: &[&str] = &["Total Crimes"];
const DISTRIBUTION_TOTALS: &[&str] = &["Rape", "Other Crimes"];
const OTHER_TOTALS: &[&str] = &["Total Crimes", "Other Crimes"];

const fn growth_rate(columns: &'static [&'static str]) -> ChartSpec {
    ChartSpec {
        id: "growth_rate",
        title: "Year-over-Year Growth Rate (%)",
        kind: ChartKind::Line,
        group_by: GroupBy::Year,
        columns,
        reductions: &[Reduction::PercentChange],
        name: "{column}",
    }
}

const fn total_cases(columns: &'static [&'static str]) -> ChartSpec {
    ChartSpec {
        id: "total_cases",
        title: "Total Cases per Year",
        kind: ChartKind::Bar,
        group_by: GroupBy::Year,
        columns,
        reductions: &[Reduction::Sum],
        name: "{column}",
    }
}

const fn average_by_state(columns: &'static [&'static str]) -> ChartSpec {
    ChartSpec {
        id: "average_cases",
        title: "Average Cases by State",
        kind: ChartKind::Pie,
        group_by: GroupBy::State,
        columns,
        reductions: &[Reduction::Mean],
        name: "{column}",
    }
}

const RAPE_CASES: ChartSpec = ChartSpec {
    id: "rape_cases",
    title: "Average Rape Cases per Year",
    kind: ChartKind::Line,
    group_by: GroupBy::Year,
    columns: &["Rape"],
    reductions: &[Reduction::Mean],
    name: "Average Rape Cases",
};

const OTHER_CRIMES: ChartSpec = ChartSpec {
    id: "other_crimes",
    title: "Average Other Crimes per Year",
    kind: ChartKind::Line,
    group_by: GroupBy::Year,
    columns: &["Other Crimes"],
    reductions: &[Reduction::Mean],
    name: "Average Other Crimes",
};

const HIGHEST_RAPE: ChartSpec = ChartSpec {
    id: "highest_rape_cases",
    title: "Highest Rape Cases Each Year",
    kind: ChartKind::Bar,
    group_by: GroupBy::Year,
    columns: &["Rape"],
    reductions: &[Reduction::Max],
    name: "Highest Rape Cases Each Year",
};

const LOWEST_RAPE: ChartSpec = ChartSpec {
    id: "lowest_rape_cases",
    title: "Lowest Rape Cases Each Year",
    kind: ChartKind::Bar,
    group_by: GroupBy::Year,
    columns: &["Rape"],
    reductions: &[Reduction::Min],
    name: "Lowest Rape Cases Each Year",
};

const fn highest_lowest(columns: &'static [&'static str]) -> ChartSpec {
    ChartSpec {
        id: "highest_lowest_other_crimes",
        title: "Highest and Lowest Cases per Category",
        kind: ChartKind::Line,
        group_by: GroupBy::Year,
        columns,
        reductions: &[Reduction::Max, Reduction::Min],
        name: "{reduction} {column}",
    }
}

const HEADING: &str = "Crimes Against Women in India";

const CATEGORY_PAGES: &[PageSpec] = &[
    PageSpec {
        path: "/",
        title: "Home",
        heading: HEADING,
        charts: &[growth_rate(CATEGORIES), total_cases(CATEGORIES)],
    },
    PageSpec {
        path: "/overview",
        title: "Overview",
        heading: "Overview",
        charts: &[growth_rate(CATEGORIES), total_cases(CATEGORIES)],
    },
    PageSpec {
        path: "/crime-distribution",
        title: "Crime Distribution",
        heading: "Crime Distribution by State",
        charts: &[average_by_state(CATEGORIES)],
    },
    PageSpec {
        path: "/crime-categories",
        title: "Crime Categories",
        heading: "Crime Categories",
        charts: &[RAPE_CASES],
    },
    PageSpec {
        path: "/yearly-comparison",
        title: "Yearly Comparison",
        heading: "Yearly Comparison",
        charts: &[HIGHEST_RAPE, LOWEST_RAPE, highest_lowest(OTHER_CATEGORIES)],
    },
];

const TOTALS_PAGES: &[PageSpec] = &[
    PageSpec {
        path: "/",
        title: "Home",
        heading: HEADING,
        charts: &[],
    },
    PageSpec {
        path: "/overview",
        title: "Overview",
        heading: "Overview",
        charts: &[growth_rate(TOTALS), total_cases(TOTALS)],
    },
    PageSpec {
        path: "/crime-distribution",
        title: "Crime Distribution",
        heading: "Crime Distribution by State",
        charts: &[average_by_state(DISTRIBUTION_TOTALS)],
    },
    PageSpec {
        path: "/crime-categories",
        title: "Crime Categories",
        heading: "Crime Categories",
        charts: &[RAPE_CASES, OTHER_CRIMES],
    },
    PageSpec {
        path: "/yearly-comparison",
        title: "Yearly Comparison",
        heading: "Yearly Comparison",
        charts: &[HIGHEST_RAPE, LOWEST_RAPE, highest_lowest(OTHER_TOTALS)],
    },
];

pub fn default_pages(variant: Variant) -> &'static [PageSpec] {
    match variant {
        Variant::Categories => CATEGORY_PAGES,
        Variant::Totals => TOTALS_PAGES,
    }
}

/// Every numeric column referenced by `pages`, first-seen order, no duplicates.
pub fn required_columns(pages: &[PageSpec]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let all = pages
        .iter()
        .flat_map(|p| p.charts)
        .flat_map(|c| c.columns);
    for &column in all {
        if !out.iter().any(|c| c == column) {
            out.push(column.to_string());
        }
    }
    out
}
