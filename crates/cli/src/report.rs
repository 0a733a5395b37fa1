//! Report definitions loaded from YAML (or JSON) files.

use anyhow::{bail, Context, Result};
use dtable_stats::{DateGranularity, GroupOptions, StatisticsQuery, Summary};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A summary written either as `Amount:sum` or as a full mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryEntry {
    Short(String),
    Full(Summary),
}

impl SummaryEntry {
    fn into_summary(self) -> Result<Summary> {
        match self {
            SummaryEntry::Short(text) => text
                .parse()
                .map_err(|e: String| anyhow::anyhow!("Invalid summary '{text}': {e}")),
            SummaryEntry::Full(summary) => Ok(summary),
        }
    }
}

/// A grouped statistics report as described in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub table: Option<String>,
    pub view: Option<String>,
    pub group_by: Option<String>,
    pub date_granularity: Option<DateGranularity>,
    pub geo_granularity: Option<String>,
    #[serde(default)]
    pub summaries: Vec<SummaryEntry>,
}

/// A fully resolved report: where to read rows and how to group them.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub table: String,
    pub view: Option<String>,
    pub query: StatisticsQuery,
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid report file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay command-line values; set values win over the file's.
    pub fn merge(mut self, overrides: ReportConfig) -> Self {
        self.table = overrides.table.or(self.table);
        self.view = overrides.view.or(self.view);
        self.group_by = overrides.group_by.or(self.group_by);
        self.date_granularity = overrides.date_granularity.or(self.date_granularity);
        self.geo_granularity = overrides.geo_granularity.or(self.geo_granularity);
        if !overrides.summaries.is_empty() {
            self.summaries = overrides.summaries;
        }
        self
    }

    pub fn into_report(self) -> Result<Report> {
        let Some(table) = self.table else {
            bail!("No table given; pass --table or set `table` in the report file");
        };
        let Some(group_by) = self.group_by else {
            bail!("No grouping column given; pass --group-by or set `group_by` in the report file");
        };
        let summaries = self
            .summaries
            .into_iter()
            .map(SummaryEntry::into_summary)
            .collect::<Result<Vec<_>>>()?;
        // totals are keyed by column
        for (i, summary) in summaries.iter().enumerate() {
            if summaries[..i].iter().any(|s| s.column == summary.column) {
                bail!("Column {} is summarized more than once", summary.column);
            }
        }
        Ok(Report {
            table,
            view: self.view,
            query: StatisticsQuery {
                group_by,
                options: GroupOptions {
                    date_granularity: self.date_granularity,
                    geo_granularity: self.geo_granularity,
                },
                summaries,
            },
        })
    }
}
