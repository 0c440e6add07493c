//! Declarative chart specifications handed to the plotting layer.

use novamart_core::{DashboardResult, Table};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

/// Upper bound on charts per page.
pub const MAX_CHARTS: usize = 10;

// ─── Chart specs ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Kpi,
    Line,
    Area,
    Bar,
    GroupedBar,
    StackedBar,
    Histogram,
    Box,
    Violin,
    Scatter,
    Pie,
    Donut,
    Sunburst,
    Treemap,
    Heatmap,
    Funnel,
    Table,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Which data columns map to which visual channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    pub data: Table,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Json>,
}

impl ChartSpec {
    pub fn new(id: impl Into<String>, kind: ChartKind, title: impl Into<String>, data: Table) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            data,
            encoding: Encoding::default(),
            options: Map::new(),
        }
    }

    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.encoding.x = Some(column.into());
        self
    }

    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.encoding.y = Some(column.into());
        self
    }

    pub fn color(mut self, column: impl Into<String>) -> Self {
        self.encoding.color = Some(column.into());
        self
    }

    /// Colour only when a column is given.
    pub fn color_opt(self, column: Option<&str>) -> Self {
        match column {
            Some(c) => self.color(c),
            None => self,
        }
    }

    pub fn size(mut self, column: impl Into<String>) -> Self {
        self.encoding.size = Some(column.into());
        self
    }

    pub fn text(mut self, column: impl Into<String>) -> Self {
        self.encoding.text = Some(column.into());
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.encoding.orientation = Orientation::Horizontal;
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }
}

// ─── Notices ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

// ─── Page report ────────────────────────────────────────────────────────────

/// Everything one page render produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageReport {
    pub page: String,
    pub charts: Vec<ChartSpec>,
    pub notices: Vec<Notice>,
}

impl PageReport {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            charts: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn push_chart(&mut self, chart: ChartSpec) {
        if self.charts.len() >= MAX_CHARTS {
            warn!(page = %self.page, chart = %chart.id, "Chart limit reached, dropping chart");
            return;
        }
        self.charts.push(chart);
    }

    pub fn notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notice(NoticeLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notice(NoticeLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.notice(NoticeLevel::Warning, message);
    }

    /// Record the outcome of one page section.
    ///
    /// Charts are pushed on success. A missing column becomes a
    /// "`what` data not available" warning; any other error is reported
    /// with its message. Nothing here propagates.
    pub fn section(&mut self, what: &str, result: DashboardResult<Vec<ChartSpec>>) {
        match result {
            Ok(charts) => charts.into_iter().for_each(|c| self.push_chart(c)),
            Err(err) if !err.is_fatal() => {
                debug!(page = %self.page, error = %err, "Section skipped, column missing");
                self.warning(format!("{what} data not available"));
            }
            Err(err) => {
                warn!(page = %self.page, error = %err, "Section failed");
                self.warning(format!("{what} could not be rendered: {err}"));
            }
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Notice> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Warning)
    }

    pub fn chart(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.id == id)
    }
}
