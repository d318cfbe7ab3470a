//! Chart and table models derived from a query result

use serde::{Deserialize, Serialize};

use crate::models::query::Record;

// ============================================================================
// Colors
// ============================================================================

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, e.g. `rgb(74, 144, 226)`
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

// ============================================================================
// Shaped Result
// ============================================================================

/// One table column; header and accessor are both the result field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub header: String,
    pub accessor: String,
}

impl ColumnDescriptor {
    pub fn for_field(name: &str) -> Self {
        Self {
            header: name.to_string(),
            accessor: name.to_string(),
        }
    }
}

/// Chart-ready series. `labels`, `values`, `intensities` and `colors` all have
/// one entry per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    /// Display label: the value field's name
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub intensities: Vec<f64>,
    pub colors: Vec<Rgb>,
    pub max_value: f64,
}

impl ChartDataset {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// Chart Widget Configuration
// ============================================================================

/// Selectable chart types. Serialized with the chart widget's type names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
    Doughnut,
    Radar,
    PolarArea,
}

/// How values are printed in tooltips and axis ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Currency,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOptions {
    pub value_format: ValueFormat,
    /// Pre-formatted tooltip text, one per data point
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOptions {
    pub begin_at_zero: bool,
    pub value_format: ValueFormat,
    pub ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub tooltip: TooltipOptions,
    /// Absent for radial chart kinds (pie, doughnut, polar area)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub y: Option<AxisOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

// ============================================================================
// Table Widget
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableModel {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Record>,
}
