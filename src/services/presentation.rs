//! Presentation rules: chart widget configuration, value formatting, table model

use std::str::FromStr;

use num_format::{Locale, ToFormattedString};
use serde_json::Value;

use crate::{
    middleware::error_handling::ChartError,
    models::{
        chart::{
            AxisOptions, AxisTick, ChartConfig, ChartData, ChartDataset, ChartKind,
            ChartOptions, ChartSeries, ColumnDescriptor, TableModel, TooltipOptions,
            ValueFormat,
        },
        query::Record,
    },
};

const Y_AXIS_TICK_COUNT: usize = 5;

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && *c != ' ')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            "doughnut" => Ok(ChartKind::Doughnut),
            "radar" => Ok(ChartKind::Radar),
            "polararea" => Ok(ChartKind::PolarArea),
            _ => Err(ChartError::UnknownChartKind(s.to_string())),
        }
    }
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Radar,
        ChartKind::PolarArea,
    ];

    /// Pie, doughnut and polar area charts have no cartesian y-axis.
    pub fn is_radial(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut | ChartKind::PolarArea)
    }

    /// Absent or blank selectors fall back to the default (line).
    pub fn parse_or_default(selector: Option<&str>) -> Result<Self, ChartError> {
        match selector.map(str::trim) {
            None | Some("") => Ok(ChartKind::default()),
            Some(s) => s.parse(),
        }
    }
}

impl ValueFormat {
    /// Currency when the dataset label mentions a subtotal or an amount.
    pub fn for_label(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("subtotal") || label.contains("amount") {
            ValueFormat::Currency
        } else {
            ValueFormat::Plain
        }
    }
}

/// `Plain`: thousands separators, at most two decimals (`1,234.5`).
/// `Currency`: `$`, thousands separators, exactly two decimals (`-$1,234.50`).
pub fn format_value(value: f64, format: ValueFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    // Integer parts too wide for u128 are left ungrouped
    let grouped = int_part
        .parse::<u128>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    match format {
        ValueFormat::Currency => format!("{sign}${grouped}.{frac_part}"),
        ValueFormat::Plain => {
            let frac = frac_part.trim_end_matches('0');
            if frac.is_empty() {
                format!("{sign}{grouped}")
            } else {
                format!("{sign}{grouped}.{frac}")
            }
        }
    }
}

/// Tooltip text for every point. The format is read from the label here and
/// again, separately, by `y_axis`.
pub fn tooltip_labels(dataset: &ChartDataset) -> Vec<String> {
    let format = ValueFormat::for_label(&dataset.label);
    dataset
        .values
        .iter()
        .map(|value| format!("{}: {}", dataset.label, format_value(*value, format)))
        .collect()
}

/// Evenly spaced ticks from min(0, smallest value) up to the largest value.
pub fn y_axis(dataset: &ChartDataset) -> AxisOptions {
    let format = ValueFormat::for_label(&dataset.label);

    let low = dataset.values.iter().copied().fold(0.0_f64, f64::min);
    let high = dataset.values.iter().copied().fold(0.0_f64, f64::max);
    let step = (high - low) / (Y_AXIS_TICK_COUNT - 1) as f64;

    let ticks = if step > 0.0 {
        (0..Y_AXIS_TICK_COUNT)
            .map(|i| {
                let value = low + step * i as f64;
                AxisTick {
                    value,
                    label: format_value(value, format),
                }
            })
            .collect()
    } else {
        vec![AxisTick {
            value: low,
            label: format_value(low, format),
        }]
    };

    AxisOptions {
        begin_at_zero: true,
        value_format: format,
        ticks,
    }
}

impl ChartConfig {
    pub fn render(dataset: &ChartDataset, kind: ChartKind) -> Self {
        let colors: Vec<String> = dataset.colors.iter().map(|c| c.to_css()).collect();

        let series = ChartSeries {
            label: dataset.label.clone(),
            data: dataset.values.clone(),
            background_color: colors.clone(),
            border_color: colors,
        };

        ChartConfig {
            kind,
            data: ChartData {
                labels: dataset.labels.clone(),
                datasets: vec![series],
            },
            options: ChartOptions {
                responsive: true,
                tooltip: TooltipOptions {
                    value_format: ValueFormat::for_label(&dataset.label),
                    labels: tooltip_labels(dataset),
                },
                y: (!kind.is_radial()).then(|| y_axis(dataset)),
            },
        }
    }
}

impl TableModel {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    /// The table is shown whenever it has both rows and columns, whether or
    /// not a chart was produced.
    pub fn is_renderable(&self) -> bool {
        !self.rows.is_empty() && !self.columns.is_empty()
    }

    /// Columns taken from the first row, in field order.
    pub fn from_records(rows: Vec<Record>) -> Self {
        let columns = rows
            .first()
            .map(|first| first.keys().map(|k| ColumnDescriptor::for_field(k)).collect())
            .unwrap_or_default();
        Self { columns, rows }
    }
}

pub fn cell_text(row: &Record, column: &ColumnDescriptor) -> String {
    match row.get(&column.accessor) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
