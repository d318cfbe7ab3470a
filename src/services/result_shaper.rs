/// Result Shaper - turns query rows into a chart dataset and table columns
///
/// The category axis and value axis are named by a `ResultSchema`. When the
/// caller has no schema, `ResultSchema::infer` takes the first and second
/// columns of the first row.

use serde_json::Value;

use crate::{
    middleware::error_handling::ChartError,
    models::{chart::{ChartDataset, ColumnDescriptor}, query::Record},
    services::color::ChartPalette,
};

/// Named result fields plus the two that drive the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSchema {
    pub fields: Vec<String>,
    pub category: String,
    pub value: String,
}

impl ResultSchema {
    pub fn new(
        fields: Vec<String>,
        category: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ChartError> {
        let category = category.into();
        let value = value.into();

        for name in [&category, &value] {
            if !fields.contains(name) {
                return Err(ChartError::UnknownField(name.clone()));
            }
        }

        Ok(Self { fields, category, value })
    }

    /// First column is the category axis, second column the value axis.
    pub fn infer(records: &[Record]) -> Result<Self, ChartError> {
        let first = records.first().ok_or(ChartError::EmptyResult)?;
        let fields: Vec<String> = first.keys().cloned().collect();

        if fields.len() < 2 {
            return Err(ChartError::MissingValueField { found: fields.len() });
        }

        let category = fields[0].clone();
        let value = fields[1].clone();
        Ok(Self { fields, category, value })
    }

    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        self.fields
            .iter()
            .map(|name| ColumnDescriptor::for_field(name))
            .collect()
    }
}

/// A chart dataset together with the table columns for the same rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedResult {
    pub schema: ResultSchema,
    pub dataset: ChartDataset,
    pub columns: Vec<ColumnDescriptor>,
}

/// Shape rows using the schema inferred from the first row.
pub fn shape(records: &[Record], palette: &ChartPalette) -> Result<ShapedResult, ChartError> {
    let schema = ResultSchema::infer(records)?;
    shape_with_schema(records, schema, palette)
}

pub fn shape_with_schema(
    records: &[Record],
    schema: ResultSchema,
    palette: &ChartPalette,
) -> Result<ShapedResult, ChartError> {
    if records.is_empty() {
        return Err(ChartError::EmptyResult);
    }

    let mut labels = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        labels.push(category_label(record.get(&schema.category)));

        let raw = record.get(&schema.value).unwrap_or(&Value::Null);
        let value = coerce_number(raw).ok_or_else(|| ChartError::NonNumericValue {
            row,
            field: schema.value.clone(),
            raw: display_raw(raw),
        })?;
        values.push(value);
    }

    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let intensities: Vec<f64> = values
        .iter()
        .map(|value| intensity(*value, max_value))
        .collect();
    let colors = intensities
        .iter()
        .map(|intensity| palette.color_for(*intensity))
        .collect();

    let dataset = ChartDataset {
        label: schema.value.clone(),
        labels,
        values,
        intensities,
        colors,
        max_value,
    };

    Ok(ShapedResult {
        columns: schema.columns(),
        schema,
        dataset,
    })
}

/// Numbers pass through; strings keep only digits, `-` and `.` before parsing,
/// so `"$1,234.56"` is 1234.56 and `"-$50"` is -50.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
                .collect();
            cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// `value / max`, or 0 when the maximum is not positive.
fn intensity(value: f64, max_value: f64) -> f64 {
    if max_value > 0.0 {
        value / max_value
    } else {
        0.0
    }
}

fn category_label(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
