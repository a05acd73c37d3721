use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mode: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        Self {
            min: min(values),
            max: max(values),
            median: median(values),
            mode: mode(values),
            variance: variance(values),
            std_dev: standard_deviation(values),
        }
    }
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent value; ties go to the smallest candidate.
pub fn mode(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for value in values {
        // -0.0 and 0.0 count as the same value
        let normalized = value + 0.0;
        counts.entry(normalized.to_bits()).or_insert((normalized, 0)).1 += 1;
    }
    let max_count = counts.values().map(|(_, count)| *count).max().unwrap_or(0);
    counts
        .values()
        .filter(|(_, count)| *count == max_count)
        .map(|(value, _)| *value)
        .fold(f64::INFINITY, f64::min)
}

/// Population variance.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

pub fn standard_deviation(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Splits a payload into columns by field name and summarizes every column
/// holding at least one finite number. Arrays of records contribute one value
/// per record, a single object contributes one value per field.
pub fn summarize(data: &Value) -> BTreeMap<String, Summary> {
    let mut columns: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    match data {
        Value::Array(items) => {
            for record in items.iter().filter_map(Value::as_object) {
                push_record(&mut columns, record);
            }
        }
        Value::Object(record) => push_record(&mut columns, record),
        _ => {}
    }
    columns
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| (key.to_string(), Summary::of(&values)))
        .collect()
}

fn push_record<'a>(
    columns: &mut BTreeMap<&'a str, Vec<f64>>,
    record: &'a serde_json::Map<String, Value>,
) {
    for (key, value) in record {
        let column = columns.entry(key.as_str()).or_default();
        if let Some(number) = value.as_f64().filter(|n| n.is_finite()) {
            column.push(number);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_mode_tie_breaks_to_smallest() {
        assert_eq!(mode(&[1.0, 1.0, 2.0, 2.0]), 1.0);
        assert_eq!(mode(&[5.0, 3.0, 5.0, 3.0, 9.0]), 3.0);
        assert_eq!(mode(&[7.0, 2.0, 7.0]), 7.0);
        assert_eq!(mode(&[0.0, -0.0, 4.0]), 0.0);
    }

    #[test]
    fn test_population_variance() {
        assert_eq!(variance(&[2.0, 4.0]), 1.0);
        assert_eq!(standard_deviation(&[2.0, 4.0]), 1.0);
        assert_eq!(variance(&[5.0]), 0.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min(&[3.0, -1.5, 8.0]), -1.5);
        assert_eq!(max(&[3.0, -1.5, 8.0]), 8.0);
    }

    #[test]
    fn test_empty_input_is_nan() {
        let summary = Summary::of(&[]);
        assert!(summary.min.is_nan());
        assert!(summary.max.is_nan());
        assert!(summary.median.is_nan());
        assert!(summary.mode.is_nan());
        assert!(summary.variance.is_nan());
        assert!(summary.std_dev.is_nan());
    }

    #[test]
    fn test_summarize_records() {
        let data = json!([
            {"passing_yards": 200, "player": "A", "tds": 1},
            {"passing_yards": 300, "player": "B", "tds": "n/a"},
            {"passing_yards": 100, "player": "C"}
        ]);
        let summary = summarize(&data);
        assert_eq!(summary.len(), 2);
        assert!(!summary.contains_key("player"));

        let yards = summary["passing_yards"];
        assert_eq!(yards.min, 100.0);
        assert_eq!(yards.max, 300.0);
        assert_eq!(yards.median, 200.0);
        assert_eq!(yards.mode, 100.0);

        let tds = summary["tds"];
        assert_eq!(tds.min, 1.0);
        assert_eq!(tds.variance, 0.0);
    }

    #[test]
    fn test_summarize_single_object() {
        let data = json!({"wins": 10, "losses": 7, "ties": 0, "gamesCounted": 17});
        let summary = summarize(&data);
        assert_eq!(summary.len(), 4);
        assert_eq!(summary["wins"].median, 10.0);
        assert_eq!(summary["gamesCounted"].std_dev, 0.0);
    }

    #[test]
    fn test_summarize_non_numeric_payload() {
        assert!(summarize(&json!({"Patrick Mahomes": "00-0033873"})).is_empty());
        assert!(summarize(&json!("text")).is_empty());
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let json = serde_json::to_value(Summary::of(&[])).unwrap();
        assert_eq!(json["median"], Value::Null);
    }
}
