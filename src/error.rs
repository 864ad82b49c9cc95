use thiserror::Error;

/// Fatal input errors raised before any selection or layout work happens.
///
/// The layout engine itself never fails, so this is the only error type the
/// library surface returns.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    #[error("metric `{metric}` not found in source data (available columns: {available})")]
    MissingMetric { metric: String, available: String },

    /// `min_weight` is negative infinity when no threshold was involved and
    /// `weight_column` is simply a metric with no values at all.
    #[error("{}", empty_population_message(.weight_column, .min_weight, .total))]
    EmptyPopulation {
        weight_column: String,
        min_weight: f64,
        total: usize,
    },

    #[error("data source {origin} unavailable: {reason}")]
    DataSourceUnavailable { origin: String, reason: String },
}

impl StatError {
    pub(crate) fn missing_metric(metric: &str, columns: &[String]) -> Self {
        let available = if columns.is_empty() {
            "<none>".to_string()
        } else {
            columns.join(", ")
        };
        StatError::MissingMetric {
            metric: metric.to_string(),
            available,
        }
    }

    pub(crate) fn no_values(metric: &str, total: usize) -> Self {
        StatError::EmptyPopulation {
            weight_column: metric.to_string(),
            min_weight: f64::NEG_INFINITY,
            total,
        }
    }

    pub(crate) fn unavailable(origin: impl Into<String>, reason: impl ToString) -> Self {
        StatError::DataSourceUnavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}

fn empty_population_message(column: &str, min_weight: &f64, total: &usize) -> String {
    if *min_weight == f64::NEG_INFINITY {
        format!("metric `{column}` has no values in any of {total} records")
    } else {
        format!(
            "no records left out of {total} after requiring {column} >= {min_weight} and both metrics present"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metric_lists_available_columns() {
        let err = StatError::missing_metric("wOBA", &["PA".to_string(), "ISO".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("wOBA"), "{msg}");
        assert!(msg.contains("PA, ISO"), "{msg}");
    }

    #[test]
    fn empty_population_names_threshold() {
        let err = StatError::EmptyPopulation {
            weight_column: "PA".to_string(),
            min_weight: 500.0,
            total: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("PA >= 500"), "{msg}");
        assert!(msg.contains("12"), "{msg}");
    }

    #[test]
    fn metric_without_values_is_named_without_a_threshold() {
        let msg = StatError::no_values("ISO", 7).to_string();
        assert_eq!(msg, "metric `ISO` has no values in any of 7 records");
        assert!(!msg.contains("inf"), "{msg}");
    }
}
