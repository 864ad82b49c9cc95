//! Population data model: raw records as delivered by a [`DataSource`],
//! typed metric accessors, the filtered [`StatTable`] and the league-wide
//! [`PopulationAverages`].

mod source;

pub use source::{CsvSource, DataSource, JsonSource, SourceColumns, source_for_path};

use crate::error::StatError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row as delivered by a data source, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub name: String,
    pub team: String,
    /// One cell per [`RawTable::columns`] entry; `None` for blank or
    /// non-numeric cells.
    pub values: Vec<Option<f64>>,
}

/// Unfiltered population with named numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    records: Vec<RawRecord>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Append a record. Short rows are padded with `None`, long rows are cut
    /// to the column count.
    pub fn push(&mut self, name: impl Into<String>, team: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.columns.len(), None);
        self.records.push(RawRecord {
            name: name.into(),
            team: team.into(),
            values,
        });
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a column name into an accessor, once, up front.
    pub fn column(&self, name: &str) -> Result<MetricColumn, StatError> {
        self.columns
            .iter()
            .position(|col| col == name)
            .map(|index| MetricColumn {
                name: name.to_string(),
                index,
            })
            .ok_or_else(|| StatError::missing_metric(name, &self.columns))
    }
}

/// Validated accessor for one numeric column of a [`RawTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricColumn {
    name: String,
    index: usize,
}

impl MetricColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extract(&self, record: &RawRecord) -> Option<f64> {
        record
            .values
            .get(self.index)
            .copied()
            .flatten()
            .filter(|value| value.is_finite())
    }
}

/// The two metrics under comparison: `x` is plotted horizontally, `y`
/// vertically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPair {
    pub x: String,
    pub y: String,
}

impl MetricPair {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    fn resolve(&self, raw: &RawTable) -> Result<(MetricColumn, MetricColumn), StatError> {
        Ok((raw.column(&self.x)?, raw.column(&self.y)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: String,
    pub team: String,
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

/// Filtered population: every entity carries both metrics and meets the
/// participation threshold.
#[derive(Debug, Clone)]
pub struct StatTable {
    metrics: MetricPair,
    entities: Vec<Entity>,
}

impl StatTable {
    /// Resolve the metric and weight columns, then keep the records whose
    /// weight is at least `min_weight` and whose metric cells are present.
    pub fn filter(
        raw: &RawTable,
        metrics: &MetricPair,
        weight_column: &str,
        min_weight: f64,
    ) -> Result<Self, StatError> {
        let (x_col, y_col) = metrics.resolve(raw)?;
        let weight_col = raw.column(weight_column)?;

        let entities: Vec<Entity> = raw
            .records()
            .iter()
            .filter_map(|record| {
                let weight = weight_col.extract(record)?;
                if weight < min_weight {
                    return None;
                }
                Some(Entity {
                    name: record.name.clone(),
                    team: record.team.clone(),
                    x: x_col.extract(record)?,
                    y: y_col.extract(record)?,
                    weight,
                })
            })
            .collect();

        if entities.is_empty() {
            return Err(StatError::EmptyPopulation {
                weight_column: weight_column.to_string(),
                min_weight,
                total: raw.len(),
            });
        }
        debug!(
            kept = entities.len(),
            dropped = raw.len() - entities.len(),
            weight_column,
            min_weight,
            "filtered population"
        );
        Ok(Self {
            metrics: metrics.clone(),
            entities,
        })
    }

    /// Build a table from already-validated entities.
    pub fn from_entities(metrics: MetricPair, entities: Vec<Entity>) -> Self {
        Self { metrics, entities }
    }

    pub fn metrics(&self) -> &MetricPair {
        &self.metrics
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// League-wide means of both metrics, taken over the unfiltered population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationAverages {
    pub x: f64,
    pub y: f64,
}

impl PopulationAverages {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mean of each metric over every raw record; blank cells are skipped
    /// per metric.
    pub fn compute(raw: &RawTable, metrics: &MetricPair) -> Result<Self, StatError> {
        let (x_col, y_col) = metrics.resolve(raw)?;
        let mean = |col: &MetricColumn| -> Result<f64, StatError> {
            let (sum, count) = raw
                .records()
                .iter()
                .filter_map(|record| col.extract(record))
                .fold((0.0f64, 0usize), |(sum, count), value| (sum + value, count + 1));
            if count == 0 {
                return Err(StatError::no_values(col.name(), raw.len()));
            }
            Ok(sum / count as f64)
        };
        Ok(Self {
            x: mean(&x_col)?,
            y: mean(&y_col)?,
        })
    }
}
