// File-backed data sources. A leaderboard export (one row per player-season)
// is the reference input; remote fetching is left to callers.

use super::RawTable;
use crate::error::StatError;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Supplies the raw per-entity records for a season.
///
/// Failures are reported as [`StatError::DataSourceUnavailable`]; retrying is
/// the caller's business.
pub trait DataSource {
    fn describe(&self) -> String;
    fn fetch(&self, season: Option<u32>) -> Result<RawTable, StatError>;
}

/// Names of the identity columns in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    pub name: String,
    pub team: String,
    pub season: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            name: "Name".to_string(),
            team: "Team".to_string(),
            season: "Season".to_string(),
        }
    }
}

/// Pick a source implementation from the file extension (`.json` or CSV).
pub fn source_for_path(path: &Path, columns: SourceColumns) -> Box<dyn DataSource> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Box::new(JsonSource::new(path, columns))
    } else {
        Box::new(CsvSource::new(path, columns))
    }
}

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    columns: SourceColumns,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, columns: SourceColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    /// Parse CSV text with a header row. Every column other than the name and
    /// team columns is treated as numeric.
    pub fn parse<R: Read>(
        reader: R,
        columns: &SourceColumns,
        season: Option<u32>,
        origin: &str,
    ) -> Result<RawTable, StatError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|err| StatError::unavailable(origin, err))?
            .clone();

        let name_idx = headers
            .iter()
            .position(|h| h == columns.name)
            .ok_or_else(|| {
                StatError::unavailable(origin, format!("missing identity column `{}`", columns.name))
            })?;
        let team_idx = headers.iter().position(|h| h == columns.team);
        let season_idx = headers.iter().position(|h| h == columns.season);

        let numeric: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != name_idx && Some(*idx) != team_idx)
            .map(|(idx, h)| (idx, h.to_string()))
            .collect();
        let mut table = RawTable::new(numeric.iter().map(|(_, h)| h.clone()).collect());

        let mut skipped = 0usize;
        for row in csv_reader.records() {
            let row = row.map_err(|err| StatError::unavailable(origin, err))?;
            if let (Some(wanted), Some(idx)) = (season, season_idx)
                && row.get(idx).and_then(parse_cell) != Some(wanted as f64)
            {
                continue;
            }
            let Some(name) = row.get(name_idx).filter(|n| !n.is_empty()) else {
                skipped += 1;
                continue;
            };
            let team = team_idx.and_then(|idx| row.get(idx)).unwrap_or_default();
            let values = numeric
                .iter()
                .map(|(idx, _)| row.get(*idx).and_then(parse_cell))
                .collect();
            table.push(name, team, values);
        }
        if skipped > 0 {
            warn!(origin, skipped, "skipped rows without a name");
        }
        Ok(table)
    }
}

impl DataSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn fetch(&self, season: Option<u32>) -> Result<RawTable, StatError> {
        let origin = self.describe();
        let file = File::open(&self.path).map_err(|err| StatError::unavailable(&origin, err))?;
        let table = Self::parse(file, &self.columns, season, &origin)?;
        info!(origin = %origin, records = table.len(), "loaded batting records");
        Ok(table)
    }
}

/// Reads a JSON array of flat objects, one per entity.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
    columns: SourceColumns,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>, columns: SourceColumns) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    pub fn parse(
        text: &str,
        columns: &SourceColumns,
        season: Option<u32>,
        origin: &str,
    ) -> Result<RawTable, StatError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| StatError::unavailable(origin, err))?;
        let Value::Array(items) = value else {
            return Err(StatError::unavailable(origin, "expected a JSON array of records"));
        };

        let mut rows = Vec::with_capacity(items.len());
        for item in &items {
            let Value::Object(map) = item else {
                return Err(StatError::unavailable(origin, "expected every record to be an object"));
            };
            rows.push(map);
        }

        // Columns are collected in record key order, first appearance wins.
        let mut numeric: Vec<String> = Vec::new();
        for map in &rows {
            for (key, val) in map.iter() {
                if *key == columns.name || *key == columns.team {
                    continue;
                }
                if json_number(val).is_some() && !numeric.contains(key) {
                    numeric.push(key.clone());
                }
            }
        }

        let mut table = RawTable::new(numeric.clone());
        let mut skipped = 0usize;
        for map in rows {
            if let Some(wanted) = season
                && let Some(cell) = map.get(&columns.season)
                && json_number(cell) != Some(wanted as f64)
            {
                continue;
            }
            let Some(name) = map
                .get(&columns.name)
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
            else {
                skipped += 1;
                continue;
            };
            let team = map
                .get(&columns.team)
                .and_then(Value::as_str)
                .unwrap_or_default();
            let values = numeric
                .iter()
                .map(|key| map.get(key).and_then(json_number))
                .collect();
            table.push(name, team, values);
        }
        if skipped > 0 {
            warn!(origin, skipped, "skipped rows without a name");
        }
        Ok(table)
    }
}

impl DataSource for JsonSource {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    fn fetch(&self, season: Option<u32>) -> Result<RawTable, StatError> {
        let origin = self.describe();
        let text =
            std::fs::read_to_string(&self.path).map_err(|err| StatError::unavailable(&origin, err))?;
        let table = Self::parse(&text, &self.columns, season, &origin)?;
        info!(origin = %origin, records = table.len(), "loaded batting records");
        Ok(table)
    }
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_cell(s),
        _ => None,
    }
}

/// Numeric cell parser. Percent cells (`"41.2%"`, `"41.2 %"`) become
/// fractions so they match the scale of unformatted exports.
fn parse_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = if let Some(pct) = trimmed.strip_suffix('%') {
        pct.trim().parse::<f64>().ok()? / 100.0
    } else {
        trimmed.parse::<f64>().ok()?
    };
    value.is_finite().then_some(value)
}
