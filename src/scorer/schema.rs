//! Canonical stat schema.
//!
//! Providers disagree on key casing (`fgm` vs `FGM`) and on names (`FG3M` vs `TPM`
//! vs `3PM`). Records are first normalized with [`normalize_keys`], then each
//! canonical field is resolved through its alias list in [`StatField::aliases`].

use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::types::StatLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Min,
    Fgm,
    Fga,
    Fg3m,
    Fg3a,
    Ftm,
    Fta,
    Oreb,
    Dreb,
    Ast,
    Stl,
    Blk,
    Tov,
    Pts,
    WPct,
}

impl StatField {
    /// Canonical name, used in error messages.
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Uppercase keys accepted for this field, in lookup order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            StatField::Min => &["MIN"],
            StatField::Fgm => &["FGM"],
            StatField::Fga => &["FGA"],
            StatField::Fg3m => &["FG3M", "TPM", "3PM"],
            StatField::Fg3a => &["FG3A", "TPA", "3PA"],
            StatField::Ftm => &["FTM"],
            StatField::Fta => &["FTA"],
            StatField::Oreb => &["OREB"],
            StatField::Dreb => &["DREB"],
            StatField::Ast => &["AST"],
            StatField::Stl => &["STL"],
            StatField::Blk => &["BLK"],
            StatField::Tov => &["TOV"],
            StatField::Pts => &["PTS"],
            StatField::WPct => &["W_PCT"],
        }
    }

    /// Look the field up under any alias. `Ok(None)` when absent or null.
    pub fn read(self, record: &Map<String, Value>) -> Result<Option<f64>> {
        let Some(value) = self.aliases().iter().find_map(|k| record.get(*k)) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_f64().map(Some).ok_or_else(|| self.invalid(value)),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s.trim().parse::<f64>().map(Some).map_err(|_| self.invalid(value)),
            _ => Err(self.invalid(value)),
        }
    }

    fn required(self, record: &Map<String, Value>) -> Result<f64> {
        self.read(record)?.ok_or(AppError::MissingStat(self.name()))
    }

    fn invalid(self, value: &Value) -> AppError {
        AppError::InvalidStat {
            field: self.name(),
            value: value.to_string(),
        }
    }
}

impl StatLine {
    /// Map a normalized (uppercase-keyed) record onto the canonical field set.
    ///
    /// Counting stats are required. `FG3M` and `W_PCT` default to zero; `MIN` and
    /// `FG3A` are display-only and stay `None` when absent.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            min: StatField::Min.read(record)?,
            fgm: StatField::Fgm.required(record)?,
            fga: StatField::Fga.required(record)?,
            fg3m: StatField::Fg3m.read(record)?.unwrap_or(0.0),
            fg3a: StatField::Fg3a.read(record)?,
            ftm: StatField::Ftm.required(record)?,
            fta: StatField::Fta.required(record)?,
            oreb: StatField::Oreb.required(record)?,
            dreb: StatField::Dreb.required(record)?,
            ast: StatField::Ast.required(record)?,
            stl: StatField::Stl.required(record)?,
            blk: StatField::Blk.required(record)?,
            tov: StatField::Tov.required(record)?,
            pts: StatField::Pts.required(record)?,
            w_pct: StatField::WPct.read(record)?.unwrap_or(0.0),
            milestone: None,
        })
    }
}

/// Uppercase every object key, descending into nested objects and arrays.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(normalize_record(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

pub fn normalize_record(record: Map<String, Value>) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(k, v)| (k.to_uppercase(), normalize_keys(v)))
        .collect()
}
