//! Column Reconciler - fuzzy matching of inbound columns to a model's
//! trained feature list (branch-performance service)
//!
//! Each expected column resolves through an ordered cascade of named
//! strategies, stopping at the first success:
//!
//! 1. exact name match
//! 2. encoded-suffix lookup (`X_encoded` -> source `X` + encoder)
//! 3. punctuation-normalized match
//! 4. token-subset match
//! 5. arrears-ratio special case (computed from located operands)
//!
//! An expected column no strategy can satisfy is a client-correctable
//! error naming the column.

use std::collections::HashMap;

use crate::logic::model::bundle::Encoder;
use crate::logic::record::Record;
use crate::logic::PipelineError;

/// Suffix marking a trained column as the encoded form of a raw field.
const ENCODED_SUFFIX: &str = "_encoded";

/// Trained column name of the derived arrears ratio.
const ARREARS_RATIO_COLUMN: &str = "Arrears_Ratio";

/// Explicit NPL status codes. This reserved field never goes through a
/// trained encoder; unknown statuses code to 0.
fn npl_code(raw: &str) -> i64 {
    match raw.trim().to_ascii_uppercase().as_str() {
        "N" => 1,
        "P" => 0,
        _ => 0,
    }
}

/// Lowercase a name and strip everything non-alphanumeric.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Alphanumeric tokens of a name, keeping only tokens longer than 2 chars.
fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Locate a source column by exact, normalized, then token-subset match.
fn find_column<'a>(name: &str, available: &'a [String]) -> Option<&'a String> {
    if let Some(found) = available.iter().find(|c| c.as_str() == name) {
        return Some(found);
    }
    let target = normalize_name(name);
    if let Some(found) = available.iter().find(|c| normalize_name(c) == target) {
        return Some(found);
    }
    let tokens = name_tokens(name);
    if tokens.is_empty() {
        return None;
    }
    available.iter().find(|c| {
        let lowered = c.to_ascii_lowercase();
        tokens.iter().all(|t| lowered.contains(t.as_str()))
    })
}

/// How one expected column gets its values.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Copy a source column as-is.
    Direct { source: String },
    /// Apply a trained encoder to a source column.
    Encoded { source: String, encoder: Encoder },
    /// Explicit two-value NPL status mapping on a source column.
    NplStatus { source: String },
    /// Compute (capital + interest) / (facility + 1) from located operands.
    /// Unlocated operands contribute 0 per row.
    ArrearsRatio {
        capital: Option<String>,
        interest: Option<String>,
        facility: Option<String>,
    },
}

/// Resolve one expected column against the available column names.
pub fn resolve_column(
    expected: &str,
    available: &[String],
    encoders: &HashMap<String, Encoder>,
) -> Result<Resolution, PipelineError> {
    // 1. Exact match.
    if available.iter().any(|c| c == expected) {
        return Ok(Resolution::Direct { source: expected.to_string() });
    }

    // 2. Encoded-suffix lookup.
    if let Some(source_name) = expected.strip_suffix(ENCODED_SUFFIX) {
        if let Some(source) = find_column(source_name, available) {
            if source_name == "NPLStatus" {
                return Ok(Resolution::NplStatus { source: source.clone() });
            }
            if let Some(encoder) = encoders.get(source_name) {
                return Ok(Resolution::Encoded {
                    source: source.clone(),
                    encoder: encoder.clone(),
                });
            }
            // No trained encoder: pass the source through untouched,
            // assuming the caller already sends encoded values.
            return Ok(Resolution::Direct { source: source.clone() });
        }
        return Err(PipelineError::MissingColumn(expected.to_string()));
    }

    // 3. Normalized match.
    let target = normalize_name(expected);
    if let Some(found) = available.iter().find(|c| normalize_name(c) == target) {
        return Ok(Resolution::Direct { source: found.clone() });
    }

    // 4. Token-subset match.
    let tokens = name_tokens(expected);
    if !tokens.is_empty() {
        if let Some(found) = available.iter().find(|c| {
            let lowered = c.to_ascii_lowercase();
            tokens.iter().all(|t| lowered.contains(t.as_str()))
        }) {
            return Ok(Resolution::Direct { source: found.clone() });
        }
    }

    // 5. Derived arrears ratio.
    if expected == ARREARS_RATIO_COLUMN {
        return Ok(Resolution::ArrearsRatio {
            capital: find_column("ArrearsCapital", available).cloned(),
            interest: find_column("ArrearsInterest", available).cloned(),
            facility: find_column("FacilityAmount", available).cloned(),
        });
    }

    Err(PipelineError::MissingColumn(expected.to_string()))
}

fn materialize(resolution: &Resolution, row: &Record) -> f64 {
    match resolution {
        Resolution::Direct { source } => row.num_or(source, 0.0),
        Resolution::Encoded { source, encoder } => {
            let raw = match row.get(source) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            encoder.code(&raw) as f64
        }
        Resolution::NplStatus { source } => {
            npl_code(row.text(source).unwrap_or("")) as f64
        }
        Resolution::ArrearsRatio { capital, interest, facility } => {
            let get = |name: &Option<String>| {
                name.as_deref().map(|n| row.num_or(n, 0.0)).unwrap_or(0.0)
            };
            (get(capital) + get(interest)) / (get(facility) + 1.0)
        }
    }
}

/// Reconcile a table of raw records against the trained column list.
///
/// Returns one numeric row per record, columns in `expected` order.
/// Fails with [`PipelineError::MissingColumn`] naming the first expected
/// column no strategy can satisfy.
pub fn reconcile(
    rows: &[Record],
    expected: &[String],
    encoders: &HashMap<String, Encoder>,
) -> Result<Vec<Vec<f64>>, PipelineError> {
    let available: Vec<String> = rows
        .iter()
        .flat_map(|r| r.field_names().map(str::to_string))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let resolutions = expected
        .iter()
        .map(|column| resolve_column(column, &available, encoders))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .iter()
        .map(|row| resolutions.iter().map(|r| materialize(r, row)).collect())
        .collect())
}
