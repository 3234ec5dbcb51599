//! Export settings records.
//!
//! Each exporter has a flat, serde-backed settings type. Records cross the
//! host boundary as `serde_json::Value` mappings and are validated on the
//! way in; a record that fails validation never reaches an exporter.

mod gerber;
mod pdf;
mod pnp;
mod step;

pub use gerber::{DrillMode, FabOutputSettings, GerberLayer};
pub use pdf::{PdfExportSettings, PdfLayer};
pub use pnp::{PnpColumn, PnpExportSettings, PnpMode};
pub use step::StepExportSettings;

use pcbkit_core::{ExportKind, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// A settings record exchanged with the host.
pub trait SettingsRecord: Serialize + DeserializeOwned {
    const KIND: ExportKind;

    /// Semantic checks run after decoding.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Serializes to a host-consumable mapping.
    fn to_record(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to serialize {} settings: {}", Self::KIND, err);
                Value::Object(Map::new())
            }
        }
    }

    /// Decodes and validates a record.
    fn from_record(record: &Value) -> Result<Self, ValidationError> {
        if !record.is_object() {
            return Err(ValidationError::NotAMapping {
                kind: Self::KIND,
                found: json_type_name(record).to_string(),
            });
        }
        let settings: Self = serde_json::from_value(record.clone())
            .map_err(|err| ValidationError::from_serde(Self::KIND, &err))?;
        settings.validate()?;
        Ok(settings)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

pub(crate) fn require_non_empty(
    kind: ExportKind,
    field: &str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(kind, field, "must not be empty"));
    }
    Ok(())
}
