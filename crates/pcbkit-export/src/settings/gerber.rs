use super::{require_non_empty, SettingsRecord};
use pcbkit_core::{ExportKind, Layer, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How plated and non-plated holes are split across drill files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillMode {
    /// Every hole goes into the PTH file.
    #[default]
    Merged,
    /// Separate PTH and NPTH files.
    Individual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GerberLayer {
    /// Appended to the prefix to form the file name.
    pub filename: String,
    pub enabled: bool,
}

/// Fabrication output (Gerber + Excellon) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabOutputSettings {
    pub output_directory: String,
    pub prefix: String,
    pub layers: BTreeMap<Layer, GerberLayer>,
    pub drill_pth: String,
    pub drill_npth: String,
    pub drill_mode: DrillMode,
    /// Aperture used for the board outline, in nm.
    pub outline_width: u64,
    #[serde(default)]
    pub zip_output: bool,
}

impl FabOutputSettings {
    pub fn for_board(name: &str) -> Self {
        let layers = Layer::ALL
            .iter()
            .map(|&layer| {
                (
                    layer,
                    GerberLayer {
                        filename: default_extension(layer).to_string(),
                        enabled: true,
                    },
                )
            })
            .collect();
        Self {
            output_directory: "gerber".to_string(),
            prefix: name.to_string(),
            layers,
            drill_pth: "-PTH.drl".to_string(),
            drill_npth: "-NPTH.drl".to_string(),
            drill_mode: DrillMode::Merged,
            outline_width: 100_000,
            zip_output: false,
        }
    }

    /// Enabled layers in board stack order.
    pub fn enabled_layers(&self) -> impl Iterator<Item = (Layer, &GerberLayer)> + '_ {
        self.layers
            .iter()
            .filter(|(_, l)| l.enabled)
            .map(|(&layer, l)| (layer, l))
    }
}

fn default_extension(layer: Layer) -> &'static str {
    match layer {
        Layer::Outline => ".gko",
        Layer::TopSilkscreen => ".gto",
        Layer::TopMask => ".gts",
        Layer::TopCopper => ".gtl",
        Layer::BottomCopper => ".gbl",
        Layer::BottomMask => ".gbs",
        Layer::BottomSilkscreen => ".gbo",
    }
}

impl Default for FabOutputSettings {
    fn default() -> Self {
        Self::for_board("board")
    }
}

impl SettingsRecord for FabOutputSettings {
    const KIND: ExportKind = ExportKind::Gerber;

    fn validate(&self) -> Result<(), ValidationError> {
        let kind = Self::KIND;
        require_non_empty(kind, "output_directory", &self.output_directory)?;
        require_non_empty(kind, "drill_pth", &self.drill_pth)?;
        if self.drill_mode == DrillMode::Individual {
            require_non_empty(kind, "drill_npth", &self.drill_npth)?;
        }
        if self.outline_width == 0 {
            return Err(ValidationError::invalid(kind, "outline_width", "must be positive"));
        }

        let mut seen = BTreeSet::new();
        for (layer, settings) in self.enabled_layers() {
            let field = format!("layers.{}", serde_layer_name(layer));
            require_non_empty(kind, &field, &settings.filename)?;
            if !seen.insert(settings.filename.as_str()) {
                return Err(ValidationError::invalid(
                    kind,
                    field,
                    format!("file name '{}' is used twice", settings.filename),
                ));
            }
        }
        Ok(())
    }
}

fn serde_layer_name(layer: Layer) -> String {
    serde_json::to_value(layer)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| layer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_shape() {
        let record = FabOutputSettings::for_board("demo").to_record();
        assert_eq!(record["prefix"], "demo");
        assert_eq!(record["drill_mode"], "merged");
        assert_eq!(record["layers"]["top_copper"]["filename"], ".gtl");
    }

    #[test]
    fn test_missing_layers_field() {
        let mut record = FabOutputSettings::default().to_record();
        record.as_object_mut().unwrap().remove("layers");
        let err = FabOutputSettings::from_record(&record).unwrap_err();
        assert_eq!(err, ValidationError::missing(ExportKind::Gerber, "layers"));
    }

    #[test]
    fn test_zip_output_is_optional() {
        let mut record = FabOutputSettings::default().to_record();
        record.as_object_mut().unwrap().remove("zip_output");
        assert!(!FabOutputSettings::from_record(&record).unwrap().zip_output);
    }

    #[test]
    fn test_duplicate_filenames_rejected() {
        let mut record = FabOutputSettings::default().to_record();
        record["layers"]["bottom_copper"] = json!({"filename": ".gtl", "enabled": true});
        let err = FabOutputSettings::from_record(&record).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { .. }));
    }

    #[test]
    fn test_unknown_drill_mode_rejected() {
        let mut record = FabOutputSettings::default().to_record();
        record["drill_mode"] = json!("sideways");
        assert!(FabOutputSettings::from_record(&record).is_err());
    }
}
