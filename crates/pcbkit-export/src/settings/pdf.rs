use super::{require_non_empty, SettingsRecord};
use pcbkit_core::{ExportKind, Layer, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfLayer {
    pub enabled: bool,
    /// RGB stroke/fill colour.
    pub color: [u8; 3],
    /// Fill closed shapes instead of stroking them.
    pub fill: bool,
}

/// Printable board drawing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfExportSettings {
    pub output_filename: String,
    pub layers: BTreeMap<Layer, PdfLayer>,
    /// Mirror horizontally (bottom view).
    pub mirror: bool,
    /// Draw layers bottom-up.
    pub reverse_layers: bool,
    /// Thinnest stroke drawn, in nm.
    pub min_line_width: u64,
    /// Draw reference designators.
    pub include_text: bool,
}

impl PdfExportSettings {
    pub fn for_board(name: &str) -> Self {
        let layers = Layer::ALL
            .iter()
            .map(|&layer| {
                let (enabled, color) = match layer {
                    Layer::Outline => (true, [0, 0, 0]),
                    Layer::TopCopper => (true, [200, 30, 30]),
                    Layer::BottomCopper => (true, [30, 30, 200]),
                    Layer::TopSilkscreen => (true, [90, 90, 90]),
                    _ => (false, [128, 128, 128]),
                };
                (
                    layer,
                    PdfLayer {
                        enabled,
                        color,
                        fill: layer.is_copper(),
                    },
                )
            })
            .collect();
        Self {
            output_filename: format!("{}.pdf", name),
            layers,
            mirror: false,
            reverse_layers: false,
            min_line_width: 100_000,
            include_text: true,
        }
    }
}

impl Default for PdfExportSettings {
    fn default() -> Self {
        Self::for_board("board")
    }
}

impl SettingsRecord for PdfExportSettings {
    const KIND: ExportKind = ExportKind::Pdf;

    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty(Self::KIND, "output_filename", &self.output_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_mirror() {
        let mut record = PdfExportSettings::default().to_record();
        record.as_object_mut().unwrap().remove("mirror");
        assert_eq!(
            PdfExportSettings::from_record(&record).unwrap_err(),
            ValidationError::missing(ExportKind::Pdf, "mirror")
        );
    }

    #[test]
    fn test_color_must_be_rgb_triple() {
        let mut record = PdfExportSettings::default().to_record();
        record["layers"]["outline"]["color"] = json!("black");
        let err = PdfExportSettings::from_record(&record).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { kind: ExportKind::Pdf, .. }));
    }

    #[test]
    fn test_blank_filename_rejected() {
        let mut record = PdfExportSettings::default().to_record();
        record["output_filename"] = json!("  ");
        assert!(matches!(
            PdfExportSettings::from_record(&record).unwrap_err(),
            ValidationError::InvalidField { .. }
        ));
    }
}
