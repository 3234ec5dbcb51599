//! Export pipeline entry points.
//!
//! Each `export_*` call decodes the host's settings record first; a record
//! that fails validation returns [`ExportError::Validation`] before any file
//! is touched. Generation failures come back as [`ExportError::Generation`]
//! and a failing progress callback as [`ExportError::CallbackAbort`],
//! carrying the callback's own error unchanged.

use crate::board::Board;
use crate::exporters::{export_pdf, export_pnp, export_step, GerberExporter};
use crate::pool::Pool;
use crate::settings::{
    FabOutputSettings, PdfExportSettings, PnpExportSettings, SettingsRecord, StepExportSettings,
};
use pcbkit_core::{CallbackAbort, ExportError, ExportKind};
use serde_json::Value;
use tracing::{info, warn};

/// Host progress hook; returning an error aborts the export.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(&str) -> Result<(), CallbackAbort>;

/// Runs exports against a resolved board.
pub struct ExportAdapter<'a> {
    board: &'a Board,
    pool: &'a Pool,
}

impl<'a> ExportAdapter<'a> {
    pub fn new(board: &'a Board, pool: &'a Pool) -> Self {
        Self { board, pool }
    }

    pub fn get_gerber_export_settings(&self) -> Value {
        self.board.fab_output_settings.to_record()
    }

    pub fn export_gerber(&self, record: &Value) -> Result<(), ExportError> {
        let settings = FabOutputSettings::from_record(record)?;
        run(ExportKind::Gerber, || {
            GerberExporter::new(self.board, &settings).generate().map(drop)
        })
    }

    pub fn get_pdf_export_settings(&self) -> Value {
        self.board.pdf_export_settings.to_record()
    }

    pub fn export_pdf(&self, record: &Value) -> Result<(), ExportError> {
        let settings = PdfExportSettings::from_record(record)?;
        run(ExportKind::Pdf, || export_pdf(self.board, &settings).map(drop))
    }

    pub fn get_pnp_export_settings(&self) -> Value {
        self.board.pnp_export_settings.to_record()
    }

    pub fn export_pnp(&self, record: &Value) -> Result<(), ExportError> {
        let settings = PnpExportSettings::from_record(record)?;
        run(ExportKind::Pnp, || export_pnp(self.board, &settings).map(drop))
    }

    pub fn get_step_export_settings(&self) -> Value {
        self.board.step_export_settings.to_record()
    }

    /// `progress` receives each milestone synchronously on this thread.
    pub fn export_step(
        &self,
        record: &Value,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<(), ExportError> {
        let settings = StepExportSettings::from_record(record)?;
        let mut ignore = |_: &str| -> Result<(), CallbackAbort> { Ok(()) };
        let progress: &mut dyn FnMut(&str) -> Result<(), CallbackAbort> = match progress {
            Some(callback) => callback,
            None => &mut ignore,
        };
        run(ExportKind::Step, || {
            export_step(self.board, self.pool, &settings, progress).map(drop)
        })
    }
}

fn run(
    kind: ExportKind,
    export: impl FnOnce() -> Result<(), ExportError>,
) -> Result<(), ExportError> {
    info!("Starting {} export", kind);
    match export() {
        Ok(()) => {
            info!("{} export finished", kind);
            Ok(())
        }
        Err(e) => {
            warn!("{} export failed: {}", kind, e);
            Err(e)
        }
    }
}
