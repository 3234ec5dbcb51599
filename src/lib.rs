//! # PCBKit
//!
//! Interactive PCB editing core and fabrication export pipeline.
//!
//! ## Architecture
//!
//! PCBKit is organized as a workspace with multiple crates:
//!
//! 1. **pcbkit-core** - Coordinates, units, layer and export kinds, error taxonomy
//! 2. **pcbkit-designer** - Document model, pointer restriction, drawing tools
//! 3. **pcbkit-export** - Board model, pool, settings records, exporters
//! 4. **pcbkit-settings** - Application configuration
//! 5. **pcbkit** - Host bridge and the command line front end
//!
//! ## Features
//!
//! - **Tools**: dimension drawing with axis lock and angle snap, via placement
//! - **Exports**: Gerber/Excellon, PDF, pick-and-place CSV, STEP with progress reporting
//! - **Host bridge**: one handle per board, settings exchanged as JSON records

pub mod bridge;

pub use bridge::{progress_from, BoardHandle, HostError, Project};

pub use pcbkit_core::{
    CallbackAbort, Coordi, Error, ExportError, ExportKind, Layer, ObjectType, Result, ToolError,
    ValidationError,
};
pub use pcbkit_designer::{
    Document, Tool, ToolArgs, ToolDrawDimension, ToolId, ToolManager, ToolPlaceVia, ToolResponse,
    ToolSettings,
};
pub use pcbkit_export::{
    Board, ExportAdapter, FabOutputSettings, PdfExportSettings, PnpExportSettings, PoolRegistry,
    SettingsRecord, StepExportSettings, STEP_MILESTONES,
};
pub use pcbkit_settings::{Config, LoggingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr, pretty printed or as JSON lines.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level.to_ascii_lowercase()))?;
    let registry = tracing_subscriber::registry().with(env_filter);

    if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init()?;
    }

    Ok(())
}
