//! ISO 10303-21 (STEP) output.
//!
//! The board is written as a wireframe: outline polylines at the bottom and
//! top of the substrate, drill circles for vias, and one placement frame per
//! package that optionally references the package's 3-D model file.
//!
//! Progress is reported before each phase. A callback error stops the export
//! at once; nothing is written in that case.

use super::{ensure_ready, write_file};
use crate::board::{Board, BoardPackage, Side};
use crate::pool::Pool;
use crate::settings::StepExportSettings;
use chrono::Utc;
use pcbkit_core::{nm_to_mm, CallbackAbort, Coordi, ExportError};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Milestones in the order they are reported.
pub const STEP_MILESTONES: [&str; 5] = [
    "Setting up",
    "Exporting board outline",
    "Exporting vias",
    "Exporting packages",
    "Writing file",
];

/// Substrate thickness in mm.
const BOARD_THICKNESS_MM: f64 = 1.6;

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Entity table of the DATA section.
struct StepWriter {
    next_id: usize,
    data: String,
}

impl StepWriter {
    fn new() -> Self {
        Self {
            next_id: 1,
            data: String::new(),
        }
    }

    fn add(&mut self, entity: impl AsRef<str>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let _ = writeln!(self.data, "#{}={};", id, entity.as_ref());
        id
    }

    fn point(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.add(format!("CARTESIAN_POINT('',({:.6},{:.6},{:.6}))", x, y, z))
    }

    fn direction(&mut self, x: f64, y: f64, z: f64) -> usize {
        self.add(format!("DIRECTION('',({:.6},{:.6},{:.6}))", x, y, z))
    }

    fn placement(&mut self, origin: usize, axis: usize, ref_dir: usize) -> usize {
        self.add(format!("AXIS2_PLACEMENT_3D('',#{},#{},#{})", origin, axis, ref_dir))
    }

    fn refs(ids: &[usize]) -> String {
        let items: Vec<String> = ids.iter().map(|id| format!("#{}", id)).collect();
        format!("({})", items.join(","))
    }

    fn finish(self, description: &str, name: &str) -> String {
        let mut out = String::from("ISO-10303-21;\nHEADER;\n");
        let _ = writeln!(out, "FILE_DESCRIPTION(({}),'2;1');", quote(description));
        let _ = writeln!(
            out,
            "FILE_NAME({},{},(''),(''),{},'','');",
            quote(name),
            quote(&Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
            quote(concat!("pcbkit ", env!("CARGO_PKG_VERSION")))
        );
        out.push_str("FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));\nENDSEC;\n");
        out.push_str("DATA;\n");
        out.push_str(&self.data);
        out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
        out
    }
}

fn report(
    progress: &mut dyn FnMut(&str) -> Result<(), CallbackAbort>,
    milestone: &str,
) -> Result<(), ExportError> {
    debug!("STEP export: {}", milestone);
    progress(milestone).map_err(|abort| {
        warn!("STEP export aborted by callback at '{}': {}", milestone, abort);
        ExportError::CallbackAbort(abort)
    })
}

fn outline_loop(w: &mut StepWriter, outline: &[Coordi], z: f64) -> usize {
    let mut ids: Vec<usize> = outline
        .iter()
        .map(|p| w.point(nm_to_mm(p.x), nm_to_mm(p.y), z))
        .collect();
    if let Some(&first) = ids.first() {
        ids.push(first);
    }
    w.add(format!("POLYLINE('',{})", StepWriter::refs(&ids)))
}

fn package_frame(
    w: &mut StepWriter,
    pkg: &BoardPackage,
    pool: &Pool,
    settings: &StepExportSettings,
    board_product: usize,
) -> usize {
    let (z, axis_z) = match pkg.side {
        Side::Top => (BOARD_THICKNESS_MM, 1.0),
        Side::Bottom => (0.0, -1.0),
    };
    let (sin, cos) = pkg.angle.to_radians().sin_cos();
    let origin = w.point(nm_to_mm(pkg.position.x), nm_to_mm(pkg.position.y), z);
    let axis = w.direction(0.0, 0.0, axis_z);
    let ref_dir = w.direction(cos, sin, 0.0);
    let frame = w.placement(origin, axis, ref_dir);

    let name = format!("{}{}", settings.prefix, pkg.component.refdes);
    let product = w.add(format!(
        "PRODUCT({},{},{},())",
        quote(&name),
        quote(&name),
        quote(&pkg.package.name)
    ));

    if settings.include_3d_models {
        match pool.model_path(&pkg.package) {
            Some(path) if path.exists() => {
                w.add(format!(
                    "DOCUMENT_FILE({},'',$,#{},'',$)",
                    quote(&path.to_string_lossy()),
                    product
                ));
            }
            Some(path) => warn!(
                "{}: 3-D model {} not found, placing frame only",
                pkg.component.refdes,
                path.display()
            ),
            None => {}
        }
    }
    w.add(format!(
        "NEXT_ASSEMBLY_USAGE_OCCURRENCE({},{},'',#{},#{},{})",
        quote(&pkg.uuid.to_string()),
        quote(&name),
        board_product,
        product,
        quote(&pkg.component.refdes)
    ));
    w.add(format!("ITEM_DEFINED_TRANSFORMATION('','',#{},#{})", frame, product))
}

/// Writes the STEP file, reporting each of [`STEP_MILESTONES`] through
/// `progress` before the corresponding phase.
pub fn export_step(
    board: &Board,
    pool: &Pool,
    settings: &StepExportSettings,
    progress: &mut dyn FnMut(&str) -> Result<(), CallbackAbort>,
) -> Result<PathBuf, ExportError> {
    ensure_ready(board)?;
    let [setup, outline, vias, packages, writing] = STEP_MILESTONES;

    report(progress, setup)?;
    let mut w = StepWriter::new();
    let product_name = format!("{}{}", settings.prefix, board.name);
    w.add("APPLICATION_CONTEXT('automotive design')");
    let board_product = w.add(format!(
        "PRODUCT({},{},'printed circuit board',())",
        quote(&product_name),
        quote(&product_name)
    ));

    report(progress, outline)?;
    if board.outline().len() < 3 {
        return Err(ExportError::generation(format!(
            "board '{}' has no outline",
            board.name
        )));
    }
    let bottom = outline_loop(&mut w, board.outline(), 0.0);
    let top = outline_loop(&mut w, board.outline(), BOARD_THICKNESS_MM);
    w.add(format!(
        "GEOMETRIC_CURVE_SET('board outline',(#{},#{}))",
        bottom, top
    ));

    report(progress, vias)?;
    let mut circles = Vec::new();
    let mut skipped = 0usize;
    for via in board.vias() {
        let hole = via.padstack.hole_diameter;
        if hole == 0 || hole < settings.min_diameter {
            skipped += 1;
            continue;
        }
        let origin = w.point(nm_to_mm(via.position.x), nm_to_mm(via.position.y), 0.0);
        let axis = w.direction(0.0, 0.0, 1.0);
        let ref_dir = w.direction(1.0, 0.0, 0.0);
        let frame = w.placement(origin, axis, ref_dir);
        circles.push(w.add(format!(
            "CIRCLE('via',#{},{:.6})",
            frame,
            nm_to_mm(hole as i64) / 2.0
        )));
    }
    if !circles.is_empty() {
        w.add(format!("GEOMETRIC_CURVE_SET('vias',{})", StepWriter::refs(&circles)));
    }
    debug!("{} vias exported, {} below minimum diameter", circles.len(), skipped);

    report(progress, packages)?;
    for pkg in board.packages() {
        package_frame(&mut w, pkg, pool, settings, board_product);
    }

    report(progress, writing)?;
    let text = w.finish("pcbkit board", &product_name);
    let path = board.resolve_path(&settings.filename);
    write_file(&path, text.as_bytes())?;
    info!("STEP export of '{}' wrote {}", board.name, path.display());
    Ok(path)
}
