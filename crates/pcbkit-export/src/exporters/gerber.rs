//! RS-274X Gerber and Excellon drill output.
//!
//! Coordinates use the `4.6` millimetre format, so a coordinate value is
//! the nanometre integer itself.

use super::{cleanup, ensure_ready, write_file};
use crate::board::Board;
use crate::settings::{DrillMode, FabOutputSettings};
use chrono::Utc;
use pcbkit_core::{nm_to_mm, Coordi, ExportError, Layer};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stroke width for package outlines on silkscreen.
const SILKSCREEN_WIDTH: u64 = 150_000;

/// First aperture number; D01-D03 are operation codes.
const FIRST_APERTURE: u32 = 10;

#[derive(Default)]
struct GerberWriter {
    apertures: BTreeMap<u64, u32>,
    current: Option<u32>,
    body: String,
}

impl GerberWriter {
    fn aperture(&mut self, diameter: u64) -> u32 {
        let next = FIRST_APERTURE + self.apertures.len() as u32;
        *self.apertures.entry(diameter).or_insert(next)
    }

    fn select(&mut self, diameter: u64) {
        let code = self.aperture(diameter);
        if self.current != Some(code) {
            let _ = writeln!(self.body, "D{}*", code);
            self.current = Some(code);
        }
    }

    fn flash(&mut self, diameter: u64, at: Coordi) {
        self.select(diameter);
        let _ = writeln!(self.body, "X{}Y{}D03*", at.x, at.y);
    }

    fn polyline(&mut self, diameter: u64, points: &[Coordi], closed: bool) {
        let Some(first) = points.first() else {
            return;
        };
        self.select(diameter);
        let _ = writeln!(self.body, "X{}Y{}D02*", first.x, first.y);
        for p in &points[1..] {
            let _ = writeln!(self.body, "X{}Y{}D01*", p.x, p.y);
        }
        if closed && points.len() > 2 {
            let _ = writeln!(self.body, "X{}Y{}D01*", first.x, first.y);
        }
    }

    fn region(&mut self, points: &[Coordi]) {
        if points.len() < 3 {
            return;
        }
        self.body.push_str("G36*\n");
        let first = points[0];
        let _ = writeln!(self.body, "X{}Y{}D02*", first.x, first.y);
        for p in &points[1..] {
            let _ = writeln!(self.body, "X{}Y{}D01*", p.x, p.y);
        }
        let _ = writeln!(self.body, "X{}Y{}D01*", first.x, first.y);
        self.body.push_str("G37*\n");
    }

    fn finish(self, layer: Layer) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "G04 {}*", layer);
        let _ = writeln!(
            out,
            "%TF.GenerationSoftware,pcbkit,{}*%",
            env!("CARGO_PKG_VERSION")
        );
        let _ = writeln!(out, "%TF.CreationDate,{}*%", Utc::now().to_rfc3339());
        out.push_str("%FSLAX46Y46*%\n");
        out.push_str("%MOMM*%\n");
        out.push_str("%LPD*%\n");
        for (diameter, code) in &self.apertures {
            let _ = writeln!(out, "%ADD{}C,{:.6}*%", code, nm_to_mm(*diameter as i64));
        }
        out.push_str("G01*\n");
        out.push_str(&self.body);
        out.push_str("M02*\n");
        out
    }
}

/// A drilled hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub position: Coordi,
    pub diameter: u64,
    pub plated: bool,
}

/// Writes the fabrication files of a board.
pub struct GerberExporter<'a> {
    board: &'a Board,
    settings: &'a FabOutputSettings,
}

impl<'a> GerberExporter<'a> {
    pub fn new(board: &'a Board, settings: &'a FabOutputSettings) -> Self {
        Self { board, settings }
    }

    /// Renders one layer.
    pub fn layer_content(&self, layer: Layer) -> String {
        let mut w = GerberWriter::default();
        let board = self.board;
        match layer {
            Layer::Outline => {
                w.polyline(self.settings.outline_width, board.outline(), true);
            }
            Layer::TopCopper | Layer::BottomCopper => {
                for plane in board.planes().iter().filter(|p| p.layer == layer) {
                    for fragment in plane.fragments() {
                        w.region(fragment);
                    }
                }
                for track in board.tracks().iter().filter(|t| t.layer == layer) {
                    w.polyline(track.width, &[track.from, track.to], false);
                }
                self.flash_pads(&mut w, layer);
            }
            Layer::TopMask | Layer::BottomMask => self.flash_pads(&mut w, layer),
            Layer::TopSilkscreen | Layer::BottomSilkscreen => {
                for pkg in board.packages().iter().filter(|p| p.side.silkscreen() == layer) {
                    w.polyline(SILKSCREEN_WIDTH, &pkg.outline(), true);
                }
            }
        }
        w.finish(layer)
    }

    /// Vias and pads have copper and mask openings on every layer they reach.
    fn flash_pads(&self, w: &mut GerberWriter, layer: Layer) {
        let on_top = layer.is_top();
        for via in self.board.vias() {
            w.flash(via.padstack.pad_diameter, via.position);
        }
        for pkg in self.board.packages() {
            let pkg_on_layer = (pkg.side.copper() == Layer::TopCopper) == on_top;
            for pad in pkg.pads() {
                if pad.padstack.is_through() || pkg_on_layer {
                    w.flash(pad.padstack.pad_diameter, pad.position);
                }
            }
        }
    }

    /// Every hole on the board.
    pub fn holes(&self) -> Vec<Hole> {
        let mut holes: Vec<Hole> = self
            .board
            .vias()
            .iter()
            .filter(|v| v.padstack.has_hole())
            .map(|v| Hole {
                position: v.position,
                diameter: v.padstack.hole_diameter,
                plated: v.padstack.plated,
            })
            .collect();
        for pkg in self.board.packages() {
            holes.extend(pkg.pads().iter().filter(|p| p.padstack.has_hole()).map(|p| Hole {
                position: p.position,
                diameter: p.padstack.hole_diameter,
                plated: p.padstack.plated,
            }));
        }
        holes
    }

    /// Renders an Excellon file.
    pub fn drill_content(holes: &[Hole]) -> String {
        let mut tools: BTreeMap<u64, Vec<Coordi>> = BTreeMap::new();
        for hole in holes {
            tools.entry(hole.diameter).or_default().push(hole.position);
        }

        let mut out = String::from("M48\n");
        let _ = writeln!(out, "; pcbkit {}", env!("CARGO_PKG_VERSION"));
        out.push_str("FMAT,2\nMETRIC,TZ\n");
        for (index, diameter) in tools.keys().enumerate() {
            let _ = writeln!(out, "T{:02}C{:.3}", index + 1, nm_to_mm(*diameter as i64));
        }
        out.push_str("%\nG90\nG05\n");
        for (index, positions) in tools.values().enumerate() {
            let _ = writeln!(out, "T{:02}", index + 1);
            for p in positions {
                let _ = writeln!(out, "X{:.3}Y{:.3}", nm_to_mm(p.x), nm_to_mm(p.y));
            }
        }
        out.push_str("M30\n");
        out
    }

    fn output_path(&self, dir: &Path, suffix: &str) -> PathBuf {
        dir.join(format!("{}{}", self.settings.prefix, suffix))
    }

    /// Renders and writes every enabled file, returning the paths written.
    pub fn generate(&self) -> Result<Vec<PathBuf>, ExportError> {
        ensure_ready(self.board)?;
        let dir = self.board.resolve_path(&self.settings.output_directory);

        let mut files: Vec<(PathBuf, String)> = self
            .settings
            .enabled_layers()
            .map(|(layer, l)| (self.output_path(&dir, &l.filename), self.layer_content(layer)))
            .collect();

        let holes = self.holes();
        match self.settings.drill_mode {
            DrillMode::Merged => {
                files.push((
                    self.output_path(&dir, &self.settings.drill_pth),
                    Self::drill_content(&holes),
                ));
            }
            DrillMode::Individual => {
                let (pth, npth): (Vec<Hole>, Vec<Hole>) = holes.iter().partition(|h| h.plated);
                files.push((
                    self.output_path(&dir, &self.settings.drill_pth),
                    Self::drill_content(&pth),
                ));
                files.push((
                    self.output_path(&dir, &self.settings.drill_npth),
                    Self::drill_content(&npth),
                ));
            }
        }

        let mut written = Vec::with_capacity(files.len() + 1);
        for (path, content) in &files {
            if let Err(e) = write_file(path, content.as_bytes()) {
                cleanup(&written);
                return Err(e);
            }
            written.push(path.clone());
        }

        if self.settings.zip_output {
            let name = if self.settings.prefix.is_empty() {
                "gerber.zip".to_string()
            } else {
                format!("{}.zip", self.settings.prefix)
            };
            let zip_path = dir.join(name);
            if let Err(e) = write_zip(&zip_path, &files) {
                written.push(zip_path);
                cleanup(&written);
                return Err(e);
            }
            written.push(zip_path);
        }

        info!(
            "Gerber export of '{}' wrote {} files to {}",
            self.board.name,
            written.len(),
            dir.display()
        );
        Ok(written)
    }
}

fn write_zip(path: &Path, files: &[(PathBuf, String)]) -> Result<(), ExportError> {
    let zip_err = |e: zip::result::ZipError| ExportError::generation(format!("zip: {}", e));
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (file_path, content) in files {
        let name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ExportError::generation(format!("bad file name {}", file_path.display())))?;
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish().map_err(zip_err)?;
    debug!("Wrote archive {}", path.display());
    Ok(())
}
