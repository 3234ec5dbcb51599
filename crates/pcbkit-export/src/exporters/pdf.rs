//! Single-page board drawing rendered with `lopdf`.

use super::{ensure_ready, write_file};
use crate::board::Board;
use crate::settings::{PdfExportSettings, PdfLayer};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use pcbkit_core::{nm_to_mm, Coordi, ExportError, Layer};
use std::path::PathBuf;
use tracing::info;

const PT_PER_MM: f32 = 72.0 / 25.4;
const MARGIN_MM: f32 = 5.0;
const TEXT_SIZE_PT: f32 = 6.0;
/// Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Bottom-up drawing order; `reverse_layers` flips it.
const DRAW_ORDER: [Layer; 7] = [
    Layer::BottomSilkscreen,
    Layer::BottomMask,
    Layer::BottomCopper,
    Layer::TopCopper,
    Layer::TopMask,
    Layer::TopSilkscreen,
    Layer::Outline,
];

/// Maps board nanometres to page points.
struct PageTransform {
    origin: Coordi,
    width_mm: f32,
    mirror: bool,
}

impl PageTransform {
    fn point(&self, p: Coordi) -> (f32, f32) {
        let x = nm_to_mm(p.x - self.origin.x) as f32;
        let y = nm_to_mm(p.y - self.origin.y) as f32;
        let x = if self.mirror { self.width_mm - x } else { x };
        ((x + MARGIN_MM) * PT_PER_MM, (y + MARGIN_MM) * PT_PER_MM)
    }

    fn length(&self, nm: u64) -> f32 {
        nm_to_mm(nm as i64) as f32 * PT_PER_MM
    }
}

struct PageBuilder<'a> {
    transform: &'a PageTransform,
    min_width: f32,
    ops: Vec<Operation>,
}

impl PageBuilder<'_> {
    fn push(&mut self, op: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(op, operands));
    }

    fn color(&mut self, color: [u8; 3]) {
        let [r, g, b] = color.map(|c| Object::from(c as f32 / 255.0));
        self.push("RG", vec![r.clone(), g.clone(), b.clone()]);
        self.push("rg", vec![r, g, b]);
    }

    fn line_width(&mut self, nm: u64) {
        let w = self.transform.length(nm).max(self.min_width);
        self.push("w", vec![w.into()]);
    }

    fn path(&mut self, points: &[Coordi], closed: bool) {
        let Some(first) = points.first() else {
            return;
        };
        let (x, y) = self.transform.point(*first);
        self.push("m", vec![x.into(), y.into()]);
        for p in &points[1..] {
            let (x, y) = self.transform.point(*p);
            self.push("l", vec![x.into(), y.into()]);
        }
        if closed {
            self.push("h", vec![]);
        }
    }

    fn circle(&mut self, center: Coordi, diameter: u64) {
        let (cx, cy) = self.transform.point(center);
        let r = self.transform.length(diameter) / 2.0;
        let k = r * KAPPA;
        self.push("m", vec![(cx + r).into(), cy.into()]);
        let quarters = [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ];
        for q in quarters {
            self.push("c", q.iter().map(|&v| v.into()).collect());
        }
        self.push("h", vec![]);
    }

    fn finish_shape(&mut self, fill: bool) {
        self.push(if fill { "f" } else { "S" }, vec![]);
    }

    fn text(&mut self, at: Coordi, text: &str) {
        let (x, y) = self.transform.point(at);
        self.push("BT", vec![]);
        self.push("Tf", vec!["F1".into(), TEXT_SIZE_PT.into()]);
        self.push("Td", vec![x.into(), y.into()]);
        self.push("Tj", vec![Object::string_literal(text)]);
        self.push("ET", vec![]);
    }
}

fn draw_layer(
    page: &mut PageBuilder<'_>,
    board: &Board,
    layer: Layer,
    style: &PdfLayer,
    include_text: bool,
) {
    page.color(style.color);
    match layer {
        Layer::Outline => {
            page.line_width(0);
            page.path(board.outline(), true);
            page.finish_shape(false);
        }
        Layer::TopCopper | Layer::BottomCopper => {
            for plane in board.planes().iter().filter(|p| p.layer == layer) {
                for fragment in plane.fragments() {
                    page.line_width(0);
                    page.path(fragment, true);
                    page.finish_shape(style.fill);
                }
            }
            page.push("J", vec![1.into()]);
            for track in board.tracks().iter().filter(|t| t.layer == layer) {
                page.line_width(track.width);
                page.path(&[track.from, track.to], false);
                page.finish_shape(false);
            }
            draw_pads(page, board, layer, style.fill);
        }
        Layer::TopMask | Layer::BottomMask => draw_pads(page, board, layer, style.fill),
        Layer::TopSilkscreen | Layer::BottomSilkscreen => {
            page.line_width(0);
            for pkg in board.packages().iter().filter(|p| p.side.silkscreen() == layer) {
                let outline = pkg.outline();
                if !outline.is_empty() {
                    page.path(&outline, true);
                    page.finish_shape(false);
                }
                if include_text {
                    page.text(pkg.position, &pkg.component.refdes);
                }
            }
        }
    }
}

fn draw_pads(page: &mut PageBuilder<'_>, board: &Board, layer: Layer, fill: bool) {
    let on_top = layer.is_top();
    page.line_width(0);
    for via in board.vias() {
        page.circle(via.position, via.padstack.pad_diameter);
        page.finish_shape(fill);
    }
    for pkg in board.packages() {
        let pkg_on_layer = (pkg.side.copper() == Layer::TopCopper) == on_top;
        for pad in pkg.pads() {
            if pad.padstack.is_through() || pkg_on_layer {
                page.circle(pad.position, pad.padstack.pad_diameter);
                page.finish_shape(fill);
            }
        }
    }
}

/// Encoded page content plus the page size in points.
pub fn render_content(
    board: &Board,
    settings: &PdfExportSettings,
) -> Result<(Vec<u8>, f32, f32), ExportError> {
    let (lo, hi) = board
        .bounding_box()
        .ok_or_else(|| ExportError::generation(format!("board '{}' has no outline", board.name)))?;
    let width_mm = nm_to_mm(hi.x - lo.x) as f32;
    let height_mm = nm_to_mm(hi.y - lo.y) as f32;
    let transform = PageTransform {
        origin: lo,
        width_mm,
        mirror: settings.mirror,
    };
    let mut page = PageBuilder {
        transform: &transform,
        min_width: transform.length(settings.min_line_width),
        ops: Vec::new(),
    };

    let mut order = DRAW_ORDER.to_vec();
    if settings.reverse_layers {
        order.reverse();
    }
    for layer in order {
        if let Some(style) = settings.layers.get(&layer).filter(|s| s.enabled) {
            draw_layer(&mut page, board, layer, style, settings.include_text);
        }
    }

    let content = Content { operations: page.ops };
    let bytes = content
        .encode()
        .map_err(|e| ExportError::generation(format!("PDF content: {}", e)))?;
    let page_w = (width_mm + 2.0 * MARGIN_MM) * PT_PER_MM;
    let page_h = (height_mm + 2.0 * MARGIN_MM) * PT_PER_MM;
    Ok((bytes, page_w, page_h))
}

/// Writes the board drawing to `settings.output_filename`.
pub fn export_pdf(board: &Board, settings: &PdfExportSettings) -> Result<PathBuf, ExportError> {
    ensure_ready(board)?;
    let (content, page_w, page_h) = render_content(board, settings)?;

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(board.name.as_str()),
        "Producer" => Object::string_literal(concat!("pcbkit ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::generation(format!("PDF: {}", e)))?;

    let path = board.resolve_path(&settings.output_filename);
    write_file(&path, &bytes)?;
    info!("PDF export of '{}' wrote {}", board.name, path.display());
    Ok(path)
}
