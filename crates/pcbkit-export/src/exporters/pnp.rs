//! Pick-and-place CSV output.

use super::{cleanup, ensure_ready, write_file};
use crate::board::{Board, BoardPackage, Side};
use crate::settings::{PnpColumn, PnpExportSettings, PnpMode};
use pcbkit_core::{nm_to_mm, ExportError};
use std::path::PathBuf;
use tracing::info;

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn cell(pkg: &BoardPackage, column: PnpColumn, settings: &PnpExportSettings) -> String {
    let places = settings.position_format as usize;
    match column {
        PnpColumn::Refdes => pkg.component.refdes.clone(),
        PnpColumn::Value => pkg.component.value.clone(),
        PnpColumn::Mpn => pkg.component.mpn.clone().unwrap_or_default(),
        PnpColumn::Manufacturer => pkg.component.manufacturer.clone().unwrap_or_default(),
        PnpColumn::Package => pkg.package.name.clone(),
        PnpColumn::X => format!("{:.*}", places, nm_to_mm(pkg.position.x)),
        PnpColumn::Y => format!("{:.*}", places, nm_to_mm(pkg.position.y)),
        PnpColumn::Angle => format!("{:.2}", pkg.angle.rem_euclid(360.0)),
        PnpColumn::Side => match pkg.side {
            Side::Top => settings.top_side.clone(),
            Side::Bottom => settings.bottom_side.clone(),
        },
    }
}

/// Renders the CSV rows for the packages matching `side` (`None` for both).
pub fn render_csv(board: &Board, settings: &PnpExportSettings, side: Option<Side>) -> String {
    let mut packages: Vec<&BoardPackage> = board
        .packages()
        .iter()
        .filter(|p| side.map_or(true, |s| p.side == s))
        .filter(|p| settings.include_nopopulate || !p.component.nopopulate)
        .collect();
    packages.sort_by_key(|p| natural_key(&p.component.refdes));

    let mut out = String::new();
    let header: Vec<String> = settings.columns.iter().map(|c| c.to_string()).collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for pkg in packages {
        let row: Vec<String> = settings
            .columns
            .iter()
            .map(|&c| escape(&cell(pkg, c, settings)))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Sorts "R2" before "R10".
fn natural_key(refdes: &str) -> (String, u64, String) {
    let split = refdes.find(|c: char| c.is_ascii_digit()).unwrap_or(refdes.len());
    let (prefix, rest) = refdes.split_at(split);
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let number = rest[..digits_end].parse().unwrap_or(0);
    (prefix.to_string(), number, rest[digits_end..].to_string())
}

/// Writes the placement file(s) and returns their paths.
pub fn export_pnp(
    board: &Board,
    settings: &PnpExportSettings,
) -> Result<Vec<PathBuf>, ExportError> {
    ensure_ready(board)?;
    let dir = board.resolve_path(&settings.output_directory);
    let files = match settings.mode {
        PnpMode::Merged => vec![(
            dir.join(&settings.filename_merged),
            render_csv(board, settings, None),
        )],
        PnpMode::Individual => vec![
            (
                dir.join(&settings.filename_top),
                render_csv(board, settings, Some(Side::Top)),
            ),
            (
                dir.join(&settings.filename_bottom),
                render_csv(board, settings, Some(Side::Bottom)),
            ),
        ],
    };

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        if let Err(e) = write_file(&path, content.as_bytes()) {
            cleanup(&written);
            return Err(e);
        }
        written.push(path);
    }
    info!(
        "Pick-and-place export of '{}' wrote {} files",
        board.name,
        written.len()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("10k"), "10k");
        assert_eq!(escape("1,5nF"), "\"1,5nF\"");
        assert_eq!(escape("2\" wide"), "\"2\"\" wide\"");
    }

    #[test]
    fn test_natural_order() {
        let mut refs = vec!["R10", "C1", "R2", "R1A"];
        refs.sort_by_key(|r| natural_key(r));
        assert_eq!(refs, vec!["C1", "R1A", "R2", "R10"]);
    }
}
