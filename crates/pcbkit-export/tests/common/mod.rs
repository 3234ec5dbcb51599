//! On-disk fixture: a small two-sided board with its pool, block and vias.

use pcbkit_export::{Block, Board, Pool, ViaPadstackProvider};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

pub const SMD_PADSTACK: &str = "5b1f3c6e-0000-4000-8000-000000000001";
pub const VIA_PADSTACK: &str = "5b1f3c6e-0000-4000-8000-000000000002";
pub const R0603: &str = "5b1f3c6e-0000-4000-8000-000000000003";
pub const GND: &str = "5b1f3c6e-0000-4000-8000-000000000004";

pub struct Fixture {
    pub dir: TempDir,
    pub pool: Pool,
    pub board: Board,
}

fn write_json(path: &Path, value: &serde_json::Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn component(refdes: &str, nopopulate: bool) -> (Uuid, serde_json::Value) {
    let uuid = Uuid::new_v4();
    let value = json!({
        "uuid": uuid,
        "refdes": refdes,
        "value": "10k",
        "mpn": "RC0603FR-0710KL",
        "manufacturer": "Yageo",
        "nopopulate": nopopulate,
        "connections": { "1": GND },
    });
    (uuid, value)
}

/// Writes the project files and loads them. The board is not expanded.
pub fn load() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_json(
        &root.join("pool").join("pool.json"),
        &json!({
            "padstacks": [
                { "uuid": SMD_PADSTACK, "name": "smd-0.8", "pad_diameter": 800_000 }
            ],
            "packages": [{
                "uuid": R0603,
                "name": "R0603",
                "pads": [
                    { "name": "1", "position": { "x": -800_000, "y": 0 }, "padstack": SMD_PADSTACK },
                    { "name": "2", "position": { "x": 800_000, "y": 0 }, "padstack": SMD_PADSTACK }
                ],
                "outline": [
                    { "x": -1_500_000, "y": -800_000 },
                    { "x": 1_500_000, "y": -800_000 },
                    { "x": 1_500_000, "y": 800_000 },
                    { "x": -1_500_000, "y": 800_000 }
                ],
                "model": "3d/r0603.step",
                "height": 500_000
            }]
        }),
    );
    write_json(
        &root.join("vias").join("via-0.3.json"),
        &json!({
            "uuid": VIA_PADSTACK,
            "name": "via-0.3",
            "pad_diameter": 600_000,
            "hole_diameter": 300_000
        }),
    );

    let (r1, r1_json) = component("R1", false);
    let (r2, r2_json) = component("R2", false);
    let (r10, r10_json) = component("R10", true);
    write_json(
        &root.join("block.json"),
        &json!({
            "uuid": Uuid::new_v4(),
            "name": "demo",
            "components": [r1_json, r2_json, r10_json],
            "nets": [{ "uuid": GND, "name": "GND" }]
        }),
    );

    write_json(
        &root.join("board").join("board.json"),
        &json!({
            "uuid": Uuid::new_v4(),
            "name": "demo",
            "outline": [
                { "x": 0, "y": 0 },
                { "x": 30_000_000, "y": 0 },
                { "x": 30_000_000, "y": 20_000_000 },
                { "x": 0, "y": 20_000_000 }
            ],
            "packages": [
                { "uuid": Uuid::new_v4(), "component": r1, "package": R0603,
                  "position": { "x": 5_000_000, "y": 5_000_000 } },
                { "uuid": Uuid::new_v4(), "component": r2, "package": R0603,
                  "position": { "x": 15_000_000, "y": 5_000_000 }, "angle": 90.0, "side": "bottom" },
                { "uuid": Uuid::new_v4(), "component": r10, "package": R0603,
                  "position": { "x": 25_000_000, "y": 5_000_000 } }
            ],
            "vias": [
                { "uuid": Uuid::new_v4(), "position": { "x": 10_000_000, "y": 5_000_000 },
                  "padstack": VIA_PADSTACK }
            ],
            "tracks": [{
                "uuid": Uuid::new_v4(),
                "layer": "top_copper",
                "from": { "x": 4_200_000, "y": 5_000_000 },
                "to": { "x": 10_000_000, "y": 5_000_000 },
                "width": 250_000
            }],
            "planes": [
                { "uuid": Uuid::new_v4(), "layer": "bottom_copper", "net": GND }
            ]
        }),
    );

    let pool = Pool::open(root.join("pool"), root.join("cache")).unwrap();
    let block = Block::load_from_file(root.join("block.json")).unwrap();
    let vias = ViaPadstackProvider::open(root.join("vias")).unwrap();
    let board = Board::load_from_file(root.join("board").join("board.json"), &block, &pool, &vias)
        .unwrap();

    Fixture { dir, pool, board }
}

/// Loads the fixture and makes the board export-ready.
pub fn ready() -> Fixture {
    let mut fixture = load();
    fixture.board.expand();
    fixture.board.update_planes();
    fixture
}

pub fn files_under(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    names
}
