//! Physical board model.
//!
//! A [`Board`] is loaded against an already loaded [`Block`], [`Pool`] and
//! [`ViaPadstackProvider`]; every reference is resolved and copied in at
//! load time. [`Board::expand`] then places package pads in board
//! coordinates and derives net connectivity, and [`Board::update_planes`]
//! refills copper planes. Exporters only accept a board that is ready.

mod block;
mod connectivity;

pub use block::{Block, Component, Net};

use crate::pool::{PackageDef, Padstack, Pool, ViaPadstackProvider};
use crate::settings::{
    FabOutputSettings, PdfExportSettings, PnpExportSettings, SettingsRecord, StepExportSettings,
};
use anyhow::{anyhow, Context, Result};
use connectivity::ConnectivityGraph;
use pcbkit_core::{Coordf, Coordi, Layer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Top,
    Bottom,
}

impl Side {
    pub fn copper(self) -> Layer {
        match self {
            Side::Top => Layer::TopCopper,
            Side::Bottom => Layer::BottomCopper,
        }
    }

    pub fn mask(self) -> Layer {
        match self {
            Side::Top => Layer::TopMask,
            Side::Bottom => Layer::BottomMask,
        }
    }

    pub fn silkscreen(self) -> Layer {
        match self {
            Side::Top => Layer::TopSilkscreen,
            Side::Bottom => Layer::BottomSilkscreen,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Top => write!(f, "top"),
            Side::Bottom => write!(f, "bottom"),
        }
    }
}

/// A straight copper segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub uuid: Uuid,
    pub layer: Layer,
    pub from: Coordi,
    pub to: Coordi,
    pub width: u64,
    #[serde(default)]
    pub net: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardVia {
    pub uuid: Uuid,
    pub position: Coordi,
    pub padstack: Padstack,
    pub net: Option<Uuid>,
}

/// A package pad placed in board coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPad {
    pub name: String,
    pub position: Coordi,
    pub padstack: Padstack,
    pub net: Option<Uuid>,
}

/// A placed component footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPackage {
    pub uuid: Uuid,
    pub component: Component,
    pub package: PackageDef,
    pub position: Coordi,
    /// Rotation in degrees, counter-clockwise.
    pub angle: f64,
    pub side: Side,
    padstacks: BTreeMap<Uuid, Padstack>,
    pads: Vec<BoardPad>,
}

impl BoardPackage {
    pub fn new(
        uuid: Uuid,
        component: Component,
        package: PackageDef,
        padstacks: impl IntoIterator<Item = Padstack>,
        position: Coordi,
        angle: f64,
        side: Side,
    ) -> Self {
        Self {
            uuid,
            component,
            package,
            position,
            angle,
            side,
            padstacks: padstacks.into_iter().map(|p| (p.uuid, p)).collect(),
            pads: Vec::new(),
        }
    }

    /// Pads in board coordinates; populated by [`Board::expand`].
    pub fn pads(&self) -> &[BoardPad] {
        &self.pads
    }

    /// Maps a package-local point to board coordinates. Bottom-side
    /// packages are mirrored about their Y axis before rotation.
    pub fn transform(&self, local: Coordi) -> Coordi {
        let x = match self.side {
            Side::Top => local.x,
            Side::Bottom => -local.x,
        } as f64;
        let y = local.y as f64;
        let (sin, cos) = self.angle.to_radians().sin_cos();
        self.position + Coordf::new(x * cos - y * sin, x * sin + y * cos).round()
    }

    /// Silkscreen outline in board coordinates.
    pub fn outline(&self) -> Vec<Coordi> {
        self.package
            .outline
            .iter()
            .map(|&p| self.transform(p))
            .collect()
    }

    fn place_pads(&mut self) {
        let mut pads = Vec::with_capacity(self.package.pads.len());
        for pad in &self.package.pads {
            let Some(padstack) = self.padstacks.get(&pad.padstack) else {
                warn!(
                    "{}: pad {} has no padstack, skipped",
                    self.component.refdes, pad.name
                );
                continue;
            };
            pads.push(BoardPad {
                name: pad.name.clone(),
                position: self.transform(pad.position),
                padstack: padstack.clone(),
                net: self.component.connections.get(&pad.name).copied(),
            });
        }
        self.pads = pads;
    }
}

/// A copper pour; filled by [`Board::update_planes`].
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub uuid: Uuid,
    pub layer: Layer,
    pub net: Uuid,
    fragments: Vec<Vec<Coordi>>,
}

impl Plane {
    pub fn new(uuid: Uuid, layer: Layer, net: Uuid) -> Self {
        Self {
            uuid,
            layer,
            net,
            fragments: Vec::new(),
        }
    }

    pub fn fragments(&self) -> &[Vec<Coordi>] {
        &self.fragments
    }
}

/// Two nets found on the same copper island.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetConflict {
    pub kept: Uuid,
    pub dropped: Uuid,
}

#[derive(Debug, Deserialize)]
struct BoardFile {
    uuid: Uuid,
    name: String,
    #[serde(default)]
    outline: Vec<Coordi>,
    #[serde(default)]
    packages: Vec<PackageFile>,
    #[serde(default)]
    vias: Vec<ViaFile>,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    planes: Vec<PlaneFile>,
    #[serde(default)]
    fab_output_settings: Option<Value>,
    #[serde(default)]
    pdf_export_settings: Option<Value>,
    #[serde(default)]
    pnp_export_settings: Option<Value>,
    #[serde(default)]
    step_export_settings: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PackageFile {
    uuid: Uuid,
    component: Uuid,
    package: Uuid,
    position: Coordi,
    #[serde(default)]
    angle: f64,
    #[serde(default)]
    side: Side,
}

#[derive(Debug, Deserialize)]
struct ViaFile {
    uuid: Uuid,
    position: Coordi,
    padstack: Uuid,
    #[serde(default)]
    net: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct PlaneFile {
    uuid: Uuid,
    layer: Layer,
    net: Uuid,
}

#[derive(Debug, Clone)]
pub struct Board {
    pub uuid: Uuid,
    pub name: String,
    pub fab_output_settings: FabOutputSettings,
    pub pdf_export_settings: PdfExportSettings,
    pub pnp_export_settings: PnpExportSettings,
    pub step_export_settings: StepExportSettings,
    outline: Vec<Coordi>,
    packages: Vec<BoardPackage>,
    vias: Vec<BoardVia>,
    tracks: Vec<Track>,
    planes: Vec<Plane>,
    base_directory: PathBuf,
    expanded: bool,
    planes_current: bool,
    net_conflicts: Vec<NetConflict>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v4(),
            fab_output_settings: FabOutputSettings::for_board(&name),
            pdf_export_settings: PdfExportSettings::for_board(&name),
            pnp_export_settings: PnpExportSettings::for_board(&name),
            step_export_settings: StepExportSettings::for_board(&name),
            name,
            outline: Vec::new(),
            packages: Vec::new(),
            vias: Vec::new(),
            tracks: Vec::new(),
            planes: Vec::new(),
            base_directory: PathBuf::from("."),
            expanded: false,
            planes_current: false,
            net_conflicts: Vec::new(),
        }
    }

    /// Loads a board file, resolving its references against the block,
    /// the pool and the via padstacks.
    pub fn load_from_file(
        path: impl AsRef<Path>,
        block: &Block,
        pool: &Pool,
        vias: &ViaPadstackProvider,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read board file {}", path.display()))?;
        let file: BoardFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse board file {}", path.display()))?;

        let mut board = Board::new(file.name);
        board.uuid = file.uuid;
        if let Some(dir) = path.parent() {
            board.base_directory = dir.to_path_buf();
        }
        board.outline = file.outline;

        for p in file.packages {
            let component = block.components.get(&p.component).cloned().ok_or_else(|| {
                anyhow!("Package {} references unknown component {}", p.uuid, p.component)
            })?;
            let package = pool.package(p.package).cloned().ok_or_else(|| {
                anyhow!("Package {} references unknown pool package {}", p.uuid, p.package)
            })?;
            let padstacks = package
                .pads
                .iter()
                .map(|pad| {
                    pool.padstack(pad.padstack).cloned().ok_or_else(|| {
                        anyhow!(
                            "Pad {} of {} references unknown padstack {}",
                            pad.name,
                            package.name,
                            pad.padstack
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            board.packages.push(BoardPackage::new(
                p.uuid, component, package, padstacks, p.position, p.angle, p.side,
            ));
        }

        for v in file.vias {
            let padstack = vias
                .get(v.padstack, pool)
                .cloned()
                .ok_or_else(|| anyhow!("Via {} references unknown padstack {}", v.uuid, v.padstack))?;
            board.vias.push(BoardVia {
                uuid: v.uuid,
                position: v.position,
                padstack,
                net: v.net,
            });
        }

        board.tracks = file.tracks;
        board.planes = file
            .planes
            .into_iter()
            .map(|p| Plane::new(p.uuid, p.layer, p.net))
            .collect();

        if let Some(record) = file.fab_output_settings {
            board.fab_output_settings = FabOutputSettings::from_record(&record)
                .context("Invalid gerber settings in board file")?;
        }
        if let Some(record) = file.pdf_export_settings {
            board.pdf_export_settings = PdfExportSettings::from_record(&record)
                .context("Invalid PDF settings in board file")?;
        }
        if let Some(record) = file.pnp_export_settings {
            board.pnp_export_settings = PnpExportSettings::from_record(&record)
                .context("Invalid pick-and-place settings in board file")?;
        }
        if let Some(record) = file.step_export_settings {
            board.step_export_settings = StepExportSettings::from_record(&record)
                .context("Invalid STEP settings in board file")?;
        }

        info!(
            "Loaded board '{}' ({} packages, {} vias, {} tracks)",
            board.name,
            board.packages.len(),
            board.vias.len(),
            board.tracks.len()
        );
        Ok(board)
    }

    pub fn outline(&self) -> &[Coordi] {
        &self.outline
    }

    pub fn packages(&self) -> &[BoardPackage] {
        &self.packages
    }

    pub fn vias(&self) -> &[BoardVia] {
        &self.vias
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn set_outline(&mut self, outline: Vec<Coordi>) {
        self.outline = outline;
        self.planes_current = false;
    }

    pub fn add_package(&mut self, package: BoardPackage) {
        self.packages.push(package);
        self.invalidate();
    }

    pub fn add_via(&mut self, via: BoardVia) {
        self.vias.push(via);
        self.invalidate();
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
        self.invalidate();
    }

    pub fn add_plane(&mut self, plane: Plane) {
        self.planes.push(plane);
        self.planes_current = false;
    }

    fn invalidate(&mut self) {
        self.expanded = false;
        self.planes_current = false;
    }

    /// Directory relative output paths are resolved against.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn set_base_directory(&mut self, dir: impl Into<PathBuf>) {
        self.base_directory = dir.into();
    }

    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_directory.join(path)
        }
    }

    /// Axis-aligned bounds of the outline, `None` without an outline.
    pub fn bounding_box(&self) -> Option<(Coordi, Coordi)> {
        let first = *self.outline.first()?;
        Some(
            self.outline
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Expanded and planes up to date.
    pub fn is_ready(&self) -> bool {
        self.expanded && self.planes_current
    }

    pub fn net_conflicts(&self) -> &[NetConflict] {
        &self.net_conflicts
    }

    /// Places pads and propagates nets across connected copper.
    ///
    /// Tracks, vias and pads touching at the same point on the same copper
    /// layer are connected; vias and plated through pads join both layers.
    /// Items without a net inherit the net of their island.
    pub fn expand(&mut self) {
        for package in &mut self.packages {
            package.place_pads();
        }

        let mut graph = ConnectivityGraph::default();
        let track_nodes: Vec<usize> = self
            .tracks
            .iter()
            .map(|t| {
                let a = graph.node(t.layer, t.from);
                let b = graph.node(t.layer, t.to);
                graph.connect(a, b);
                a
            })
            .collect();
        let via_nodes: Vec<usize> = self.vias.iter().map(|v| graph.through(v.position)).collect();
        let pad_nodes: Vec<Vec<usize>> = self
            .packages
            .iter()
            .map(|pkg| {
                pkg.pads
                    .iter()
                    .map(|pad| {
                        if pad.padstack.is_through() {
                            graph.through(pad.position)
                        } else {
                            graph.node(pkg.side.copper(), pad.position)
                        }
                    })
                    .collect()
            })
            .collect();

        let mut islands = IslandNets::default();
        for (track, &node) in self.tracks.iter().zip(&track_nodes) {
            islands.seed(&mut graph, node, track.net);
        }
        for (via, &node) in self.vias.iter().zip(&via_nodes) {
            islands.seed(&mut graph, node, via.net);
        }
        for (pkg, nodes) in self.packages.iter().zip(&pad_nodes) {
            for (pad, &node) in pkg.pads.iter().zip(nodes) {
                islands.seed(&mut graph, node, pad.net);
            }
        }

        for (track, &node) in self.tracks.iter_mut().zip(&track_nodes) {
            if track.net.is_none() {
                track.net = islands.net(&mut graph, node);
            }
        }
        for (via, &node) in self.vias.iter_mut().zip(&via_nodes) {
            if via.net.is_none() {
                via.net = islands.net(&mut graph, node);
            }
        }
        for (pkg, nodes) in self.packages.iter_mut().zip(&pad_nodes) {
            for (pad, &node) in pkg.pads.iter_mut().zip(nodes) {
                if pad.net.is_none() {
                    pad.net = islands.net(&mut graph, node);
                }
            }
        }

        let island_count = track_nodes
            .iter()
            .chain(&via_nodes)
            .chain(pad_nodes.iter().flatten())
            .map(|&n| graph.cluster(n))
            .collect::<HashSet<_>>()
            .len();
        for conflict in &islands.conflicts {
            warn!(
                "Board '{}': nets {} and {} are shorted",
                self.name, conflict.kept, conflict.dropped
            );
        }
        info!(
            "Expanded board '{}': {} copper islands, {} net conflicts",
            self.name,
            island_count,
            islands.conflicts.len()
        );
        self.net_conflicts = islands.conflicts;
        self.expanded = true;
    }

    /// Refills every plane with the board outline.
    pub fn update_planes(&mut self) {
        let fill = if self.outline.len() >= 3 {
            vec![self.outline.clone()]
        } else {
            Vec::new()
        };
        for plane in &mut self.planes {
            plane.fragments = fill.clone();
        }
        debug!("Updated {} planes", self.planes.len());
        self.planes_current = true;
    }
}

#[derive(Default)]
struct IslandNets {
    nets: HashMap<usize, Uuid>,
    conflicts: Vec<NetConflict>,
}

impl IslandNets {
    fn seed(&mut self, graph: &mut ConnectivityGraph, node: usize, net: Option<Uuid>) {
        let Some(net) = net else {
            return;
        };
        let island = graph.cluster(node);
        match self.nets.get(&island) {
            Some(&kept) if kept != net => {
                let conflict = NetConflict { kept, dropped: net };
                if !self.conflicts.contains(&conflict) {
                    self.conflicts.push(conflict);
                }
            }
            Some(_) => {}
            None => {
                self.nets.insert(island, net);
            }
        }
    }

    fn net(&self, graph: &mut ConnectivityGraph, node: usize) -> Option<Uuid> {
        self.nets.get(&graph.cluster(node)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PadDef;

    fn padstack(hole: u64) -> Padstack {
        Padstack {
            uuid: Uuid::new_v4(),
            name: "ps".into(),
            pad_diameter: 800_000,
            hole_diameter: hole,
            plated: true,
        }
    }

    fn component(refdes: &str) -> Component {
        Component {
            uuid: Uuid::new_v4(),
            refdes: refdes.into(),
            value: "10k".into(),
            mpn: None,
            manufacturer: None,
            nopopulate: false,
            connections: BTreeMap::new(),
        }
    }

    fn package(pad_stack: &Padstack) -> PackageDef {
        PackageDef {
            uuid: Uuid::new_v4(),
            name: "R0603".into(),
            pads: vec![
                PadDef {
                    name: "1".into(),
                    position: Coordi::new(-1_000_000, 0),
                    padstack: pad_stack.uuid,
                },
                PadDef {
                    name: "2".into(),
                    position: Coordi::new(1_000_000, 0),
                    padstack: pad_stack.uuid,
                },
            ],
            outline: vec![],
            model: None,
            height: 500_000,
        }
    }

    #[test]
    fn test_transform_rotates_and_mirrors() {
        let ps = padstack(0);
        let mut pkg = BoardPackage::new(
            Uuid::new_v4(),
            component("R1"),
            package(&ps),
            [ps.clone()],
            Coordi::new(10_000_000, 0),
            90.0,
            Side::Top,
        );
        assert_eq!(pkg.transform(Coordi::new(1_000_000, 0)), Coordi::new(10_000_000, 1_000_000));
        pkg.side = Side::Bottom;
        pkg.angle = 0.0;
        assert_eq!(pkg.transform(Coordi::new(1_000_000, 0)), Coordi::new(9_000_000, 0));
    }

    #[test]
    fn test_expand_propagates_nets_through_vias() {
        let gnd = Uuid::new_v4();
        let ps = padstack(0);
        let mut r1 = component("R1");
        r1.connections.insert("2".into(), gnd);

        let mut board = Board::new("demo");
        board.add_package(BoardPackage::new(
            Uuid::new_v4(),
            r1,
            package(&ps),
            [ps.clone()],
            Coordi::new(0, 0),
            0.0,
            Side::Top,
        ));
        // Pad 2 sits at (1mm, 0); a top track runs to a via, a bottom track leaves it.
        board.add_track(Track {
            uuid: Uuid::new_v4(),
            layer: Layer::TopCopper,
            from: Coordi::new(1_000_000, 0),
            to: Coordi::new(5_000_000, 0),
            width: 200_000,
            net: None,
        });
        board.add_via(BoardVia {
            uuid: Uuid::new_v4(),
            position: Coordi::new(5_000_000, 0),
            padstack: padstack(300_000),
            net: None,
        });
        board.add_track(Track {
            uuid: Uuid::new_v4(),
            layer: Layer::BottomCopper,
            from: Coordi::new(5_000_000, 0),
            to: Coordi::new(5_000_000, 5_000_000),
            width: 200_000,
            net: None,
        });
        assert!(!board.is_expanded());

        board.expand();
        assert!(board.is_expanded());
        assert!(!board.is_ready());
        assert!(board.tracks().iter().all(|t| t.net == Some(gnd)));
        assert_eq!(board.vias()[0].net, Some(gnd));
        assert_eq!(board.packages()[0].pads()[0].net, None);
        assert!(board.net_conflicts().is_empty());

        board.update_planes();
        assert!(board.is_ready());
    }

    #[test]
    fn test_shorted_nets_are_reported() {
        let mut board = Board::new("demo");
        for net in [Uuid::new_v4(), Uuid::new_v4()] {
            board.add_track(Track {
                uuid: Uuid::new_v4(),
                layer: Layer::TopCopper,
                from: Coordi::new(0, 0),
                to: Coordi::new(1, 1),
                width: 1,
                net: Some(net),
            });
        }
        board.expand();
        assert_eq!(board.net_conflicts().len(), 1);
    }

    #[test]
    fn test_planes_follow_outline() {
        let mut board = Board::new("demo");
        board.set_outline(vec![
            Coordi::new(0, 0),
            Coordi::new(10, 0),
            Coordi::new(10, 10),
        ]);
        board.add_plane(Plane::new(Uuid::new_v4(), Layer::BottomCopper, Uuid::new_v4()));
        board.update_planes();
        assert_eq!(board.planes()[0].fragments(), &[board.outline().to_vec()]);
        assert_eq!(
            board.bounding_box(),
            Some((Coordi::new(0, 0), Coordi::new(10, 10)))
        );
    }
}
