//! Copper connectivity by union-find over shared points.

use pcbkit_core::{Coordi, Layer};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn add(&mut self) -> usize {
        let id = self.parent.len();
        self.parent.push(id);
        self.rank.push(0);
        id
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Copper points keyed by layer and position.
#[derive(Debug, Default)]
pub(crate) struct ConnectivityGraph {
    sets: UnionFind,
    nodes: HashMap<(Layer, Coordi), usize>,
}

impl ConnectivityGraph {
    pub fn node(&mut self, layer: Layer, at: Coordi) -> usize {
        if let Some(&id) = self.nodes.get(&(layer, at)) {
            return id;
        }
        let id = self.sets.add();
        self.nodes.insert((layer, at), id);
        id
    }

    pub fn connect(&mut self, a: usize, b: usize) {
        self.sets.union(a, b);
    }

    /// A node reaching both copper layers at `at`.
    pub fn through(&mut self, at: Coordi) -> usize {
        let top = self.node(Layer::TopCopper, at);
        let bottom = self.node(Layer::BottomCopper, at);
        self.connect(top, bottom);
        top
    }

    pub fn cluster(&mut self, node: usize) -> usize {
        self.sets.find(node)
    }
}
