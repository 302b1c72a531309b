//! Silhouette extraction
//!
//! Every edge of a visible triangle toggles membership in a set keyed by its
//! unordered vertex pair. An edge shared by two visible triangles cancels
//! out; the edges that survive border exactly one visible triangle, which
//! on a closed mesh is the outline seen from the light.

use std::collections::HashMap;

use umbra_mesh::{EdgeId, EdgeKey, Mesh};

use super::visibility::Visibility;

/// Reusable toggle set preserving first-insertion order of survivors
#[derive(Debug, Default)]
pub struct SilhouetteBuilder {
    index: HashMap<EdgeKey, usize>,
    slots: Vec<Option<EdgeId>>,
}

impl SilhouetteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }

    /// Add the edge if its key is absent, remove it otherwise
    pub fn toggle(&mut self, key: EdgeKey, edge: EdgeId) {
        match self.index.remove(&key) {
            Some(slot) => self.slots[slot] = None,
            None => {
                self.index.insert(key, self.slots.len());
                self.slots.push(Some(edge));
            }
        }
    }

    /// Number of surviving edges
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Write the survivors to `out` in insertion order
    pub fn collect_into(&self, out: &mut Vec<EdgeId>) {
        out.clear();
        out.extend(self.slots.iter().flatten().copied());
    }
}

/// Extract the silhouette of the visible triangles of `mesh` into `out`
pub fn extract(mesh: &Mesh, visibility: &Visibility, builder: &mut SilhouetteBuilder, out: &mut Vec<EdgeId>) {
    builder.clear();
    for id in visibility.visible() {
        let Some(triangle) = mesh.triangle(id) else { continue };
        for &edge_id in &triangle.edges {
            if let Some(edge) = mesh.edge(edge_id) {
                builder.toggle(edge.key(), edge_id);
            }
        }
    }
    builder.collect_into(out);
}
