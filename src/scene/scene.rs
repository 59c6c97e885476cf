use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::resources::BoundingBox;
use crate::resources::mesh::Mesh;
use crate::scene::MeshKey;

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Flat container of named sub-meshes, as handed over by the loader.
///
/// Traversal order is insertion order, which makes every query below
/// deterministic.
pub struct Scene {
    pub id: u32,

    pub meshes: SlotMap<MeshKey, Mesh>,
    order: Vec<MeshKey>,
    names: FxHashMap<String, MeshKey>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            meshes: SlotMap::with_key(),
            order: Vec::new(),
            names: FxHashMap::default(),
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKey {
        let name = mesh.name.clone();
        let key = self.meshes.insert(mesh);
        self.order.push(key);
        // First mesh registered under a name keeps it.
        self.names.entry(name).or_insert(key);
        key
    }

    pub fn remove_mesh(&mut self, key: MeshKey) -> Option<Mesh> {
        let mesh = self.meshes.remove(key)?;
        self.order.retain(|k| *k != key);
        if self.names.get(&mesh.name) == Some(&key) {
            self.names.remove(&mesh.name);
            if let Some(next) = self.order.iter().find(|k| self.meshes[**k].name == mesh.name) {
                self.names.insert(mesh.name.clone(), *next);
            }
        }
        Some(mesh)
    }

    pub fn get_mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    pub fn get_mesh_mut(&mut self, key: MeshKey) -> Option<&mut Mesh> {
        self.meshes.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Meshes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MeshKey, &Mesh)> + '_ {
        self.order.iter().map(|k| (*k, &self.meshes[*k]))
    }

    pub fn find_by_name(&self, name: &str) -> Option<MeshKey> {
        self.names.get(name).copied()
    }

    /// First mesh whose material (or own) name equals `token`.
    ///
    /// Material names win over mesh names: a loader may split one node into
    /// several primitives that all inherit the node name.
    pub fn find_patch(&self, token: &str) -> Option<MeshKey> {
        let by_material = self.iter().find(|(_, m)| m.material.name == token);
        let found = by_material.or_else(|| self.iter().find(|(_, m)| m.matches_token(token)));
        if let Some((key, mesh)) = found {
            debug!("Patch '{token}' resolved to mesh '{}'", mesh.name);
            return Some(key);
        }
        None
    }

    /// Union of the world bounds of every visible mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box_filtered(|_, _| true)
    }

    /// Union of the world bounds of the visible meshes accepted by `filter`.
    pub fn bounding_box_filtered<F>(&self, mut filter: F) -> Option<BoundingBox>
    where
        F: FnMut(MeshKey, &Mesh) -> bool,
    {
        self.iter()
            .filter(|(key, mesh)| mesh.visible && filter(*key, mesh))
            .filter_map(|(_, mesh)| mesh.world_bounding_box())
            .reduce(|a, b| a.union(&b))
    }
}
