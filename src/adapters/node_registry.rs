//! In-memory control-surface registry.
//!
//! Stands in for device-class and node creation: a node is a
//! `class/name` path that must be unique while registered.

use log::{debug, info};

use crate::app::ports::{NodeHandle, RegistryError, SurfaceRegistry};

/// Registered nodes, keyed by handle.
pub struct NodeRegistry {
    nodes: Vec<(NodeHandle, String)>,
    next_id: u32,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 0,
        }
    }

    /// `class/name` path of a registered node.
    pub fn path(&self, node: NodeHandle) -> Option<&str> {
        self.nodes
            .iter()
            .find(|(h, _)| *h == node)
            .map(|(_, p)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceRegistry for NodeRegistry {
    fn register(&mut self, class: &str, name: &str) -> Result<NodeHandle, RegistryError> {
        if class.is_empty() || name.is_empty() {
            return Err(RegistryError::Rejected);
        }
        let path = format!("{}/{}", class, name);
        if self.nodes.iter().any(|(_, p)| *p == path) {
            return Err(RegistryError::NameTaken);
        }

        let handle = NodeHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        info!("registry: created node {}", path);
        self.nodes.push((handle, path));
        Ok(handle)
    }

    fn unregister(&mut self, node: NodeHandle) {
        if let Some(idx) = self.nodes.iter().position(|(h, _)| *h == node) {
            let (_, path) = self.nodes.swap_remove(idx);
            debug!("registry: removed node {}", path);
        }
    }
}
