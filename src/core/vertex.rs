// Vertices of the shortest-path tree and the arena holding them for one SPF run

use std::net::Ipv4Addr;
use serde::Serialize;
use crate::lsa::{LinkRecord, Lsa, LsaBody};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexHandle(usize);

impl VertexHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for VertexHandle {
    fn from(ix: usize) -> Self {
        VertexHandle(ix)
    }
}

/// First hop out of the root towards a vertex. `interface` is `None` when the
/// root has no local interface for the link; such exits never produce routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RootExit {
    pub next_hop: Ipv4Addr,
    pub interface: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
pub enum VertexKind<'a> {
    Router {
        links: &'a [LinkRecord],
    },
    Network {
        network_mask: Ipv4Addr,
        attached_routers: &'a [Ipv4Addr],
    },
}

#[derive(Debug, Clone)]
pub struct SpfVertex<'a> {
    id: Ipv4Addr,
    kind: VertexKind<'a>,
    lsa: &'a Lsa,
    distance: u32,
    exits: Vec<RootExit>,
    parents: Vec<VertexHandle>,
    children: Vec<VertexHandle>,
    processed: bool,
}

impl<'a> SpfVertex<'a> {
    /// Wraps a router or network advertisement. External advertisements never
    /// become vertices.
    pub fn new(lsa: &'a Lsa) -> Option<Self> {
        let kind = match &lsa.body {
            LsaBody::Router { links } => VertexKind::Router { links },
            LsaBody::Network { network_mask, attached_routers } => VertexKind::Network {
                network_mask: *network_mask,
                attached_routers,
            },
            LsaBody::AsExternal { .. } => return None,
        };
        Some(Self {
            id: lsa.link_state_id,
            kind,
            lsa,
            distance: 0,
            exits: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
            processed: false,
        })
    }

    pub fn id(&self) -> Ipv4Addr {
        self.id
    }

    pub fn kind(&self) -> VertexKind<'a> {
        self.kind
    }

    pub fn lsa(&self) -> &'a Lsa {
        self.lsa
    }

    pub fn is_router(&self) -> bool {
        matches!(self.kind, VertexKind::Router { .. })
    }

    pub fn distance_from_root(&self) -> u32 {
        self.distance
    }

    pub fn set_distance_from_root(&mut self, distance: u32) {
        self.distance = distance;
    }

    pub fn root_exit_directions(&self) -> &[RootExit] {
        &self.exits
    }

    pub fn set_root_exit_directions(&mut self, exits: Vec<RootExit>) {
        self.exits.clear();
        self.merge_root_exit_directions(&exits);
    }

    /// Adds the exits not already known, keeping discovery order.
    pub fn merge_root_exit_directions(&mut self, exits: &[RootExit]) {
        for exit in exits {
            if !self.exits.contains(exit) {
                self.exits.push(*exit);
            }
        }
    }

    pub fn parents(&self) -> &[VertexHandle] {
        &self.parents
    }

    pub fn set_parent(&mut self, parent: VertexHandle) {
        self.parents.clear();
        self.parents.push(parent);
    }

    pub fn merge_parents(&mut self, parents: &[VertexHandle]) {
        for parent in parents {
            if !self.parents.contains(parent) {
                self.parents.push(*parent);
            }
        }
    }

    pub fn children(&self) -> &[VertexHandle] {
        &self.children
    }

    pub fn add_child(&mut self, child: VertexHandle) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn set_processed(&mut self, processed: bool) {
        self.processed = processed;
    }
}

/// Arena owning every vertex created during one SPF run. The root is always
/// the first vertex. Dropping the tree releases the whole graph at once.
#[derive(Debug)]
pub struct SpfTree<'a> {
    vertices: Vec<SpfVertex<'a>>,
}

impl<'a> SpfTree<'a> {
    pub fn new(root: SpfVertex<'a>) -> Self {
        Self { vertices: vec![root] }
    }

    pub fn root(&self) -> VertexHandle {
        VertexHandle(0)
    }

    pub fn insert(&mut self, vertex: SpfVertex<'a>) -> VertexHandle {
        self.vertices.push(vertex);
        VertexHandle(self.vertices.len() - 1)
    }

    pub fn vertex(&self, handle: VertexHandle) -> &SpfVertex<'a> {
        &self.vertices[handle.index()]
    }

    pub fn vertex_mut(&mut self, handle: VertexHandle) -> &mut SpfVertex<'a> {
        &mut self.vertices[handle.index()]
    }

    pub fn find(&self, id: Ipv4Addr) -> Option<&SpfVertex<'a>> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpfVertex<'a>> + '_ {
        self.vertices.iter()
    }

    /// Registers `child` with each of its parents.
    pub fn add_to_parents(&mut self, child: VertexHandle) {
        let parents = self.vertices[child.index()].parents.clone();
        for parent in parents {
            self.vertices[parent.index()].add_child(child);
        }
    }

    pub fn clear_processed(&mut self) {
        for vertex in &mut self.vertices {
            vertex.processed = false;
        }
    }

    /// Depth-first pre-order walk from the root, each vertex visited once even
    /// when it hangs below several equal-cost parents.
    pub fn depth_first(&mut self) -> Vec<VertexHandle> {
        self.clear_processed();
        let mut order = Vec::with_capacity(self.vertices.len());
        let mut stack = vec![self.root()];
        self.vertices[0].processed = true;
        while let Some(handle) = stack.pop() {
            order.push(handle);
            let children = self.vertices[handle.index()].children.clone();
            for &child in children.iter().rev() {
                let vertex = &mut self.vertices[child.index()];
                if !vertex.processed {
                    vertex.processed = true;
                    stack.push(child);
                }
            }
        }
        order
    }
}
