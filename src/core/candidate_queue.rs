// Candidate list of the SPF run: vertices discovered but not yet in the tree

use std::cmp::Reverse;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use priority_queue::PriorityQueue;
use super::vertex::VertexHandle;

/// Distance first, then vertex id so equal distances pop in a reproducible order.
type Priority = Reverse<(u32, Ipv4Addr)>;

pub struct CandidateQueue {
    heap: PriorityQueue<VertexHandle, Priority>,
    by_id: HashMap<Ipv4Addr, VertexHandle>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self { heap: PriorityQueue::new(), by_id: HashMap::new() }
    }

    pub fn push(&mut self, handle: VertexHandle, id: Ipv4Addr, distance: u32) {
        log::trace!("candidate push {} at distance {}", id, distance);
        self.by_id.insert(id, handle);
        self.heap.push(handle, Reverse((distance, id)));
    }

    /// Removes the closest candidate.
    pub fn pop(&mut self) -> Option<VertexHandle> {
        let (handle, Reverse((_, id))) = self.heap.pop()?;
        self.by_id.remove(&id);
        Some(handle)
    }

    pub fn find(&self, id: Ipv4Addr) -> Option<VertexHandle> {
        self.by_id.get(&id).copied()
    }

    /// Restores the ordering after the distance of a queued vertex was lowered.
    pub fn reorder(&mut self, handle: VertexHandle, id: Ipv4Addr, distance: u32) {
        log::trace!("candidate {} lowered to distance {}", id, distance);
        if self.heap.change_priority(&handle, Reverse((distance, id))).is_none() {
            log::warn!("reorder of {} which is not a candidate", id);
        }
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for CandidateQueue {
    fn default() -> Self {
        Self::new()
    }
}
