//! Per-query search state for the cell graph
//!
//! Cells are immutable once a mesh is built. Everything the A* search needs to
//! remember about a cell lives in a [`NodePool`] owned by the query instead,
//! stamped with a session number so that the pool can be reused between
//! queries without clearing it.

use crate::CellId;
use glam::Vec3;

/// Search state recorded for a single cell
#[derive(Debug, Clone, Copy, Default)]
pub struct CellNode {
    /// Session that last touched this node
    pub session: u32,
    /// Cost of reaching the cell from the search root
    pub arrival_cost: f32,
    /// Estimated remaining cost to the search target
    pub heuristic: f32,
    /// Whether the cell is waiting in the open list
    pub open: bool,
    /// Wall through which the cell was reached, `None` for the search root
    pub arrival_wall: Option<usize>,
}

impl CellNode {
    /// Total A* cost of the node
    #[inline]
    pub fn total(&self) -> f32 {
        self.arrival_cost + self.heuristic
    }
}

/// Session-stamped node storage indexed by [`CellId`]
#[derive(Debug, Clone, Default)]
pub struct NodePool {
    nodes: Vec<CellNode>,
    session: u32,
}

impl NodePool {
    /// Creates a node pool sized for `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            nodes: vec![CellNode::default(); cell_count],
            session: 0,
        }
    }

    /// Starts a new search session
    ///
    /// Nodes stamped with an older session are treated as untouched from now
    /// on.
    pub fn begin_session(&mut self, cell_count: usize) -> u32 {
        self.nodes.resize(cell_count, CellNode::default());

        self.session = self.session.wrapping_add(1);
        if self.session == 0 {
            // stale stamps could collide with the restarted counter
            self.nodes.fill(CellNode::default());
            self.session = 1;
        }

        self.session
    }

    /// Gets the current session number
    pub fn session(&self) -> u32 {
        self.session
    }

    /// Gets the node of a cell if it was touched during the current session
    pub fn node(&self, id: CellId) -> Option<&CellNode> {
        self.nodes
            .get(id.index())
            .filter(|node| node.session == self.session)
    }

    /// Gets the mutable node of a cell if it was touched during the current session
    pub fn node_mut(&mut self, id: CellId) -> Option<&mut CellNode> {
        let session = self.session;
        self.nodes
            .get_mut(id.index())
            .filter(|node| node.session == session)
    }

    /// Resets the node of a cell and stamps it with the current session
    pub fn touch(&mut self, id: CellId) -> Option<&mut CellNode> {
        let session = self.session;
        let node = self.nodes.get_mut(id.index())?;
        *node = CellNode {
            session,
            ..CellNode::default()
        };
        Some(node)
    }

    /// Number of nodes touched during the current session
    pub fn touched_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.session == self.session)
            .count()
    }

    /// Gets the capacity of the pool
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    cell: CellId,
    total: f32,
}

/// Binary min-heap of cells keyed by total A* cost
///
/// Supports lowering the key of an entry already in the heap through
/// [`NodeQueue::modify`].
#[derive(Debug, Clone, Default)]
pub struct NodeQueue {
    heap: Vec<QueueEntry>,
}

impl NodeQueue {
    /// Creates a new node queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the queue
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Gets the cell with the lowest total cost
    pub fn top(&self) -> Option<CellId> {
        self.heap.first().map(|entry| entry.cell)
    }

    /// Pops the cell with the lowest total cost
    pub fn pop(&mut self) -> Option<CellId> {
        if self.heap.is_empty() {
            return None;
        }

        let result = self.heap.swap_remove(0);
        if let Some(&last) = self.heap.first() {
            self.trickle_down(0, last);
        }

        Some(result.cell)
    }

    /// Pushes a cell onto the queue
    pub fn push(&mut self, cell: CellId, total: f32) {
        let entry = QueueEntry { cell, total };
        self.heap.push(entry);
        self.bubble_up(self.heap.len() - 1, entry);
    }

    /// Lowers the total cost of a queued cell and restores heap order
    ///
    /// Returns `false` if the cell is not queued or the new cost is not lower.
    pub fn modify(&mut self, cell: CellId, total: f32) -> bool {
        let Some(i) = self.heap.iter().position(|entry| entry.cell == cell) else {
            return false;
        };

        if total >= self.heap[i].total {
            return false;
        }

        self.bubble_up(i, QueueEntry { cell, total });
        true
    }

    /// Total cost stored for a queued cell
    pub fn cost_of(&self, cell: CellId) -> Option<f32> {
        self.heap
            .iter()
            .find(|entry| entry.cell == cell)
            .map(|entry| entry.total)
    }

    /// Checks if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued cells
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    fn bubble_up(&mut self, mut i: usize, entry: QueueEntry) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if entry.total >= self.heap[parent].total {
                break;
            }

            self.heap[i] = self.heap[parent];
            i = parent;
        }

        self.heap[i] = entry;
    }

    fn trickle_down(&mut self, mut i: usize, entry: QueueEntry) {
        let size = self.heap.len();

        loop {
            let child1 = 2 * i + 1;
            if child1 >= size {
                break;
            }

            let child2 = child1 + 1;
            let mut min_child = child1;
            if child2 < size && self.heap[child2].total < self.heap[child1].total {
                min_child = child2;
            }

            if entry.total <= self.heap[min_child].total {
                break;
            }

            self.heap[i] = self.heap[min_child];
            i = min_child;
        }

        self.heap[i] = entry;
    }
}

/// Mutable state threaded through one reversed A* search
pub(crate) struct SearchContext<'a> {
    pub pool: &'a mut NodePool,
    pub queue: &'a mut NodeQueue,
    /// Position the heuristic measures towards (the path start)
    pub target: Vec3,
    /// Position the search grows from (the path goal)
    pub origin: Vec3,
}
