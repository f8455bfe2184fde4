use ahash::AHashSet;

/// A globally unique identifier for a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u64);

/// A globally unique identifier for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u64);

/// A globally unique identifier for a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId(pub u64);

/// Identifier of one logical run of the engine.
///
/// Ids minted by one [`EvaluationEnvironment`] are strictly increasing,
/// so `Ord` tells which of two executions happened later.
///
/// [`EvaluationEnvironment`]: crate::EvaluationEnvironment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecutionId(pub u64);

/// Mints and releases unique integer ids.
///
/// An id is unique among the ids currently outstanding; released ids may
/// be handed out again. Minting never goes backwards past an explicitly
/// requested id, so an allocator that never releases is monotonic.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u64,
    taken: AHashSet<u64>,
    released: Vec<u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an id.
    ///
    /// With `Some(id)` that exact id is claimed, and `None` is returned
    /// if it is already outstanding. With `None` a fresh or previously
    /// released id is minted.
    pub fn take(&mut self, want: Option<u64>) -> Option<u64> {
        match want {
            Some(id) => {
                if !self.taken.insert(id) {
                    return None;
                }
                self.next = self.next.max(id + 1);
                Some(id)
            }
            None => Some(self.take_fresh()),
        }
    }

    /// Claim a fresh id, reusing a released one when available.
    pub fn take_fresh(&mut self) -> u64 {
        // released ids may have been re-claimed through `take(Some(..))`
        while let Some(id) = self.released.pop() {
            if self.taken.insert(id) {
                return id;
            }
        }
        let id = self.next;
        self.next = id + 1;
        self.taken.insert(id);
        id
    }

    /// Return an id to the pool. `false` if it was not outstanding.
    pub fn release(&mut self, id: u64) -> bool {
        if self.taken.remove(&id) {
            self.released.push(id);
            true
        } else {
            false
        }
    }

    pub fn is_taken(&self, id: u64) -> bool {
        self.taken.contains(&id)
    }

    pub fn clear(&mut self) {
        self.next = 0;
        self.taken.clear();
        self.released.clear();
    }
}
