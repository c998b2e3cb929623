//! Cyclic reference detection

/// A reference node reached at a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectReference {
    identity: usize,
    path: String,
}

impl ObjectReference {
    pub fn new(identity: usize, path: &str) -> Self {
        Self {
            identity,
            path: path.to_string(),
        }
    }

    /// Same node, reached on the same branch of the walk
    fn is_same_cyclic_point(&self, other: &ObjectReference) -> bool {
        self.identity == other.identity
            && (is_path_prefix(&self.path, &other.path) || is_path_prefix(&other.path, &self.path))
    }
}

/// `prefix` equals `path` or ends at a segment boundary of it
fn is_path_prefix(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}

/// Visited set for one comparison session.
///
/// Entries are never popped when a branch completes: the set answers "was
/// this node already entered at or above this path", so siblings sharing a
/// node are not cycles while a descendant reaching an ancestor is.
/// Speculative comparisons truncate back to a [`checkpoint`](Self::checkpoint).
#[derive(Debug, Default)]
pub struct ObjectTracker {
    visited: Vec<ObjectReference>,
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reference, returning true if it closes a cycle
    pub fn is_cyclic_reference(&mut self, reference: ObjectReference) -> bool {
        if self.visited.iter().any(|v| v.is_same_cyclic_point(&reference)) {
            return true;
        }
        self.visited.push(reference);
        false
    }

    pub fn checkpoint(&self) -> usize {
        self.visited.len()
    }

    pub fn rollback(&mut self, mark: usize) {
        self.visited.truncate(mark);
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
