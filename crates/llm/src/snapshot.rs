/// Folds content deltas into cumulative snapshots
#[derive(Debug, Default)]
pub struct SnapshotAccumulator {
    content: String,
}

impl SnapshotAccumulator {
    /// Snapshot after appending `delta`; `None` when nothing changed
    pub fn push(&mut self, delta: &str) -> Option<String> {
        if delta.is_empty() {
            return None;
        }
        self.content.push_str(delta);
        Some(self.content.clone())
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Consumer side of a snapshot stream.
///
/// Each snapshot replaces the displayed content; empty and repeated
/// snapshots are ignored.
#[derive(Debug, Default)]
pub struct SnapshotView {
    current: String,
}

impl SnapshotView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the displayed content changed
    pub fn update(&mut self, snapshot: &str) -> bool {
        if snapshot.is_empty() || snapshot == self.current {
            return false;
        }
        self.current.clear();
        self.current.push_str(snapshot);
        true
    }

    pub fn content(&self) -> &str {
        &self.current
    }

    pub fn into_content(self) -> String {
        self.current
    }
}
