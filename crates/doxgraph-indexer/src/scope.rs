//! Group scope tracking for `@{` / `@}` markers

/// An open group scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
    pub group: String,
    /// Line of the `@{` that opened the frame.
    pub line: u32,
}

/// A structural marker that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeViolation {
    /// `@{` with no `\defgroup` waiting to be opened.
    DanglingOpen { line: u32 },
    /// `@}` with nothing open.
    UnmatchedClose { line: u32 },
}

/// Stack of open groups plus the most recent `\defgroup` not yet opened.
#[derive(Debug, Clone, Default)]
pub struct ScopeTracker {
    stack: Vec<ScopeFrame>,
    pending: Option<String>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a group definition. A following `@{` opens it.
    pub fn define(&mut self, group: &str) {
        self.pending = Some(group.to_string());
    }

    pub fn open(&mut self, line: u32) -> Result<&ScopeFrame, ScopeViolation> {
        let group = self
            .pending
            .take()
            .ok_or(ScopeViolation::DanglingOpen { line })?;
        tracing::trace!("Opening group scope `{}` at line {}", group, line);
        self.stack.push(ScopeFrame { group, line });
        self.stack.last().ok_or(ScopeViolation::DanglingOpen { line })
    }

    pub fn close(&mut self, line: u32) -> Result<ScopeFrame, ScopeViolation> {
        self.pending = None;
        self.stack
            .pop()
            .ok_or(ScopeViolation::UnmatchedClose { line })
    }

    /// Innermost open group.
    pub fn current(&self) -> Option<&str> {
        self.stack.last().map(|frame| frame.group.as_str())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drain frames left open, outermost first.
    pub fn finish(&mut self) -> Vec<ScopeFrame> {
        self.pending = None;
        std::mem::take(&mut self.stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defgroup_then_open() {
        let mut tracker = ScopeTracker::new();
        tracker.define("a");
        assert_eq!(tracker.open(3).unwrap().group, "a");
        assert_eq!(tracker.current(), Some("a"));
        assert_eq!(tracker.close(9).unwrap().line, 3);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_open_without_definition() {
        let mut tracker = ScopeTracker::new();
        assert_eq!(tracker.open(1), Err(ScopeViolation::DanglingOpen { line: 1 }));

        tracker.define("a");
        tracker.open(2).unwrap();
        // The definition is consumed by the first open.
        assert_eq!(tracker.open(3), Err(ScopeViolation::DanglingOpen { line: 3 }));
        assert_eq!(tracker.depth(), 1);
    }

    #[test]
    fn test_close_clears_pending_definition() {
        let mut tracker = ScopeTracker::new();
        tracker.define("a");
        assert_eq!(tracker.close(1), Err(ScopeViolation::UnmatchedClose { line: 1 }));
        assert_eq!(tracker.open(2), Err(ScopeViolation::DanglingOpen { line: 2 }));
    }

    #[test]
    fn test_nested_frames_and_finish() {
        let mut tracker = ScopeTracker::new();
        tracker.define("outer");
        tracker.open(1).unwrap();
        tracker.define("inner");
        tracker.open(2).unwrap();
        assert_eq!(tracker.current(), Some("inner"));

        let open: Vec<String> = tracker.finish().into_iter().map(|f| f.group).collect();
        assert_eq!(open, vec!["outer", "inner"]);
        assert_eq!(tracker.depth(), 0);
    }
}
