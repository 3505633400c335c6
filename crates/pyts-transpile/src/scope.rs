//! Lexical scope tracking for declaration decisions.
//!
//! A single-target assignment emits `let` exactly when its target is not
//! visible yet. Frames mirror TypeScript's scoping: one per function and
//! lambda, one per class body, one per emitted block.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Module,
    Function,
    Class,
    Block,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    declared: HashSet<String>,
    /// Names the Python function binds locally; lookups stop here.
    shadowed: HashSet<String>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            declared: HashSet::new(),
            shadowed: HashSet::new(),
        }
    }
}

/// Stack of frames. Frame 0 is the module scope and is never popped.
#[derive(Debug)]
pub struct ScopeTracker {
    frames: Vec<Frame>,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(FrameKind::Module)],
        }
    }

    /// Open a function or lambda scope that shadows nothing.
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::new(FrameKind::Function));
    }

    /// Open a function scope whose local bindings hide same-named outer
    /// declarations until declared here.
    pub fn push_function<I>(&mut self, locals: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut frame = Frame::new(FrameKind::Function);
        frame.shadowed = locals.into_iter().collect();
        self.frames.push(frame);
    }

    pub fn push_class(&mut self) {
        self.frames.push(Frame::new(FrameKind::Class));
    }

    pub fn push_block(&mut self) {
        self.frames.push(Frame::new(FrameKind::Block));
    }

    /// Remove the innermost frame. The module frame stays.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Remove the innermost frame if it is a block.
    pub fn pop_block(&mut self) {
        if self.frames.len() > 1 && self.innermost_kind() == FrameKind::Block {
            self.frames.pop();
        }
    }

    pub fn innermost_kind(&self) -> FrameKind {
        self.frames.last().map_or(FrameKind::Module, |frame| frame.kind)
    }

    pub fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.declared.insert(name.to_string());
        }
    }

    /// Declare in the module frame, wherever the walk currently is.
    pub fn declare_global(&mut self, name: &str) {
        self.frames[0].declared.insert(name.to_string());
    }

    /// Declare in the nearest enclosing function (or module) frame.
    pub fn declare_in_function(&mut self, name: &str) {
        let frame = self
            .frames
            .iter_mut()
            .rev()
            .find(|frame| matches!(frame.kind, FrameKind::Function | FrameKind::Module));
        if let Some(frame) = frame {
            frame.declared.insert(name.to_string());
        }
    }

    /// Scan frames innermost to outermost. Class frames only count when
    /// they are the innermost frame, since class bodies do not enclose
    /// their methods.
    pub fn is_visible(&self, name: &str) -> bool {
        let innermost = self.frames.len() - 1;
        for (index, frame) in self.frames.iter().enumerate().rev() {
            if frame.kind == FrameKind::Class && index != innermost {
                continue;
            }
            if frame.declared.contains(name) {
                return true;
            }
            if frame.shadowed.contains(name) {
                return false;
            }
        }
        false
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_never_removes_module_frame() {
        let mut scopes = ScopeTracker::new();
        scopes.pop_scope();
        scopes.pop_scope();
        assert_eq!(scopes.depth(), 1);
        scopes.declare("x");
        assert!(scopes.is_visible("x"));
    }

    #[test]
    fn test_inner_declarations_disappear_on_pop() {
        let mut scopes = ScopeTracker::new();
        scopes.push_scope();
        scopes.declare("y");
        assert!(scopes.is_visible("y"));
        scopes.pop_scope();
        assert!(!scopes.is_visible("y"));
    }

    #[test]
    fn test_outer_names_visible_unless_shadowed() {
        let mut scopes = ScopeTracker::new();
        scopes.declare("count");
        scopes.declare("total");
        scopes.push_function(["count".to_string()]);
        assert!(!scopes.is_visible("count"));
        assert!(scopes.is_visible("total"));
        scopes.declare("count");
        assert!(scopes.is_visible("count"));
    }

    #[test]
    fn test_blocks_scope_like_let() {
        let mut scopes = ScopeTracker::new();
        scopes.push_block();
        scopes.declare("i");
        scopes.pop_block();
        assert!(!scopes.is_visible("i"));
        scopes.pop_block();
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_class_body_not_visible_from_methods() {
        let mut scopes = ScopeTracker::new();
        scopes.push_class();
        scopes.declare("field");
        assert!(scopes.is_visible("field"));
        scopes.push_scope();
        assert!(!scopes.is_visible("field"));
    }
}
