//! Lowering state: the origin table, local slots, and jump targets.

use crate::compiler::ir::{CastKind, OriginId, OriginMarker};
use rustc_hash::FxHashMap;

/// Deduplicating origin table shared by every function of a program.
#[derive(Debug, Default)]
pub struct OriginTable {
    markers: Vec<OriginMarker>,
    index: FxHashMap<OriginMarker, OriginId>,
}

impl OriginTable {
    /// Intern a marker.
    pub fn intern(&mut self, marker: OriginMarker) -> OriginId {
        if let Some(&id) = self.index.get(&marker) {
            return id;
        }
        let id = self.markers.len() as OriginId;
        self.index.insert(marker.clone(), id);
        self.markers.push(marker);
        id
    }

    /// Finish, returning the markers in id order.
    pub fn into_markers(self) -> Vec<OriginMarker> {
        self.markers
    }
}

/// Lexical scopes of one function mapping local names to slots.
///
/// Slots are never reused, so a slot count is simply the number of locals
/// ever declared.
#[derive(Debug, Default)]
pub struct LocalScopes {
    frames: Vec<FxHashMap<String, u32>>,
    next_slot: u32,
    /// Declared primitive conversion per slot
    casts: Vec<Option<CastKind>>,
}

impl LocalScopes {
    /// Scopes holding the parameters.
    pub fn with_params<'p>(params: impl IntoIterator<Item = &'p str>) -> Self {
        let mut scopes = Self {
            frames: vec![FxHashMap::default()],
            next_slot: 0,
            casts: Vec::new(),
        };
        for name in params {
            scopes.declare(name);
        }
        scopes
    }

    /// Open a nested scope.
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Close the innermost scope.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Returns true if `name` is visible in any enclosing scope.
    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Declare a local in the innermost scope and return its slot.
    pub fn declare(&mut self, name: &str) -> u32 {
        let slot = self.scratch();
        if self.frames.is_empty() {
            self.frames.push(FxHashMap::default());
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), slot);
        }
        slot
    }

    /// Allocate an anonymous slot.
    pub fn scratch(&mut self) -> u32 {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.casts.push(None);
        slot
    }

    /// Record the declared primitive conversion of a slot.
    pub fn set_cast(&mut self, slot: u32, cast: Option<CastKind>) {
        if let Some(entry) = self.casts.get_mut(slot as usize) {
            *entry = cast;
        }
    }

    /// Declared primitive conversion of a slot.
    pub fn cast_of(&self, slot: u32) -> Option<CastKind> {
        self.casts.get(slot as usize).cloned().flatten()
    }

    /// Slot of a visible local.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.frames.iter().rev().find_map(|f| f.get(name).copied())
    }

    /// Number of slots allocated so far.
    pub fn slot_count(&self) -> u32 {
        self.next_slot
    }
}

/// What a `break` or `continue` can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Loop,
    Switch,
    Block,
}

/// An enclosing jump target.
#[derive(Debug, Clone)]
pub struct JumpTarget {
    pub kind: TargetKind,
    pub label: Option<String>,
}

/// Stack of enclosing jump targets.
#[derive(Debug, Default)]
pub struct JumpTargets {
    stack: Vec<JumpTarget>,
}

impl JumpTargets {
    pub fn push(&mut self, kind: TargetKind, label: Option<String>) {
        self.stack.push(JumpTarget { kind, label });
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Resolve a `break`: unlabeled needs a loop or switch, labeled needs the
    /// label anywhere on the stack.
    pub fn can_break(&self, label: Option<&str>) -> bool {
        match label {
            None => self
                .stack
                .iter()
                .any(|t| matches!(t.kind, TargetKind::Loop | TargetKind::Switch)),
            Some(label) => self.stack.iter().any(|t| t.label.as_deref() == Some(label)),
        }
    }

    /// Resolve a `continue`: the target must be a loop.
    pub fn can_continue(&self, label: Option<&str>) -> bool {
        match label {
            None => self.stack.iter().any(|t| t.kind == TargetKind::Loop),
            Some(label) => self
                .stack
                .iter()
                .any(|t| t.kind == TargetKind::Loop && t.label.as_deref() == Some(label)),
        }
    }
}
