//! Stacked key/value overlay frames.
//!
//! A `StackedMap` layers write frames over a default-value getter. Reads
//! fall through the frames top to bottom and finally to the getter; writes
//! land in the topmost frame, shadowing deeper bindings. `push`/`pop_to`
//! open and collapse frames, giving arbitrary-depth speculative writes for
//! the VM journal and the account state alike.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

/// Supplies the fallback value for keys with no overlay binding.
///
/// Must produce `Some` for every key shape the map will ever see; `None`
/// marks a caller bug and `get` panics.
pub type DefaultGetter<K, V> = Box<dyn Fn(&K) -> Option<V> + Send>;

struct Frame<K, V> {
    entries: HashMap<K, V>,
    /// Keys in first-write order, for `journal` traversal.
    order: Vec<K>,
}

impl<K, V> Frame<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

/// A stack of key/value overlay frames over a default-value getter.
pub struct StackedMap<K, V> {
    getter: DefaultGetter<K, V>,
    /// `frames[0]` is the always-present base frame at depth 0.
    frames: Vec<Frame<K, V>>,
}

impl<K, V> StackedMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone,
{
    pub fn new(getter: DefaultGetter<K, V>) -> Self {
        Self {
            getter,
            frames: vec![Frame::new()],
        }
    }

    /// Number of frames above the base.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Open a new empty frame and return the resulting depth (1-based).
    pub fn push(&mut self) -> usize {
        self.frames.push(Frame::new());
        self.depth()
    }

    /// Discard every frame above `depth`.
    ///
    /// Panics when `depth` exceeds the current depth.
    pub fn pop_to(&mut self, depth: usize) {
        assert!(
            depth <= self.depth(),
            "pop_to({depth}) beyond current depth {}",
            self.depth()
        );
        self.frames.truncate(depth + 1);
    }

    /// Topmost binding for `key`, falling back to the default getter.
    ///
    /// Panics when the getter does not recognize the key shape.
    pub fn get(&self, key: &K) -> V {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.entries.get(key) {
                return value.clone();
            }
        }
        match (self.getter)(key) {
            Some(value) => value,
            None => panic!("no default value for key {key:?}"),
        }
    }

    /// Bind `key` to `value` in the topmost frame. Writes into the base
    /// frame (depth 0) are permitted.
    pub fn put(&mut self, key: K, value: V) {
        let frame = self.frames.last_mut().expect("base frame always present");
        if !frame.entries.contains_key(&key) {
            frame.order.push(key.clone());
        }
        frame.entries.insert(key, value);
    }

    /// Visit every live `(key, value)` pair in first-observation order.
    ///
    /// Each key is visited once, at the position of its first write, with
    /// its topmost (live) value. Traversal stops when `visit` returns
    /// `false`.
    pub fn journal<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut seen = HashSet::new();
        for frame in &self.frames {
            for key in &frame.order {
                if !seen.insert(key.clone()) {
                    continue;
                }
                if !visit(key, self.topmost(key)) {
                    return;
                }
            }
        }
    }

    fn topmost(&self, key: &K) -> &V {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.entries.get(key) {
                return value;
            }
        }
        unreachable!("journaled key without a binding")
    }
}
