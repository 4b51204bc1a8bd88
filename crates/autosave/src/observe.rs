//! Observed fields and the rebinding trait

use crate::tracker::ChangeTracker;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

/// Transparent wrapper marking its tracker on every mutable borrow.
///
/// Serializes exactly like the wrapped value, so wrapping a field changes
/// nothing about the persisted document. A freshly constructed or
/// deserialized `Observe` carries its own unbound tracker until the owning
/// [`Track::rebind`] pass wires it to the document's tracker; that wiring
/// marks the tracker, so replacing a whole field registers as a change on
/// the next pass.
///
/// Dirtiness is borrow-based: taking `&mut` through the wrapper counts as
/// a change whether or not the value ends up different.
pub struct Observe<V> {
    value: V,
    tracker: ChangeTracker,
}

impl<V> Observe<V> {
    /// Wrap a value with an unbound tracker.
    pub fn new(value: V) -> Self {
        Self {
            value,
            tracker: ChangeTracker::new(),
        }
    }

    /// Unwrap into the inner value.
    pub fn into_inner(self) -> V {
        self.value
    }

    /// Shared access without touching the tracker.
    pub fn get(&self) -> &V {
        &self.value
    }

    pub(crate) fn bind(&mut self, tracker: &ChangeTracker) {
        self.tracker = tracker.clone();
    }

    #[cfg(test)]
    pub(crate) fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }
}

impl<V> From<V> for Observe<V> {
    fn from(value: V) -> Self {
        Self::new(value)
    }
}

impl<V: Default> Default for Observe<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: Clone> Clone for Observe<V> {
    fn clone(&self) -> Self {
        // clones start unbound, same as deserialized values
        Self::new(self.value.clone())
    }
}

impl<V: PartialEq> PartialEq for Observe<V> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<V: fmt::Debug> fmt::Debug for Observe<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<V> Deref for Observe<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V> DerefMut for Observe<V> {
    fn deref_mut(&mut self) -> &mut V {
        self.tracker.mark();
        &mut self.value
    }
}

impl<V: Serialize> Serialize for Observe<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Observe<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        V::deserialize(deserializer).map(Self::new)
    }
}

/// Wires every [`Observe`] field in a value to the document tracker.
///
/// Documents implement this by delegating to each field; plain values are
/// leaves with a no-op impl. The pass runs after construction, after every
/// load, and after every edit.
pub trait Track {
    /// Rebind all observed fields in `self` to `tracker`.
    fn rebind(&mut self, tracker: &ChangeTracker);
}

impl<V: Track> Track for Observe<V> {
    fn rebind(&mut self, tracker: &ChangeTracker) {
        // Wiring a previously unbound value counts as a write: the field
        // was wholesale-replaced since the last pass and the replacement
        // itself never went through `DerefMut`.
        if !self.tracker.shares(tracker) {
            tracker.mark();
            self.bind(tracker);
        }
        self.value.rebind(tracker);
    }
}

macro_rules! track_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Track for $ty {
                fn rebind(&mut self, _tracker: &ChangeTracker) {}
            }
        )*
    };
}

track_leaf!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, PathBuf,
);

impl<V: Track> Track for Option<V> {
    fn rebind(&mut self, tracker: &ChangeTracker) {
        if let Some(value) = self {
            value.rebind(tracker);
        }
    }
}

impl<V: Track> Track for Vec<V> {
    fn rebind(&mut self, tracker: &ChangeTracker) {
        for value in self {
            value.rebind(tracker);
        }
    }
}

impl<V: Track> Track for Box<V> {
    fn rebind(&mut self, tracker: &ChangeTracker) {
        (**self).rebind(tracker);
    }
}

impl<K, V: Track, S> Track for HashMap<K, V, S> {
    fn rebind(&mut self, tracker: &ChangeTracker) {
        for value in self.values_mut() {
            value.rebind(tracker);
        }
    }
}

impl<K, V: Track> Track for BTreeMap<K, V> {
    fn rebind(&mut self, tracker: &ChangeTracker) {
        for value in self.values_mut() {
            value.rebind(tracker);
        }
    }
}
