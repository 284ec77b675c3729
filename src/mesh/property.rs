//! Named, type-erased property columns.
//!
//! Mesh attributes (positions, normals, colors, texture coordinates, and any
//! user-defined data) are stored outside the topology records, in per-entity
//! side tables: one [`PropertySet`] per entity kind, holding a small number
//! of named columns. Every column is kept resized to the entity count of its
//! kind, so a handle of that kind indexes every column directly.
//!
//! Columns are type-erased behind a closed capability trait (`resize`,
//! `reserve`, `move_elem`, `clear`, deep clone); typed access goes through a
//! [`PropertyHandle`], which records both the value type and the entity kind
//! it belongs to. Name lookup is a linear scan; property counts are small,
//! unlike entity counts.

use std::any::Any;
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::ops::Range;

use crate::error::{MeshError, Result};

/// Marker type for vertex properties.
#[derive(Debug, Clone, Copy)]
pub struct VertexTag;

/// Marker type for edge properties.
#[derive(Debug, Clone, Copy)]
pub struct EdgeTag;

/// Marker type for half-edge properties.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdgeTag;

/// Marker type for face properties.
#[derive(Debug, Clone, Copy)]
pub struct FaceTag;

/// Values storable in a property column.
pub trait PropertyValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> PropertyValue for T {}

/// Typed handle to a property column of entity kind `K`.
///
/// The handle is invalidated by
/// [`PropertySet::remove`]; using a stale handle with the fallible accessors
/// yields [`MeshError::StaleProperty`], while the indexing accessors panic.
pub struct PropertyHandle<T, K> {
    slot: u32,
    _marker: PhantomData<fn() -> (T, K)>,
}

impl<T, K> PropertyHandle<T, K> {
    fn new(slot: usize) -> Self {
        Self {
            slot: slot as u32,
            _marker: PhantomData,
        }
    }

    /// Raw column slot of this handle.
    #[inline]
    pub fn slot(self) -> usize {
        self.slot as usize
    }
}

impl<T, K> Copy for PropertyHandle<T, K> {}

impl<T, K> Clone for PropertyHandle<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K> PartialEq for PropertyHandle<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T, K> Eq for PropertyHandle<T, K> {}

impl<T, K> Debug for PropertyHandle<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({})", self.slot)
    }
}

/// The closed capability set every column exposes, type-erased.
trait Column: Any + Send + Sync {
    fn name(&self) -> &str;
    fn reserve(&mut self, additional: usize);
    fn resize(&mut self, n: usize);
    fn move_elem(&mut self, to: usize, from: usize);
    fn clear(&mut self);
    fn clone_boxed(&self) -> Box<dyn Column>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct TypedColumn<T> {
    name: String,
    default: T,
    values: Vec<T>,
}

impl<T: PropertyValue> Column for TypedColumn<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    fn resize(&mut self, n: usize) {
        self.values.resize(n, self.default.clone());
    }

    fn move_elem(&mut self, to: usize, from: usize) {
        let value = self.values[from].clone();
        self.values[to] = value;
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn clone_boxed(&self) -> Box<dyn Column> {
        Box::new(TypedColumn {
            name: self.name.clone(),
            default: self.default.clone(),
            values: self.values.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A registry of property columns for one entity kind.
///
/// All registered columns are kept at the same length, the entity count of
/// the owning mesh. Removed columns leave a free slot that the next
/// [`add`](Self::add) reuses.
pub struct PropertySet<K> {
    columns: Vec<Option<Box<dyn Column>>>,
    len: usize,
    _marker: PhantomData<fn() -> K>,
}

impl<K> Default for PropertySet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for PropertySet<K> {
    fn clone(&self) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| c.as_ref().map(|c| c.clone_boxed()))
                .collect(),
            len: self.len,
            _marker: PhantomData,
        }
    }
}

impl<K> PropertySet<K> {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Number of element slots in every column.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set holds zero element slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register a new column under `name`, filled with `default` for all
    /// current elements. Returns the typed handle used for access.
    pub fn add<T: PropertyValue>(&mut self, name: &str, default: T) -> PropertyHandle<T, K> {
        let column = TypedColumn {
            name: name.to_string(),
            default,
            values: Vec::new(),
        };
        let mut column: Box<dyn Column> = Box::new(column);
        column.resize(self.len);

        match self.columns.iter().position(|c| c.is_none()) {
            Some(slot) => {
                self.columns[slot] = Some(column);
                PropertyHandle::new(slot)
            }
            None => {
                self.columns.push(Some(column));
                PropertyHandle::new(self.columns.len() - 1)
            }
        }
    }

    /// Remove a column, freeing its slot and invalidating the handle.
    pub fn remove<T: PropertyValue>(&mut self, ph: PropertyHandle<T, K>) -> Result<()> {
        self.typed::<T>(ph)?;
        self.columns[ph.slot()] = None;
        while matches!(self.columns.last(), Some(None)) {
            self.columns.pop();
        }
        Ok(())
    }

    /// Look up a column by name and value type.
    pub fn find<T: PropertyValue>(&self, name: &str) -> Option<PropertyHandle<T, K>> {
        self.columns.iter().position(|c| match c {
            Some(c) => c.name() == name && c.as_any().is::<TypedColumn<T>>(),
            None => false,
        })
        .map(PropertyHandle::new)
    }

    /// Whether a column with this name and value type exists.
    pub fn has<T: PropertyValue>(&self, name: &str) -> bool {
        self.find::<T>(name).is_some()
    }

    /// Whether the handle still refers to a live column of matching type.
    pub fn is_valid<T: PropertyValue>(&self, ph: PropertyHandle<T, K>) -> bool {
        self.typed(ph).is_ok()
    }

    fn typed<T: PropertyValue>(&self, ph: PropertyHandle<T, K>) -> Result<&TypedColumn<T>> {
        self.columns
            .get(ph.slot())
            .and_then(|c| c.as_ref())
            .and_then(|c| c.as_any().downcast_ref())
            .ok_or(MeshError::StaleProperty { slot: ph.slot() })
    }

    fn typed_mut<T: PropertyValue>(
        &mut self,
        ph: PropertyHandle<T, K>,
    ) -> Result<&mut TypedColumn<T>> {
        self.columns
            .get_mut(ph.slot())
            .and_then(|c| c.as_mut())
            .and_then(|c| c.as_any_mut().downcast_mut())
            .ok_or(MeshError::StaleProperty { slot: ph.slot() })
    }

    /// The values of a column, checked against stale handles.
    pub fn try_values<T: PropertyValue>(&self, ph: PropertyHandle<T, K>) -> Result<&[T]> {
        Ok(&self.typed(ph)?.values)
    }

    /// The mutable values of a column, checked against stale handles.
    pub fn try_values_mut<T: PropertyValue>(
        &mut self,
        ph: PropertyHandle<T, K>,
    ) -> Result<&mut [T]> {
        Ok(&mut self.typed_mut(ph)?.values)
    }

    /// The values of a column.
    ///
    /// # Panics
    /// Panics if the handle is stale, like indexing with an out-of-range
    /// entity handle would.
    #[inline]
    pub fn values<T: PropertyValue>(&self, ph: PropertyHandle<T, K>) -> &[T] {
        match self.typed(ph) {
            Ok(column) => &column.values,
            Err(_) => panic!("stale property handle {:?}", ph),
        }
    }

    /// The mutable values of a column.
    ///
    /// # Panics
    /// Panics if the handle is stale.
    #[inline]
    pub fn values_mut<T: PropertyValue>(&mut self, ph: PropertyHandle<T, K>) -> &mut [T] {
        match self.typed_mut(ph) {
            Ok(column) => &mut column.values,
            Err(_) => panic!("stale property handle {:?}", ph),
        }
    }

    /// Append one default-valued slot to every column; returns its index.
    pub fn add_elem(&mut self) -> usize {
        let index = self.len;
        self.resize(self.len + 1);
        index
    }

    /// Append `n` default-valued slots to every column; returns their range.
    pub fn add_elems(&mut self, n: usize) -> Range<usize> {
        let first = self.len;
        self.resize(self.len + n);
        first..self.len
    }

    /// Resize every column to `n` slots.
    pub fn resize(&mut self, n: usize) {
        for column in self.columns.iter_mut().flatten() {
            column.resize(n);
        }
        self.len = n;
    }

    /// Reserve capacity for `additional` more slots in every column.
    pub fn reserve(&mut self, additional: usize) {
        for column in self.columns.iter_mut().flatten() {
            column.reserve(additional);
        }
    }

    /// Copy the values of slot `from` over slot `to` in every column.
    pub fn move_elem(&mut self, to: usize, from: usize) {
        for column in self.columns.iter_mut().flatten() {
            column.move_elem(to, from);
        }
    }

    /// Drop all element slots (columns stay registered).
    pub fn clear(&mut self) {
        for column in self.columns.iter_mut().flatten() {
            column.clear();
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_access() {
        let mut set: PropertySet<VertexTag> = PropertySet::new();
        set.resize(3);
        let weights = set.add::<f64>("weight", 1.0);

        assert_eq!(set.values(weights), &[1.0, 1.0, 1.0]);
        set.values_mut(weights)[1] = 2.5;
        assert_eq!(set.values(weights)[1], 2.5);
    }

    #[test]
    fn test_new_elems_get_default() {
        let mut set: PropertySet<FaceTag> = PropertySet::new();
        let marks = set.add::<u8>("mark", 7);
        set.add_elems(2);
        set.add_elem();
        assert_eq!(set.values(marks), &[7, 7, 7]);
    }

    #[test]
    fn test_find_by_name_and_type() {
        let mut set: PropertySet<VertexTag> = PropertySet::new();
        let ph = set.add::<f32>("temperature", 0.0);

        assert_eq!(set.find::<f32>("temperature"), Some(ph));
        assert!(set.find::<f64>("temperature").is_none());
        assert!(set.find::<f32>("pressure").is_none());
    }

    #[test]
    fn test_remove_invalidates() {
        let mut set: PropertySet<EdgeTag> = PropertySet::new();
        let ph = set.add::<u32>("id", 0);
        set.remove(ph).unwrap();

        assert!(!set.is_valid(ph));
        assert!(matches!(
            set.try_values(ph),
            Err(MeshError::StaleProperty { .. })
        ));
    }

    #[test]
    fn test_slot_reuse() {
        let mut set: PropertySet<VertexTag> = PropertySet::new();
        let a = set.add::<u32>("a", 0);
        let _b = set.add::<u32>("b", 0);
        set.remove(a).unwrap();

        let c = set.add::<u64>("c", 0);
        assert_eq!(c.slot(), a.slot());
        // A stale handle to the reused slot must not type-pun into "c".
        assert!(set.try_values(a).is_err());
    }

    #[test]
    fn test_move_elem() {
        let mut set: PropertySet<VertexTag> = PropertySet::new();
        let ph = set.add::<i32>("v", 0);
        set.resize(3);
        set.values_mut(ph).copy_from_slice(&[10, 20, 30]);

        set.move_elem(0, 2);
        assert_eq!(set.values(ph), &[30, 20, 30]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut set: PropertySet<VertexTag> = PropertySet::new();
        let ph = set.add::<i32>("v", 0);
        set.resize(1);

        let mut copy = set.clone();
        copy.values_mut(ph)[0] = 42;
        assert_eq!(set.values(ph)[0], 0);
        assert_eq!(copy.values(ph)[0], 42);
    }
}
