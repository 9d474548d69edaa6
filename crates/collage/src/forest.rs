//! The depth-indexed descriptor forest stored on the clipboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use collage_core::identifier::Id;

use crate::descriptor::Descriptor;

/// Descriptors of a copied selection, bucketed by depth.
///
/// Depth 0 holds the selection roots and their dependents; each nesting level
/// below a root adds one. Buckets are kept in ascending depth order and
/// descriptors within a bucket in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    depths: BTreeMap<usize, Vec<Descriptor>>,
}

impl Forest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a bucket exists for `depth`, even if it stays empty.
    pub fn ensure_depth(&mut self, depth: usize) {
        self.depths.entry(depth).or_default();
    }

    /// Append a descriptor to the bucket of `depth`.
    pub fn push(&mut self, depth: usize, descriptor: Descriptor) {
        self.depths.entry(depth).or_default().push(descriptor);
    }

    /// Descriptors at `depth`, if the depth was visited.
    pub fn depth(&self, depth: usize) -> Option<&[Descriptor]> {
        self.depths.get(&depth).map(Vec::as_slice)
    }

    /// Iterate over `(depth, descriptors)` in ascending depth order.
    pub fn depths(&self) -> impl Iterator<Item = (usize, &[Descriptor])> {
        self.depths
            .iter()
            .map(|(depth, descriptors)| (*depth, descriptors.as_slice()))
    }

    /// Iterate over every descriptor, shallowest first.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.depths.values().flatten()
    }

    pub(crate) fn descriptors_mut(&mut self) -> impl Iterator<Item = &mut Descriptor> {
        self.depths.values_mut().flatten()
    }

    /// Find the descriptor copied from `id` and the depth it sits at.
    pub fn find(&self, id: Id) -> Option<(usize, &Descriptor)> {
        self.depths().find_map(|(depth, descriptors)| {
            descriptors
                .iter()
                .find(|descriptor| descriptor.id == id)
                .map(|descriptor| (depth, descriptor))
        })
    }

    /// Identifiers of the descriptors at `depth`, in bucket order.
    pub fn ids_at(&self, depth: usize) -> Vec<Id> {
        self.depth(depth)
            .map(|descriptors| descriptors.iter().map(|descriptor| descriptor.id).collect())
            .unwrap_or_default()
    }

    /// Total number of descriptors.
    pub fn len(&self) -> usize {
        self.depths.values().map(Vec::len).sum()
    }

    /// Returns true if the forest holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of depth buckets, empty ones included.
    pub fn depth_count(&self) -> usize {
        self.depths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_forest() {
        let forest = Forest::new();
        assert!(forest.is_empty());
        assert_eq!(forest.depth_count(), 0);
        assert!(forest.depth(0).is_none());
    }

    #[test]
    fn test_empty_bucket_counts_as_depth() {
        let mut forest = Forest::new();
        forest.ensure_depth(1);

        assert!(forest.is_empty());
        assert_eq!(forest.depth_count(), 1);
        assert!(forest.depth(1).is_some_and(|bucket| bucket.is_empty()));
    }

    #[test]
    fn test_depths_are_ascending() {
        let mut forest = Forest::new();
        forest.push(2, Descriptor::new(Id::new("g")));
        forest.push(0, Descriptor::new(Id::new("e")));
        forest.push(1, Descriptor::new(Id::new("f")));

        let depths: Vec<usize> = forest.depths().map(|(depth, _)| depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(forest.len(), 3);
    }

    #[test]
    fn test_find() {
        let mut forest = Forest::new();
        forest.push(0, Descriptor::new(Id::new("b")));
        forest.push(1, Descriptor::new(Id::new("c")));

        let (depth, descriptor) = forest.find(Id::new("c")).unwrap();
        assert_eq!(depth, 1);
        assert_eq!(descriptor.id, "c");
        assert!(forest.find(Id::new("zzz")).is_none());
        assert_eq!(forest.ids_at(0), vec![Id::new("b")]);
    }
}
