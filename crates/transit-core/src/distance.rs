//! Directed road distances between stops.

use crate::entity::StopId;
use std::collections::HashMap;

/// Road distances in meters, keyed by `(from, to)`.
///
/// Distances are asymmetric. Setting `from -> to` also seeds `to -> from`
/// with the same value unless that direction already has one.
#[derive(Debug, Default, Clone)]
pub struct DistanceTable {
    distances: HashMap<(StopId, StopId), u32>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `from -> to`, seeding the reverse direction if it is unset.
    pub fn set(&mut self, from: StopId, to: StopId, meters: u32) {
        self.distances.insert((from, to), meters);
        self.distances.entry((to, from)).or_insert(meters);
    }

    /// Sets exactly one direction. Used when restoring a snapshot.
    pub(crate) fn insert_exact(&mut self, from: StopId, to: StopId, meters: u32) {
        self.distances.insert((from, to), meters);
    }

    pub fn get(&self, from: StopId, to: StopId) -> Option<u32> {
        self.distances.get(&(from, to)).copied()
    }

    /// All known directed distances, sorted by `(from, to)`.
    pub fn entries(&self) -> Vec<(StopId, StopId, u32)> {
        let mut entries: Vec<_> = self
            .distances
            .iter()
            .map(|(&(from, to), &meters)| (from, to, meters))
            .collect();
        entries.sort_unstable_by_key(|&(from, to, _)| (from, to));
        entries
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: StopId = StopId(0);
    const B: StopId = StopId(1);
    const C: StopId = StopId(2);

    #[test]
    fn test_reverse_is_seeded() {
        let mut table = DistanceTable::new();
        table.set(A, B, 3900);

        assert_eq!(table.get(A, B), Some(3900));
        assert_eq!(table.get(B, A), Some(3900));
    }

    #[test]
    fn test_explicit_reverse_survives() {
        let mut table = DistanceTable::new();
        table.set(A, B, 100);
        table.set(B, A, 250);

        assert_eq!(table.get(A, B), Some(100));
        assert_eq!(table.get(B, A), Some(250));

        // overwriting one direction never touches an already known mirror
        table.set(A, B, 120);
        assert_eq!(table.get(A, B), Some(120));
        assert_eq!(table.get(B, A), Some(250));
    }

    #[test]
    fn test_unknown_pair_is_not_zero() {
        let mut table = DistanceTable::new();
        table.set(A, A, 0);

        assert_eq!(table.get(A, A), Some(0));
        assert_eq!(table.get(A, C), None);
    }

    #[test]
    fn test_entries_are_sorted() {
        let mut table = DistanceTable::new();
        table.set(C, A, 7);
        table.set(A, B, 5);

        let entries = table.entries();
        assert_eq!(entries, vec![(A, B, 5), (A, C, 7), (B, A, 5), (C, A, 7)]);
        assert_eq!(table.len(), 4);
    }
}
