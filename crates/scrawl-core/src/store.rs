//! Drawing record store.
//!
//! Owns every active record and the surface handle of its painted shape.
//! Removal always releases the handle, so nothing is left behind on the
//! surface once a record is gone.

use crate::clock::Timestamp;
use crate::drawing::{DrawingId, DrawingRecord};
use crate::paint::record_ops;
use crate::surface::{DrawSurface, ShapeHandle, place, release};
use std::collections::{HashMap, HashSet};

/// Where a record's shape stands on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaintState {
    /// The surface was not ready yet; retried by `paint_pending`.
    Pending,
    Placed(ShapeHandle),
    /// The surface refused the shape. Not retried.
    Dropped,
}

#[derive(Debug)]
struct Entry {
    record: DrawingRecord,
    paint: PaintState,
}

impl Entry {
    fn handle(&self) -> Option<ShapeHandle> {
        match self.paint {
            PaintState::Placed(handle) => Some(handle),
            PaintState::Pending | PaintState::Dropped => None,
        }
    }
}

/// Active records keyed by id, kept in paint order.
#[derive(Debug)]
pub struct DrawingStore<S> {
    entries: HashMap<DrawingId, Entry>,
    /// Insertion order (back to front).
    order: Vec<DrawingId>,
    surface: S,
}

impl<S: DrawSurface> DrawingStore<S> {
    pub fn new(surface: S) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            surface,
        }
    }

    /// Insert and paint a record.
    ///
    /// Returns `false` without touching anything if the id is already
    /// present; redelivery and self-echo land here.
    pub fn insert(&mut self, record: DrawingRecord) -> bool {
        if self.entries.contains_key(record.id()) {
            log::debug!("Drawing {} already present, ignoring", record.id());
            return false;
        }
        let paint = self.paint(&record);
        let id = record.id().clone();
        self.order.push(id.clone());
        self.entries.insert(id, Entry { record, paint });
        true
    }

    fn paint(&mut self, record: &DrawingRecord) -> PaintState {
        if !self.surface.is_ready() {
            return PaintState::Pending;
        }
        match place(&mut self.surface, record_ops(record)) {
            Some(handle) => PaintState::Placed(handle),
            None => PaintState::Dropped,
        }
    }

    pub fn contains(&self, id: &DrawingId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &DrawingId) -> Option<&DrawingRecord> {
        self.entries.get(id).map(|entry| &entry.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in paint order.
    pub fn records(&self) -> impl Iterator<Item = &DrawingRecord> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id).map(|entry| &entry.record))
    }

    /// Remove one record, if present.
    pub fn remove_by_id(&mut self, id: &DrawingId) -> Option<DrawingRecord> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|other| other != id);
        if let Some(handle) = entry.handle() {
            release(&mut self.surface, handle);
        }
        Some(entry.record)
    }

    /// Remove a batch of records in one pass over the paint order. Returns
    /// the removed records in paint order.
    pub fn remove_many(&mut self, ids: &[DrawingId]) -> Vec<DrawingRecord> {
        let doomed: HashSet<&DrawingId> = ids.iter().filter(|id| self.entries.contains_key(*id)).collect();
        if doomed.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::with_capacity(doomed.len());
        let mut kept = Vec::with_capacity(self.order.len() - doomed.len());
        for id in std::mem::take(&mut self.order) {
            if !doomed.contains(&id) {
                kept.push(id);
                continue;
            }
            if let Some(entry) = self.entries.remove(&id) {
                if let Some(handle) = entry.handle() {
                    release(&mut self.surface, handle);
                }
                removed.push(entry.record);
            }
        }
        self.order = kept;
        removed
    }

    /// Remove everything. Used for erase-all and teardown.
    pub fn remove_all(&mut self) -> Vec<DrawingRecord> {
        let order = std::mem::take(&mut self.order);
        let mut removed = Vec::with_capacity(order.len());
        for id in order {
            if let Some(entry) = self.entries.remove(&id) {
                if let Some(handle) = entry.handle() {
                    release(&mut self.surface, handle);
                }
                removed.push(entry.record);
            }
        }
        removed
    }

    /// Remove every record authored by `owner_id`.
    pub fn remove_by_owner(&mut self, owner_id: &str) -> Vec<DrawingRecord> {
        let ids: Vec<DrawingId> = self
            .records()
            .filter(|record| record.is_owned_by(owner_id))
            .map(|record| record.id().clone())
            .collect();
        self.remove_many(&ids)
    }

    /// Records whose expiry is at or before `now`.
    pub fn query_expired(&self, now: Timestamp) -> Vec<&DrawingRecord> {
        self.records().filter(|record| record.is_expired(now)).collect()
    }

    /// Paint records that were inserted while the surface was not ready.
    /// Shapes the surface refused stay dropped. Returns how many got painted.
    pub fn paint_pending(&mut self) -> usize {
        if !self.surface.is_ready() {
            return 0;
        }
        let mut painted = 0;
        for id in &self.order {
            let Some(entry) = self.entries.get_mut(id) else {
                continue;
            };
            if entry.paint != PaintState::Pending {
                continue;
            }
            entry.paint = match place(&mut self.surface, record_ops(&entry.record)) {
                Some(handle) => {
                    painted += 1;
                    PaintState::Placed(handle)
                }
                None => PaintState::Dropped,
            };
        }
        painted
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{DrawingStyle, Geometry, StrokeGeometry};
    use crate::testing::RecordingSurface;
    use kurbo::{Point, Vec2};

    fn record(owner: &str, expires_at: Option<u64>) -> DrawingRecord {
        let geometry = Geometry::Stroke(
            StrokeGeometry::new(Point::new(1.0, 1.0), vec![Vec2::ZERO, Vec2::new(5.0, 5.0)]).unwrap(),
        );
        DrawingRecord::new(
            DrawingId::generate(),
            owner,
            owner.to_uppercase(),
            geometry,
            DrawingStyle::default(),
            Timestamp::ZERO,
            expires_at.map(Timestamp::from_millis),
        )
        .unwrap()
    }

    fn store() -> (DrawingStore<RecordingSurface>, RecordingSurface) {
        let surface = RecordingSurface::new();
        (DrawingStore::new(surface.clone()), surface)
    }

    #[test]
    fn test_insert_paints_once() {
        let (mut store, surface) = store();
        let r = record("a", None);
        assert!(store.insert(r.clone()));
        assert!(!store.insert(r.clone()));
        assert_eq!(store.len(), 1);
        assert_eq!(surface.log().added.len(), 1);
        assert_eq!(store.get(r.id()), Some(&r));
    }

    #[test]
    fn test_remove_by_id_releases_shape() {
        let (mut store, surface) = store();
        let r = record("a", None);
        store.insert(r.clone());
        assert_eq!(store.remove_by_id(r.id()), Some(r.clone()));
        assert!(store.remove_by_id(r.id()).is_none());
        assert_eq!(surface.log().removed.len(), 1);
        assert_eq!(surface.live_count(), 0);
    }

    #[test]
    fn test_remove_all_releases_every_shape() {
        let (mut store, surface) = store();
        for owner in ["a", "b", "c"] {
            store.insert(record(owner, None));
        }
        let removed = store.remove_all();
        assert_eq!(removed.len(), 3);
        assert!(store.is_empty());

        let log = surface.log();
        let mut added: Vec<ShapeHandle> = log.added.iter().map(|(h, _)| *h).collect();
        let mut released = log.removed.clone();
        added.sort();
        released.sort();
        assert_eq!(added, released);
    }

    #[test]
    fn test_remove_by_owner() {
        let (mut store, _) = store();
        store.insert(record("b", None));
        let kept = record("c", None);
        store.insert(kept.clone());
        store.insert(record("b", None));

        let removed = store.remove_by_owner("b");
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|r| r.owner_id() == "b"));
        assert_eq!(store.len(), 1);
        assert!(store.contains(kept.id()));
    }

    #[test]
    fn test_query_expired() {
        let (mut store, _) = store();
        store.insert(record("a", Some(100)));
        store.insert(record("a", Some(200)));
        store.insert(record("a", None));

        assert!(store.query_expired(Timestamp::from_millis(99)).is_empty());
        assert_eq!(store.query_expired(Timestamp::from_millis(100)).len(), 1);
        assert_eq!(store.query_expired(Timestamp::from_millis(u64::MAX)).len(), 2);
    }

    #[test]
    fn test_records_in_insertion_order() {
        let (mut store, _) = store();
        let ids: Vec<DrawingId> = (0..4)
            .map(|_| {
                let r = record("a", None);
                let id = r.id().clone();
                store.insert(r);
                id
            })
            .collect();
        store.remove_by_id(&ids[1]);
        let order: Vec<&DrawingId> = store.records().map(|r| r.id()).collect();
        assert_eq!(order, vec![&ids[0], &ids[2], &ids[3]]);
    }

    #[test]
    fn test_unready_surface_paints_later() {
        let (mut store, surface) = store();
        surface.set_ready(false);
        let r = record("a", None);
        store.insert(r.clone());
        assert!(store.contains(r.id()));
        assert!(surface.log().added.is_empty());
        assert_eq!(store.paint_pending(), 0);

        surface.set_ready(true);
        assert_eq!(store.paint_pending(), 1);
        assert_eq!(store.paint_pending(), 0);
        assert_eq!(surface.live_count(), 1);
    }

    #[test]
    fn test_rejected_shape_not_retried() {
        let (mut store, surface) = store();
        surface.set_rejecting(true);
        let r = record("b", None);
        assert!(store.insert(r.clone()));
        for _ in 0..5 {
            assert_eq!(store.paint_pending(), 0);
        }
        assert_eq!(surface.log().attempts, 1);
        assert!(store.contains(r.id()));

        surface.set_rejecting(false);
        assert_eq!(store.paint_pending(), 0);
        assert_eq!(surface.log().attempts, 1);
        store.remove_by_id(r.id());
        assert!(surface.log().removed.is_empty());
    }

    #[test]
    fn test_remove_many_keeps_order() {
        let (mut store, surface) = store();
        let ids: Vec<DrawingId> = (0..5)
            .map(|_| {
                let r = record("a", None);
                let id = r.id().clone();
                store.insert(r);
                id
            })
            .collect();
        let removed = store.remove_many(&[ids[3].clone(), ids[0].clone(), DrawingId::generate()]);
        let removed: Vec<&DrawingId> = removed.iter().map(|r| r.id()).collect();
        assert_eq!(removed, vec![&ids[0], &ids[3]]);
        let order: Vec<&DrawingId> = store.records().map(|r| r.id()).collect();
        assert_eq!(order, vec![&ids[1], &ids[2], &ids[4]]);
        assert_eq!(surface.live_count(), 3);
        assert!(store.remove_many(&[]).is_empty());
    }

    #[test]
    fn test_unpainted_removal_touches_nothing() {
        let (mut store, surface) = store();
        surface.set_ready(false);
        let r = record("a", None);
        store.insert(r.clone());
        store.remove_by_id(r.id());
        assert!(surface.log().removed.is_empty());
    }
}
