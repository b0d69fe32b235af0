use crate::bbox::{BBox, Ltwh};
use crate::math;
use crate::scene::TrackStore;
use crate::track::TrackId;
use log::{debug, info};

/// Outcome of [`Tracker::associate`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Association {
    pub id: TrackId,
    /// No existing track overlapped enough, a new one was created
    pub created: bool,
    /// This call moved the track across the counting line
    pub counted: bool,
    /// Overlap with the matched track, `0.0` for new tracks
    pub iou: f32,
}

/// Greedy IoU associator and line-crossing counter.
#[derive(Debug, Clone)]
pub struct Tracker {
    iou_threshold: f32,
    line_y: f32,
    vehicle_count: u64,
}

impl Tracker {
    pub fn new(iou_threshold: f32, line_y: f32) -> Self {
        Self {
            iou_threshold,
            line_y,
            vehicle_count: 0,
        }
    }

    #[inline]
    pub fn line_y(&self) -> f32 {
        self.line_y
    }

    #[inline]
    pub fn vehicle_count(&self) -> u64 {
        self.vehicle_count
    }

    pub fn reset(&mut self) {
        self.vehicle_count = 0;
    }

    /// Best matching track for `bbox`: highest IoU strictly above the threshold.
    ///
    /// Tracks are scanned in creation order and only a strictly higher IoU
    /// replaces the current best, so equal overlaps resolve to the oldest track.
    pub fn best_match(&self, store: &TrackStore, bbox: &BBox<Ltwh>) -> Option<(TrackId, f32)> {
        self.best_index(store, bbox)
            .and_then(|(idx, iou)| Some((store.iter().nth(idx)?.id, iou)))
    }

    fn best_index(&self, store: &TrackStore, bbox: &BBox<Ltwh>) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;

        for (idx, track) in store.iter().enumerate() {
            let iou = math::iou(&track.bbox, bbox);
            if iou <= self.iou_threshold {
                continue;
            }

            match best {
                Some((_, best_iou)) if iou <= best_iou => {}
                _ => best = Some((idx, iou)),
            }
        }

        best
    }

    /// Attaches `bbox` to an existing track or starts a new one, then
    /// counts the track if it just crossed the line top to bottom.
    pub fn associate(&mut self, store: &mut TrackStore, ts: f64, bbox: BBox<Ltwh>) -> Association {
        let (track, created, iou) = match self.best_index(store, &bbox) {
            Some((idx, iou)) => {
                let track = &mut store.tracks_mut()[idx];
                track.update(ts, bbox);
                (track, false, iou)
            }
            None => (store.create(ts, bbox), true, 0.0),
        };

        let mut counted = false;
        if !track.counted && track.crossed(self.line_y) {
            track.counted = true;
            self.vehicle_count += 1;
            counted = true;

            info!(
                "vehicle {} crossed line at y={} (total {})",
                track.id, self.line_y, self.vehicle_count
            );
        } else if !created {
            debug!("track {} matched with iou {:.3}", track.id, iou);
        }

        Association {
            id: track.id,
            created,
            counted,
            iou,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Tracker, TrackStore) {
        (Tracker::new(0.45, 300.0), TrackStore::new(64, 5))
    }

    #[test]
    fn test_new_track_for_unmatched_box() {
        let (mut tracker, mut store) = setup();
        let a = tracker.associate(&mut store, 0.0, BBox::ltwh(100.0, 100.0, 40.0, 40.0));

        assert!(a.created);
        assert!(!a.counted);

        let track = store.get(a.id).unwrap();
        assert!(!track.counted);
        assert_eq!(track.y, track.prev_y);
        assert_eq!(tracker.vehicle_count(), 0);
    }

    #[test]
    fn test_overlapping_box_keeps_identity() {
        let (mut tracker, mut store) = setup();
        let a = tracker.associate(&mut store, 0.0, BBox::ltwh(100.0, 100.0, 40.0, 40.0));
        let b = tracker.associate(&mut store, 0.033, BBox::ltwh(102.0, 101.0, 40.0, 40.0));

        assert!(!b.created);
        assert_eq!(a.id, b.id);
        assert!(b.iou > 0.45);
        assert_eq!(store.len(), 1);

        let track = store.get(a.id).unwrap();
        assert_eq!(track.positions.len(), 2);
        assert_eq!(track.prev_y, 100.0);
        assert_eq!(track.y, 101.0);
    }

    #[test]
    fn test_disjoint_boxes_get_distinct_tracks() {
        let (mut tracker, mut store) = setup();
        let a = tracker.associate(&mut store, 0.0, BBox::ltwh(100.0, 100.0, 40.0, 40.0));
        let b = tracker.associate(&mut store, 0.0, BBox::ltwh(400.0, 100.0, 40.0, 40.0));

        assert!(a.created && b.created);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_low_overlap_is_not_a_match() {
        let (mut tracker, mut store) = setup();
        tracker.associate(&mut store, 0.0, BBox::ltwh(0.0, 0.0, 40.0, 40.0));
        // iou = 800 / 2400 = 0.33
        let b = tracker.associate(&mut store, 0.0, BBox::ltwh(20.0, 0.0, 40.0, 40.0));

        assert!(b.created);
    }

    #[test]
    fn test_tie_goes_to_oldest_track() {
        let (mut tracker, mut store) = setup();
        let first = tracker
            .associate(&mut store, 0.0, BBox::ltwh(0.0, 0.0, 100.0, 100.0))
            .id;

        // A second identical track can only appear through the store directly.
        let second = store.create(0.0, BBox::ltwh(0.0, 0.0, 100.0, 100.0)).id;
        assert!(first < second);

        let a = tracker.associate(&mut store, 0.1, BBox::ltwh(5.0, 0.0, 100.0, 100.0));
        assert_eq!(a.id, first);
    }

    #[test]
    fn test_highest_iou_wins() {
        let (mut tracker, mut store) = setup();
        let far = store.create(0.0, BBox::ltwh(10.0, 0.0, 100.0, 100.0)).id;
        let near = store.create(0.0, BBox::ltwh(2.0, 0.0, 100.0, 100.0)).id;

        let (id, _) = tracker
            .best_match(&store, &BBox::ltwh(0.0, 0.0, 100.0, 100.0))
            .unwrap();
        assert_eq!(id, near);
        assert_ne!(id, far);

        let a = tracker.associate(&mut store, 0.1, BBox::ltwh(0.0, 0.0, 100.0, 100.0));
        assert_eq!(a.id, near);
    }

    #[test]
    fn test_counts_once_on_downward_crossing() {
        let (mut tracker, mut store) = setup();
        let mut id = None;
        let mut transitions = 0;

        for i in 0..20 {
            let y = 250.0 + i as f32 * 6.0;
            let a = tracker.associate(&mut store, i as f64 * 0.05, BBox::ltwh(100.0, y, 60.0, 60.0));
            if let Some(id) = id {
                assert_eq!(a.id, id);
            }
            id = Some(a.id);

            if a.counted {
                transitions += 1;
            }
        }

        assert_eq!(transitions, 1);
        assert_eq!(tracker.vehicle_count(), 1);
        assert!(store.get(id.unwrap()).unwrap().counted);
    }

    #[test]
    fn test_upward_crossing_is_ignored() {
        let (mut tracker, mut store) = setup();

        for i in 0..20 {
            let y = 350.0 - i as f32 * 6.0;
            tracker.associate(&mut store, i as f64 * 0.05, BBox::ltwh(100.0, y, 60.0, 60.0));
        }

        assert_eq!(tracker.vehicle_count(), 0);
        assert!(store.iter().all(|t| !t.counted));
    }

    #[test]
    fn test_counted_track_does_not_recount() {
        let (mut tracker, mut store) = setup();

        // down, back up, down again
        let ys = [290.0, 296.0, 302.0, 296.0, 290.0, 296.0, 302.0, 308.0];
        for (i, y) in ys.iter().enumerate() {
            tracker.associate(&mut store, i as f64 * 0.05, BBox::ltwh(100.0, *y, 60.0, 60.0));
        }

        assert_eq!(store.len(), 1);
        assert_eq!(tracker.vehicle_count(), 1);
    }
}
