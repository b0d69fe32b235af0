use crate::bbox::{BBox, Ltwh};
use crate::track::{Track, TrackId};
use log::debug;

/// Active tracks, in creation order.
///
/// Identities come from a per-store counter and are never handed out twice,
/// not even after eviction or [`TrackStore::clear`].
#[derive(Debug)]
pub struct TrackStore {
    tracks: Vec<Track>,
    next_id: u64,
    position_retention: usize,
    speed_window: usize,
}

impl TrackStore {
    pub fn new(position_retention: usize, speed_window: usize) -> Self {
        Self {
            tracks: Vec::with_capacity(64),
            next_id: 1,
            position_retention,
            speed_window,
        }
    }

    pub fn create(&mut self, ts: f64, bbox: BBox<Ltwh>) -> &mut Track {
        let id = TrackId(self.next_id);
        self.next_id += 1;

        debug!("new track {} at {:?}", id, bbox.as_slice());

        self.tracks.push(Track::new(
            id,
            ts,
            bbox,
            self.position_retention,
            self.speed_window,
        ));

        let last = self.tracks.len() - 1;
        &mut self.tracks[last]
    }

    #[inline]
    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    #[inline]
    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Drops every track not matched within `staleness` seconds of `now`.
    ///
    /// Returns the number of evicted tracks.
    pub fn evict_stale(&mut self, now: f64, staleness: f64) -> usize {
        let before = self.tracks.len();

        self.tracks.retain(|t| {
            let keep = t.time_since_update(now) < staleness;
            if !keep {
                debug!(
                    "evicting track {} (last seen {:.3}s ago)",
                    t.id,
                    t.time_since_update(now)
                );
            }

            keep
        });

        before - self.tracks.len()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
