use crate::circular_queue::CircularQueue;
use crate::math;

/// Moving average over the last `window` samples.
#[derive(Debug, Clone)]
pub struct RollingAvg {
    history: CircularQueue<f32>,
}

impl RollingAvg {
    pub fn new(window: usize) -> Self {
        Self {
            history: CircularQueue::with_capacity(window),
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Adds a sample and returns the updated average.
    pub fn push(&mut self, value: f32) -> f32 {
        self.history.push(value);
        self.average().unwrap_or(value)
    }

    #[inline]
    pub fn average(&self) -> Option<f32> {
        math::mean(self.history.iter())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.history.capacity()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.history.iter()
    }
}
