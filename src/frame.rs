use serde_derive::{Deserialize, Serialize};

use crate::detection::Blob;

/// Segmented frame: its dimensions, the blobs found in it and when it was taken.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Frame {
    pub dims: (u32, u32),
    pub blobs: Vec<Blob>,
    pub timestamp: f64, // in seconds
}

impl Frame {
    pub fn new(dims: (u32, u32), timestamp: f64, blobs: Vec<Blob>) -> Self {
        Self {
            dims,
            blobs,
            timestamp,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Blob> {
        self.blobs.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}
