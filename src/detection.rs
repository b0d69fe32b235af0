use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};

/// Foreground blob reported by segmentation: bounding box (left, top, width, height)
/// and the pixel area of the contour it was taken from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(rename = "a")]
    pub area: f32,
}

impl Blob {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32, area: f32) -> Self {
        Self { x, y, w, h, area }
    }

    /// Blob whose contour fills its whole bounding box.
    #[inline]
    pub fn from_box(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, w, h, w * h)
    }

    #[inline(always)]
    pub fn bbox(&self) -> BBox<Ltwh> {
        BBox::ltwh(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn aspect_ratio(&self) -> Option<f32> {
        self.bbox().aspect_ratio()
    }
}

/// Shape filter applied to blobs before tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobFilter {
    pub min_area: f32,
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,
}

impl BlobFilter {
    /// Area must reach `min_area`; aspect ratio must lie strictly inside the range.
    pub fn accepts(&self, blob: &Blob) -> bool {
        if blob.area < self.min_area {
            return false;
        }

        match blob.aspect_ratio() {
            Some(ar) => self.min_aspect_ratio < ar && ar < self.max_aspect_ratio,
            None => false,
        }
    }
}
