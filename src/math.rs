use crate::bbox::{BBox, Ltwh};
use nalgebra as na;

/// Intersection over union of two boxes.
///
/// Disjoint and degenerate boxes give `0.0`, never `NaN`.
pub fn iou(a: &BBox<Ltwh>, b: &BBox<Ltwh>) -> f32 {
    let i_area = a
        .as_ltrb()
        .intersection(&b.as_ltrb())
        .map(|i| i.as_ltwh().area())
        .unwrap_or(0.0);

    let union = a.area() + b.area() - i_area;

    if union > 0.0 {
        i_area / union
    } else {
        0.0
    }
}

/// Sum of distances between consecutive points.
pub fn path_length<'a, I>(points: I) -> f32
where
    I: IntoIterator<Item = &'a na::Point2<f32>>,
{
    let mut iter = points.into_iter();
    let mut prev = match iter.next() {
        Some(p) => p,
        None => return 0.0,
    };

    let mut total = 0.0;
    for p in iter {
        total += na::distance(prev, p);
        prev = p;
    }

    total
}

pub fn mean<'a, I>(values: I) -> Option<f32>
where
    I: IntoIterator<Item = &'a f32>,
{
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));

    if n > 0 {
        Some(sum / n as f32)
    } else {
        None
    }
}
