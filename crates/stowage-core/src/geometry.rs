//! Axis-aligned voxel geometry: orientation sets and box overlap tests.

use crate::types::{Dimensions, Position};

/// All distinct axis permutations of `dims`, in a fixed order.
///
/// The full order is `(w,d,h), (w,h,d), (d,w,h), (d,h,w), (h,w,d), (h,d,w)`;
/// permutations that collapse onto an earlier one (two or more equal extents)
/// are dropped. Callers rely on this order for deterministic tie-breaking
/// between equally scored orientations.
pub fn orientations(dims: &Dimensions) -> Vec<Dimensions> {
    let Dimensions {
        width: w,
        depth: d,
        height: h,
    } = *dims;
    distinct(&[
        (w, d, h),
        (w, h, d),
        (d, w, h),
        (d, h, w),
        (h, w, d),
        (h, d, w),
    ])
}

/// Reduced orientation set for very large items: three permutations, each
/// original extent leading exactly once.
pub fn reduced_orientations(dims: &Dimensions) -> Vec<Dimensions> {
    let Dimensions {
        width: w,
        depth: d,
        height: h,
    } = *dims;
    distinct(&[(w, d, h), (d, w, h), (h, w, d)])
}

fn distinct(candidates: &[(u32, u32, u32)]) -> Vec<Dimensions> {
    let mut out: Vec<Dimensions> = Vec::with_capacity(candidates.len());
    for &(width, depth, height) in candidates {
        let dims = Dimensions {
            width,
            depth,
            height,
        };
        if !out.contains(&dims) {
            out.push(dims);
        }
    }
    out
}

/// Whether two half-open boxes share at least one voxel.
///
/// Two boxes are disjoint iff they are separated on at least one axis.
pub fn boxes_overlap(a: &Position, b: &Position) -> bool {
    a.start_coordinates.width < b.end_coordinates.width
        && b.start_coordinates.width < a.end_coordinates.width
        && a.start_coordinates.depth < b.end_coordinates.depth
        && b.start_coordinates.depth < a.end_coordinates.depth
        && a.start_coordinates.height < b.end_coordinates.height
        && b.start_coordinates.height < a.end_coordinates.height
}
