use geo::{Area, BooleanOps, Euclidean, Length};
use geo_types::MultiPolygon;
use std::collections::VecDeque;

/// Spatial union of a dissolve group's footprints.
///
/// A single footprint comes back untouched. Larger groups are reduced pairwise
/// so each boolean op works on operands of similar size.
pub fn union_geometries(geometries: &[&MultiPolygon<f64>]) -> MultiPolygon<f64> {
    match geometries {
        [] => MultiPolygon::new(Vec::new()),
        [single] => (*single).clone(),
        _ => pairwise_union(geometries.iter().map(|g| (*g).clone()).collect()),
    }
}

fn pairwise_union(footprints: Vec<MultiPolygon<f64>>) -> MultiPolygon<f64> {
    let mut queue: VecDeque<MultiPolygon<f64>> = footprints
        .into_iter()
        .filter(|footprint| !footprint.0.is_empty())
        .collect();

    while queue.len() > 1 {
        let mut next_queue = VecDeque::with_capacity((queue.len() + 1) / 2);
        while let Some(a) = queue.pop_front() {
            if let Some(b) = queue.pop_front() {
                next_queue.push_back(a.union(&b));
            } else {
                next_queue.push_back(a);
            }
        }
        queue = next_queue;
    }

    queue.pop_front().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Planar area of the footprint in squared CRS units.
pub fn footprint_area(geometry: &MultiPolygon<f64>) -> f64 {
    geometry.unsigned_area()
}

/// Total length of every exterior and interior ring.
pub fn footprint_perimeter(geometry: &MultiPolygon<f64>) -> f64 {
    geometry
        .0
        .iter()
        .map(|polygon| {
            polygon.exterior().length::<Euclidean>()
                + polygon
                    .interiors()
                    .iter()
                    .map(|ring| ring.length::<Euclidean>())
                    .sum::<f64>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{approx_eq, square};

    #[test]
    fn single_footprint_is_identity() {
        let footprint = square(10.0, 20.0, 5.0);
        assert_eq!(union_geometries(&[&footprint]), footprint);
    }

    #[test]
    fn overlapping_footprints_merge_into_one_region() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(1.0, 0.0, 2.0);
        let merged = union_geometries(&[&a, &b]);
        assert_eq!(merged.0.len(), 1);
        approx_eq(footprint_area(&merged), 6.0, 1e-9);
        approx_eq(footprint_perimeter(&merged), 10.0, 1e-9);
    }

    #[test]
    fn disjoint_footprints_stay_separate() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(5.0, 5.0, 1.0);
        let c = square(10.0, 0.0, 1.0);
        let merged = union_geometries(&[&a, &b, &c]);
        assert_eq!(merged.0.len(), 3);
        approx_eq(footprint_area(&merged), 3.0, 1e-9);
    }

    #[test]
    fn stacked_identical_footprints_collapse() {
        let floor = square(0.0, 0.0, 3.0);
        let merged = union_geometries(&[&floor, &floor, &floor, &floor]);
        assert_eq!(merged.0.len(), 1);
        approx_eq(footprint_area(&merged), 9.0, 1e-9);
    }

    #[test]
    fn perimeter_counts_holes() {
        let outer = square(0.0, 0.0, 4.0).0.remove(0);
        let hole = square(1.0, 1.0, 1.0).0.remove(0);
        let donut = MultiPolygon::new(vec![geo_types::Polygon::new(
            outer.exterior().clone(),
            vec![hole.exterior().clone()],
        )]);
        approx_eq(footprint_perimeter(&donut), 20.0, 1e-9);
        approx_eq(footprint_area(&donut), 15.0, 1e-9);
    }

    #[test]
    fn empty_members_are_ignored() {
        let empty = MultiPolygon::new(Vec::new());
        let a = square(0.0, 0.0, 1.0);
        let merged = union_geometries(&[&empty, &a]);
        approx_eq(footprint_area(&merged), 1.0, 1e-9);
        assert!(union_geometries(&[]).0.is_empty());
    }
}
