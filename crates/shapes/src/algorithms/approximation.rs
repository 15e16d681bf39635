use geo_types::{Coord, LineString};
use crate::{traits::PolygonApproximator, types::Contour};

/// Closed-curve Douglas-Peucker approximation.
///
/// The ring is split at two far-apart points, each half is simplified with
/// geo's Ramer-Douglas-Peucker implementation, and the joined polygon is then
/// swept for vertices that sit within `epsilon` of the line through their
/// neighbors (this also removes split points that landed mid-edge).
#[derive(Debug, Clone, Default)]
pub struct DouglasPeuckerApproximator;

impl PolygonApproximator for DouglasPeuckerApproximator {
    fn approximate(&self, contour: &Contour, epsilon: f64) -> Vec<[i32; 2]> {
        let points = &contour.points;
        if points.len() < 3 {
            return points.to_vec();
        }

        let (a, a_dist) = farthest_from(points, points[0]);
        if a_dist == 0.0 {
            // every point coincides
            return vec![points[0]];
        }
        let (b, _) = farthest_from(points, points[a]);
        let (i, j) = (a.min(b), a.max(b));

        let first_half: Vec<[i32; 2]> = points[i..=j].to_vec();
        let second_half: Vec<[i32; 2]> = points[j..].iter().chain(&points[..=i]).copied().collect();

        let first = simplify_open(&first_half, epsilon);
        let second = simplify_open(&second_half, epsilon);

        // second half starts at j and ends at i, both already in `first`
        let mut polygon = first;
        if second.len() > 2 {
            polygon.extend_from_slice(&second[1..second.len() - 1]);
        }

        remove_flat_vertices(&mut polygon, epsilon);
        polygon
    }
}

fn farthest_from(points: &[[i32; 2]], origin: [i32; 2]) -> (usize, f64) {
    points
        .iter()
        .enumerate()
        .map(|(index, &p)| (index, distance(p, origin)))
        .fold((0, 0.0), |best, candidate| if candidate.1 > best.1 { candidate } else { best })
}

fn simplify_open(points: &[[i32; 2]], epsilon: f64) -> Vec<[i32; 2]> {
    use geo::Simplify;

    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|&[x, y]| Coord { x: x as f64, y: y as f64 })
        .collect();
    LineString::new(coords)
        .simplify(&epsilon)
        .coords()
        .map(|c| [c.x.round() as i32, c.y.round() as i32])
        .collect()
}

/// Cyclically drop vertices within `epsilon` of the line joining their neighbors
/// until none is left to drop.
fn remove_flat_vertices(polygon: &mut Vec<[i32; 2]>, epsilon: f64) {
    let mut changed = true;
    while changed && polygon.len() > 2 {
        changed = false;
        let mut i = 0;
        while i < polygon.len() && polygon.len() > 2 {
            let n = polygon.len();
            let prev = polygon[(i + n - 1) % n];
            let next = polygon[(i + 1) % n];
            if line_distance(polygon[i], prev, next) <= epsilon {
                polygon.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }
}

fn distance(a: [i32; 2], b: [i32; 2]) -> f64 {
    let dx = (a[0] - b[0]) as f64;
    let dy = (a[1] - b[1]) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: [i32; 2], a: [i32; 2], b: [i32; 2]) -> f64 {
    let length = distance(a, b);
    if length == 0.0 {
        return distance(p, a);
    }
    let cross = (b[0] - a[0]) as f64 * (p[1] - a[1]) as f64
        - (b[1] - a[1]) as f64 * (p[0] - a[0]) as f64;
    cross.abs() / length
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approximate(points: Vec<[i32; 2]>) -> Vec<[i32; 2]> {
        let contour = Contour::new(points);
        let epsilon = 0.02 * contour.perimeter();
        DouglasPeuckerApproximator.approximate(&contour, epsilon)
    }

    /// Every integer pixel along the closed polyline through `corners`.
    fn densify(corners: &[[i32; 2]]) -> Vec<[i32; 2]> {
        let mut points = Vec::new();
        for (k, &start) in corners.iter().enumerate() {
            let end = corners[(k + 1) % corners.len()];
            let steps = (end[0] - start[0]).abs().max((end[1] - start[1]).abs());
            for s in 0..steps {
                let t = s as f64 / steps as f64;
                points.push([
                    (start[0] as f64 + t * (end[0] - start[0]) as f64).round() as i32,
                    (start[1] as f64 + t * (end[1] - start[1]) as f64).round() as i32,
                ]);
            }
        }
        points
    }

    #[test]
    fn test_square_corners_survive() {
        let polygon = approximate(vec![[0, 0], [100, 0], [100, 100], [0, 100]]);
        assert_eq!(polygon.len(), 4);
    }

    #[test]
    fn test_dense_square_starting_mid_edge() {
        let mut dense = densify(&[[0, 0], [100, 0], [100, 100], [0, 100]]);
        dense.rotate_left(50);
        let mut polygon = approximate(dense);
        polygon.sort();
        assert_eq!(polygon, vec![[0, 0], [0, 100], [100, 0], [100, 100]]);
    }

    #[test]
    fn test_small_wobble_is_removed() {
        let polygon = approximate(vec![[0, 0], [50, 1], [100, 0], [100, 100], [0, 100]]);
        assert_eq!(polygon.len(), 4);
    }

    #[test]
    fn test_two_points_stay_a_line() {
        assert_eq!(approximate(vec![[0, 0], [40, 0]]).len(), 2);
    }

    #[test]
    fn test_collapsed_points_become_single_vertex() {
        assert_eq!(approximate(vec![[5, 5], [5, 5], [5, 5]]), vec![[5, 5]]);
    }

    #[test]
    fn test_flat_ring_becomes_line() {
        let polygon = approximate(vec![[0, 0], [30, 0], [60, 0], [30, 0]]);
        assert_eq!(polygon.len(), 2);
    }

    #[test]
    fn test_line_distance() {
        assert_eq!(line_distance([5, 3], [0, 0], [10, 0]), 3.0);
        assert_eq!(line_distance([3, 4], [0, 0], [0, 0]), 5.0);
    }
}
