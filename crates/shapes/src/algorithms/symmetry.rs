use geo_types::Point;
use crate::{config::SymmetryMethod, traits::SymmetryTest, types::Centroid};

/// Pairs point `i` with point `(N - i) mod N` of the traversal order.
///
/// This compares positions directly, so the outcome depends on where tracing
/// started and in which direction it ran. It is not a spatial mirror test.
#[derive(Debug, Clone, Default)]
pub struct IndexPairingSymmetry;

impl SymmetryTest for IndexPairingSymmetry {
    fn is_symmetric(&self, points: &[[i32; 2]], _centroid: Centroid, tolerance: i32) -> bool {
        let n = points.len();
        (0..n).all(|i| {
            let [x1, y1] = points[i];
            let [x2, y2] = points[(n - i) % n];
            (x1 - x2).abs() <= tolerance && (y1 - y2).abs() <= tolerance
        })
    }
}

/// Reflects every point through the vertical axis `x = centroid.x` and requires
/// the reflection to lie within `tolerance` pixels of the contour outline.
#[derive(Debug, Clone, Default)]
pub struct MirrorSymmetry;

impl SymmetryTest for MirrorSymmetry {
    fn is_symmetric(&self, points: &[[i32; 2]], centroid: Centroid, tolerance: i32) -> bool {
        use geo::EuclideanDistance;

        let Some(&first) = points.first() else {
            return true;
        };
        let ring: geo_types::LineString<f64> = points
            .iter()
            .chain(std::iter::once(&first))
            .map(|&[x, y]| (x as f64, y as f64))
            .collect();

        points.iter().all(|&[x, y]| {
            let reflected = Point::new((2 * centroid.x - x) as f64, y as f64);
            reflected.euclidean_distance(&ring) <= tolerance as f64
        })
    }
}

pub fn symmetry_test_for(method: SymmetryMethod) -> Box<dyn SymmetryTest> {
    match method {
        SymmetryMethod::IndexPairing => Box::new(IndexPairingSymmetry),
        SymmetryMethod::Mirror => Box::new(MirrorSymmetry),
    }
}
