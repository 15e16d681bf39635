use image::GrayImage;
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::{
    error::Result,
    traits::ContourExtractor,
    types::{BorderKind, Contour},
};

/// Which traced borders are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retrieval {
    /// Every outer and hole border, with parent links preserved.
    #[default]
    All,
    /// Only outer borders that are not nested inside another region.
    External,
}

/// Suzuki-Abe border following via `imageproc::contours::find_contours`,
/// followed by chain compression of straight runs.
#[derive(Debug, Clone, Default)]
pub struct ImageprocContourExtractor {
    pub retrieval: Retrieval,
}

impl ImageprocContourExtractor {
    pub fn all() -> Self {
        Self { retrieval: Retrieval::All }
    }

    pub fn external() -> Self {
        Self { retrieval: Retrieval::External }
    }
}

impl ContourExtractor for ImageprocContourExtractor {
    fn extract_contours(&self, binary_image: &GrayImage) -> Result<Vec<Contour>> {
        let traced = imageproc::contours::find_contours::<i32>(binary_image);
        let total = traced.len();

        let contours: Vec<Contour> = traced
            .into_iter()
            .filter(|contour| match self.retrieval {
                Retrieval::All => true,
                Retrieval::External => {
                    contour.border_type == BorderType::Outer && contour.parent.is_none()
                }
            })
            .map(|contour| {
                let points: Vec<[i32; 2]> = contour.points.iter().map(|p| [p.x, p.y]).collect();
                Contour {
                    points: compress_chain(&points),
                    border: match contour.border_type {
                        BorderType::Outer => BorderKind::Outer,
                        BorderType::Hole => BorderKind::Hole,
                    },
                    parent: match self.retrieval {
                        Retrieval::All => contour.parent,
                        Retrieval::External => None,
                    },
                }
            })
            .collect();

        debug!(traced = total, kept = contours.len(), retrieval = ?self.retrieval, "extracted contours");
        Ok(contours)
    }
}

/// Drop points lying inside a straight run of a closed chain.
///
/// A point is redundant when the step into it equals the step out of it.
/// The starting point is always kept so the traversal origin is stable.
pub fn compress_chain(points: &[[i32; 2]]) -> Vec<[i32; 2]> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let step = |from: [i32; 2], to: [i32; 2]| [to[0] - from[0], to[1] - from[1]];

    let mut compressed = Vec::with_capacity(n);
    compressed.push(points[0]);
    for i in 1..n {
        let prev = points[i - 1];
        let current = points[i];
        let next = points[(i + 1) % n];
        if step(prev, current) != step(current, next) {
            compressed.push(current);
        }
    }
    compressed
}
