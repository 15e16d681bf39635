use std::fmt;

use geo_types::{Coord, LineString, Polygon};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize, Serializer};

/// Which side of a region a traced border lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderKind {
    Outer,
    Hole,
}

/// A closed boundary traced in a binary image.
///
/// Points are integer pixel coordinates (origin top-left) in traversal order.
/// The last point implicitly connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<[i32; 2]>,
    pub border: BorderKind,
    /// Index of the enclosing contour in the same extraction result.
    pub parent: Option<usize>,
}

impl Contour {
    /// An outer contour with no parent, mostly useful for building test geometry.
    pub fn new(points: Vec<[i32; 2]>) -> Self {
        Self {
            points,
            border: BorderKind::Outer,
            parent: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed ring with the first point repeated at the end.
    pub fn to_geo_ring(&self) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&[x, y]| Coord {
                x: x as f64,
                y: y as f64,
            })
            .collect();
        if let Some(&first) = coords.first() {
            coords.push(first);
        }
        LineString::new(coords)
    }

    /// Convert to a geo-types Polygon for area and centroid computations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        Polygon::new(self.to_geo_ring(), vec![])
    }

    /// Arc length of the closed curve.
    pub fn perimeter(&self) -> f64 {
        use geo::EuclideanLength;
        self.to_geo_ring().euclidean_length()
    }

    /// Enclosed area (zeroth area moment), always non-negative.
    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_geo_polygon().unsigned_area()
    }

    /// Centroid from the first-order area moments, truncated to pixels.
    ///
    /// Returns `None` for degenerate contours that enclose no area.
    pub fn centroid(&self) -> Option<Centroid> {
        use geo::Centroid as _;
        if self.area() == 0.0 {
            return None;
        }
        self.to_geo_polygon().centroid().map(|c| Centroid {
            x: c.x() as i32,
            y: c.y() as i32,
        })
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.points)
    }
}

/// Axis-aligned box with inclusive pixel extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn enclosing(points: &[[i32; 2]]) -> Option<Self> {
        let (&[first_x, first_y], rest) = points.split_first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first_x, first_y, first_x, first_y);
        for &[x, y] in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

/// Geometric class assigned to an approximated polygon.
///
/// `Circle` is only the fallback for polygons with fewer than two vertices.
/// It is not the result of any roundness test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeLabel {
    Line,
    Triangle,
    Square,
    Rectangle,
    Pentagon,
    Hexagon,
    /// Polygon with the given number of sides.
    Polygon(usize),
    Star,
    Circle,
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => f.write_str("Line"),
            Self::Triangle => f.write_str("Triangle"),
            Self::Square => f.write_str("Square"),
            Self::Rectangle => f.write_str("Rectangle"),
            Self::Pentagon => f.write_str("Pentagon"),
            Self::Hexagon => f.write_str("Hexagon"),
            Self::Polygon(sides) => write!(f, "Polygon ({sides} sides)"),
            Self::Star => f.write_str("Star"),
            Self::Circle => f.write_str("Circle"),
        }
    }
}

impl Serialize for ShapeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One classified contour.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedShape {
    /// Index into the extracted contour list (discovery order).
    pub contour_index: usize,
    pub border: BorderKind,
    pub polygon: Vec<[i32; 2]>,
    pub bounding_box: Option<BoundingBox>,
    pub label: ShapeLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeDetection {
    #[serde(skip)]
    pub image: RgbImage,
    /// One label per processed contour, in contour-discovery order.
    pub labels: Vec<ShapeLabel>,
    pub shapes: Vec<DetectedShape>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymmetryRegion {
    pub contour_index: usize,
    pub centroid: Centroid,
    pub symmetric: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymmetryReport {
    #[serde(skip)]
    pub image: GrayImage,
    /// Regions with a defined centroid; zero-area contours are not listed.
    pub regions: Vec<SymmetryRegion>,
}

impl SymmetryReport {
    pub fn symmetric_count(&self) -> usize {
        self.regions.iter().filter(|r| r.symmetric).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurveCompletion {
    #[serde(skip)]
    pub image: GrayImage,
    /// Number of closed regions filled into the completion mask.
    pub filled_regions: usize,
}
