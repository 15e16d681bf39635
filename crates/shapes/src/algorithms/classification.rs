use crate::{
    config::ClassifierConfig,
    traits::PolygonApproximator,
    types::{BoundingBox, Contour, ShapeLabel},
};

/// Approximated polygon together with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub polygon: Vec<[i32; 2]>,
    pub label: ShapeLabel,
}

/// Approximate `contour` at `epsilon_fraction` of its perimeter and label the result.
pub fn classify_contour(
    contour: &Contour,
    approximator: &dyn PolygonApproximator,
    config: &ClassifierConfig,
) -> Classification {
    let epsilon = config.epsilon_fraction * contour.perimeter();
    let polygon = approximator.approximate(contour, epsilon);
    let label = classify_polygon(&polygon, config);
    Classification { polygon, label }
}

pub fn classify_polygon(polygon: &[[i32; 2]], config: &ClassifierConfig) -> ShapeLabel {
    let aspect_ratio = BoundingBox::enclosing(polygon).map(|bbox| bbox.aspect_ratio());
    label_for(polygon.len(), aspect_ratio, config)
}

/// The vertex-count decision table.
///
/// `aspect_ratio` (bounding-box width over height) only matters for four
/// vertices; a missing ratio there counts as a rectangle. Counts below two
/// fall through to `Circle`.
pub fn label_for(vertices: usize, aspect_ratio: Option<f64>, config: &ClassifierConfig) -> ShapeLabel {
    match vertices {
        2 => ShapeLabel::Line,
        3 => ShapeLabel::Triangle,
        4 => match aspect_ratio {
            Some(ratio)
                if ratio >= config.square_aspect_min && ratio <= config.square_aspect_max =>
            {
                ShapeLabel::Square
            }
            _ => ShapeLabel::Rectangle,
        },
        5 => ShapeLabel::Pentagon,
        6 => ShapeLabel::Hexagon,
        v if v >= 7 && v <= config.max_polygon_vertices => ShapeLabel::Polygon(v),
        v if v > config.max_polygon_vertices => ShapeLabel::Star,
        _ => ShapeLabel::Circle,
    }
}
