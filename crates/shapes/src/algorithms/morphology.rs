use image::{GrayImage, Luma};
use imageproc::{
    distance_transform::Norm,
    drawing::draw_polygon_mut,
    morphology::{dilate, erode},
    point::Point,
};
use crate::{render::draw_closed_polyline, types::Contour};

/// Morphological closing with a `kernel_size`×`kernel_size` all-ones element.
///
/// Runs `iterations` dilations and then the same number of erosions, which is
/// not the same as closing `iterations` times.
pub fn close_binary(mask: &GrayImage, kernel_size: u32, iterations: u32) -> GrayImage {
    let radius = (kernel_size / 2).min(u8::MAX as u32) as u8;
    if radius == 0 {
        return mask.clone();
    }

    let mut closed = mask.clone();
    for _ in 0..iterations {
        closed = dilate(&closed, Norm::LInf, radius);
    }
    for _ in 0..iterations {
        closed = erode(&closed, Norm::LInf, radius);
    }
    closed
}

/// Blank mask of the given size with every contour's interior and border set to 255.
pub fn fill_contours(width: u32, height: u32, contours: &[Contour]) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let white = Luma([255u8]);

    for contour in contours {
        let mut points = contour.points.clone();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() >= 3 {
            let polygon: Vec<Point<i32>> = points.iter().map(|&[x, y]| Point::new(x, y)).collect();
            draw_polygon_mut(&mut mask, &polygon, white);
        }
        draw_closed_polyline(&mut mask, &points, 1, white);
    }
    mask
}

/// `source ∧ ¬(strokes ∨ filled)`: keep only the pixels outside every completed outline.
pub fn mask_out(source: &GrayImage, strokes: &GrayImage, filled: &GrayImage) -> GrayImage {
    GrayImage::from_fn(source.width(), source.height(), |x, y| {
        let covered = strokes.get_pixel(x, y)[0] | filled.get_pixel(x, y)[0];
        Luma([source.get_pixel(x, y)[0] & !covered])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_outline_with_gap(gap: u32) -> GrayImage {
        let mut mask = GrayImage::new(100, 100);
        for i in 20..=80 {
            for t in 0..3 {
                mask.put_pixel(i, 20 + t, Luma([255u8]));
                mask.put_pixel(i, 78 + t, Luma([255u8]));
                mask.put_pixel(78 + t, i, Luma([255u8]));
                if i < 50 || i >= 50 + gap {
                    mask.put_pixel(20 + t, i, Luma([255u8]));
                }
            }
        }
        mask
    }

    #[test]
    fn test_closing_bridges_gap() {
        let mask = square_outline_with_gap(4);
        assert_eq!(mask.get_pixel(21, 51)[0], 0);
        let closed = close_binary(&mask, 5, 3);
        assert_eq!(closed.get_pixel(21, 51)[0], 255);
        // the interior stays open
        assert_eq!(closed.get_pixel(50, 50)[0], 0);
    }

    #[test]
    fn test_closing_preserves_solid_rectangle() {
        let mut mask = GrayImage::new(60, 60);
        for y in 10..50 {
            for x in 15..45 {
                mask.put_pixel(x, y, Luma([255u8]));
            }
        }
        assert_eq!(close_binary(&mask, 5, 3), mask);
    }

    #[test]
    fn test_unit_kernel_is_identity() {
        let mask = square_outline_with_gap(4);
        assert_eq!(close_binary(&mask, 1, 3), mask);
    }

    #[test]
    fn test_fill_contours() {
        let square = Contour::new(vec![[10, 10], [30, 10], [30, 30], [10, 30]]);
        let dot = Contour::new(vec![[50, 50]]);
        let filled = fill_contours(64, 64, &[square, dot]);
        assert_eq!(filled.get_pixel(20, 20)[0], 255);
        assert_eq!(filled.get_pixel(30, 30)[0], 255);
        assert_eq!(filled.get_pixel(50, 50)[0], 255);
        assert_eq!(filled.get_pixel(5, 5)[0], 0);
    }

    #[test]
    fn test_mask_out() {
        let source = GrayImage::from_pixel(4, 1, Luma([200u8]));
        let mut strokes = GrayImage::new(4, 1);
        strokes.put_pixel(0, 0, Luma([255u8]));
        let mut filled = GrayImage::new(4, 1);
        filled.put_pixel(1, 0, Luma([255u8]));
        let out = mask_out(&source, &strokes, &filled);
        assert_eq!(out.as_raw(), &vec![0u8, 0, 200, 200]);
    }
}
