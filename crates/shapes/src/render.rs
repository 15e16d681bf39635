//! Annotation helpers drawn onto working copies of the input raster.

use std::{fmt, path::Path};

use ab_glyph::{FontArc, PxScale};
use image::{ImageBuffer, Pixel};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut, BresenhamLineIter,
};

use crate::error::{Result, ShapeError};

/// DejaVu Sans Mono, bundled so labels render without any configuration.
/// Licensed under the Bitstream Vera terms in `assets/DejaVu-LICENSE.txt`.
const EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");
const EMBEDDED_FONT_NAME: &str = "DejaVuSansMono.ttf";

/// TrueType font used for shape and symmetry labels.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
}

impl LabelFont {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ShapeError::FontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| ShapeError::FontLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { font })
    }

    /// The bundled default font.
    pub fn embedded() -> Result<Self> {
        let font = FontArc::try_from_slice(EMBEDDED_FONT).map_err(|e| ShapeError::FontLoad {
            path: EMBEDDED_FONT_NAME.into(),
            reason: e.to_string(),
        })?;
        Ok(Self { font })
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont").finish_non_exhaustive()
    }
}

type Canvas<P> = ImageBuffer<P, Vec<u8>>;

/// Straight segment `thickness` pixels wide.
pub fn draw_thick_line<P>(canvas: &mut Canvas<P>, start: [i32; 2], end: [i32; 2], thickness: u32, color: P)
where
    P: Pixel<Subpixel = u8> + 'static,
{
    if start == end && thickness <= 1 {
        let [x, y] = start;
        if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
            canvas.put_pixel(x as u32, y as u32, color);
        }
        return;
    }
    let from = (start[0] as f32, start[1] as f32);
    let to = (end[0] as f32, end[1] as f32);
    if thickness <= 1 {
        draw_line_segment_mut(canvas, from, to, color);
        return;
    }
    let radius = (thickness / 2) as i32;
    for (x, y) in BresenhamLineIter::new(from, to) {
        draw_filled_circle_mut(canvas, (x, y), radius, color);
    }
}

/// Outline of a closed polygon; the last point connects back to the first.
pub fn draw_closed_polyline<P>(canvas: &mut Canvas<P>, points: &[[i32; 2]], thickness: u32, color: P)
where
    P: Pixel<Subpixel = u8> + 'static,
{
    match points {
        [] => {}
        [single] => draw_thick_line(canvas, *single, *single, thickness, color),
        _ => {
            for (k, &start) in points.iter().enumerate() {
                let end = points[(k + 1) % points.len()];
                draw_thick_line(canvas, start, end, thickness, color);
            }
        }
    }
}

pub fn draw_marker<P>(canvas: &mut Canvas<P>, center: [i32; 2], radius: i32, color: P)
where
    P: Pixel<Subpixel = u8> + 'static,
{
    draw_filled_circle_mut(canvas, (center[0], center[1]), radius, color);
}

/// Draw `text` with its bottom-left corner at `anchor`.
///
/// Without a font nothing is drawn.
pub fn draw_label<P>(
    canvas: &mut Canvas<P>,
    font: Option<&LabelFont>,
    text: &str,
    anchor: [i32; 2],
    scale: f32,
    color: P,
) where
    P: Pixel<Subpixel = u8> + 'static,
{
    let Some(font) = font else {
        return;
    };
    let top = anchor[1] - scale.ceil() as i32;
    draw_text_mut(canvas, color, anchor[0], top, PxScale::from(scale), &font.font, text);
}
