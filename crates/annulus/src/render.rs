use crate::face::DrawOp;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[cfg(feature = "png")]
    #[error("PNG error: {0}")]
    Png(#[from] cairo::IoError),
}

/// Hands finished frames to the output. Without the `png` feature, or
/// without an output path, frames are only summarised in the log.
#[derive(Debug, Clone)]
pub struct Renderer {
    size: u32,
    output: Option<PathBuf>,
}

impl Renderer {
    pub fn new(size: u32, output: Option<PathBuf>) -> Self {
        Self { size, output }
    }

    pub fn render(&self, ops: &[DrawOp]) -> Result<(), RenderError> {
        match &self.output {
            #[cfg(feature = "png")]
            Some(path) => canvas::write_png(ops, self.size, path),
            _ => {
                log::debug!("Frame of {} ops at {}px", ops.len(), self.size);
                Ok(())
            }
        }
    }
}

#[cfg(feature = "png")]
mod canvas {
    use super::RenderError;
    use crate::face::{Color, DrawOp, Point};
    use cairo::{Context, Format, ImageSurface, LineCap};
    use std::f64::consts::PI;
    use std::path::Path;

    /// Face angles are clockwise from twelve; cairo's are clockwise from three.
    fn radians(degrees: f64) -> f64 {
        (degrees - 90.0).to_radians()
    }

    fn set_color(cr: &Context, color: Color) {
        let (r, g, b, a) = color.into_components();
        cr.set_source_rgba(r, g, b, a);
    }

    fn trace(cr: &Context, points: &[Point]) {
        let mut points = points.iter();
        if let Some(first) = points.next() {
            cr.move_to(first.x, first.y);
        }
        for p in points {
            cr.line_to(p.x, p.y);
        }
    }

    fn draw_op(cr: &Context, op: &DrawOp) -> Result<(), cairo::Error> {
        match op {
            DrawOp::Fill { color } => {
                set_color(cr, *color);
                cr.paint()
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
            } => {
                set_color(cr, *color);
                cr.set_line_width(*width);
                cr.move_to(from.x, from.y);
                cr.line_to(to.x, to.y);
                cr.stroke()
            }
            DrawOp::Arc {
                radius,
                start_angle,
                sweep_angle,
                width,
                color,
            } => {
                set_color(cr, *color);
                cr.set_line_width(*width);
                cr.new_sub_path();
                cr.arc(
                    0.0,
                    0.0,
                    *radius,
                    radians(*start_angle),
                    radians(start_angle + sweep_angle),
                );
                cr.stroke()
            }
            DrawOp::Polyline {
                points,
                width,
                color,
            } => {
                set_color(cr, *color);
                cr.set_line_width(*width);
                trace(cr, points);
                cr.stroke()
            }
            DrawOp::Polygon { points, color } => {
                set_color(cr, *color);
                trace(cr, points);
                cr.close_path();
                cr.fill()
            }
            DrawOp::Circle {
                center,
                radius,
                color,
            } => {
                set_color(cr, *color);
                cr.new_sub_path();
                cr.arc(center.x, center.y, *radius, 0.0, 2.0 * PI);
                cr.fill()
            }
            DrawOp::Text {
                text,
                anchor,
                size,
                color,
            } => {
                set_color(cr, *color);
                cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
                cr.set_font_size(*size);
                if let Ok(ext) = cr.text_extents(text) {
                    cr.move_to(anchor.x - ext.width() / 2.0, anchor.y + ext.height() / 2.0);
                    cr.show_text(text)?;
                }
                Ok(())
            }
        }
    }

    pub fn write_png(ops: &[DrawOp], size: u32, path: &Path) -> Result<(), RenderError> {
        let side = size.max(1) as i32;
        let surface = ImageSurface::create(Format::ARgb32, side, side)?;
        {
            let cr = Context::new(&surface)?;
            let half = side as f64 / 2.0;
            cr.translate(half, half);
            cr.scale(half, half);
            cr.set_line_cap(LineCap::Round);
            for op in ops {
                draw_op(&cr, op)?;
            }
        }

        let mut file = fs_err::File::create(path)?;
        surface.write_to_png(&mut file)?;
        Ok(())
    }
}
