use palette::Srgba;

pub type Color = Srgba<f64>;

/// Normalised face coordinates: centre at the origin, radius 1, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `angle` is in degrees clockwise from twelve o'clock.
    pub fn polar(angle: f64, radius: f64) -> Self {
        let rad = angle.to_radians();
        Self::new(rad.sin() * radius, -rad.cos() * radius)
    }

    /// Rotates clockwise about the origin.
    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
        color: Color,
    },
    /// Stroked arc centred on the face; angles as in [`Point::polar`].
    Arc {
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
        width: f64,
        color: Color,
    },
    Polyline {
        points: Vec<Point>,
        width: f64,
        color: Color,
    },
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Color,
    },
    /// Text centred horizontally on `anchor`.
    Text {
        text: String,
        anchor: Point,
        size: f64,
        color: Color,
    },
}
