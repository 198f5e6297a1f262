//! Perspective-correct sampling of the module grid.

use crate::models::{BitGrid, Point, SymbolLocation};

/// Projective transform as a 3x3 matrix applied to column vectors
///
/// `(u, v, w) = M * (x, y, 1)`, image point = `(u / w, v / w)`.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
    a33: f64,
}

impl PerspectiveTransform {
    /// Map the unit square (0,0),(1,0),(1,1),(0,1) onto `p1..p4`
    ///
    /// When the quadrilateral is a parallelogram the projective correction
    /// terms vanish and the pure affine form is used, avoiding a zero
    /// denominator.
    fn square_to_quadrilateral(p1: Point, p2: Point, p3: Point, p4: Point) -> Self {
        let dx3 = p1.x - p2.x + p3.x - p4.x;
        let dy3 = p1.y - p2.y + p3.y - p4.y;
        if dx3 == 0.0 && dy3 == 0.0 {
            return Self {
                a11: p2.x - p1.x,
                a12: p3.x - p2.x,
                a13: p1.x,
                a21: p2.y - p1.y,
                a22: p3.y - p2.y,
                a23: p1.y,
                a31: 0.0,
                a32: 0.0,
                a33: 1.0,
            };
        }
        let dx1 = p2.x - p3.x;
        let dx2 = p4.x - p3.x;
        let dy1 = p2.y - p3.y;
        let dy2 = p4.y - p3.y;
        let denominator = dx1 * dy2 - dx2 * dy1;
        let a31 = (dx3 * dy2 - dx2 * dy3) / denominator;
        let a32 = (dx1 * dy3 - dx3 * dy1) / denominator;
        Self {
            a11: p2.x - p1.x + a31 * p2.x,
            a12: p4.x - p1.x + a32 * p4.x,
            a13: p1.x,
            a21: p2.y - p1.y + a31 * p2.y,
            a22: p4.y - p1.y + a32 * p4.y,
            a23: p1.y,
            a31,
            a32,
            a33: 1.0,
        }
    }

    /// Algebraic inverse up to scale; scale cancels in the homogeneous divide
    fn adjugate(&self) -> Self {
        Self {
            a11: self.a22 * self.a33 - self.a23 * self.a32,
            a12: self.a13 * self.a32 - self.a12 * self.a33,
            a13: self.a12 * self.a23 - self.a13 * self.a22,
            a21: self.a23 * self.a31 - self.a21 * self.a33,
            a22: self.a11 * self.a33 - self.a13 * self.a31,
            a23: self.a13 * self.a21 - self.a11 * self.a23,
            a31: self.a21 * self.a32 - self.a22 * self.a31,
            a32: self.a12 * self.a31 - self.a11 * self.a32,
            a33: self.a11 * self.a22 - self.a12 * self.a21,
        }
    }

    fn times(&self, other: &Self) -> Self {
        Self {
            a11: self.a11 * other.a11 + self.a12 * other.a21 + self.a13 * other.a31,
            a12: self.a11 * other.a12 + self.a12 * other.a22 + self.a13 * other.a32,
            a13: self.a11 * other.a13 + self.a12 * other.a23 + self.a13 * other.a33,
            a21: self.a21 * other.a11 + self.a22 * other.a21 + self.a23 * other.a31,
            a22: self.a21 * other.a12 + self.a22 * other.a22 + self.a23 * other.a32,
            a23: self.a21 * other.a13 + self.a22 * other.a23 + self.a23 * other.a33,
            a31: self.a31 * other.a11 + self.a32 * other.a21 + self.a33 * other.a31,
            a32: self.a31 * other.a12 + self.a32 * other.a22 + self.a33 * other.a32,
            a33: self.a31 * other.a13 + self.a32 * other.a23 + self.a33 * other.a33,
        }
    }

    /// Transform mapping quadrilateral `from` onto quadrilateral `to`
    ///
    /// Composed as square-to-`to` after the adjugate of square-to-`from`,
    /// both corner lists ordered top-left, top-right, bottom-right,
    /// bottom-left.
    pub fn quadrilateral_to_quadrilateral(from: &[Point; 4], to: &[Point; 4]) -> Self {
        let from_square = Self::square_to_quadrilateral(from[0], from[1], from[2], from[3]);
        let to_quad = Self::square_to_quadrilateral(to[0], to[1], to[2], to[3]);
        to_quad.times(&from_square.adjugate())
    }

    /// Apply the transform and divide out the homogeneous weight
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let w = self.a31 * x + self.a32 * y + self.a33;
        (
            (self.a11 * x + self.a12 * y + self.a13) / w,
            (self.a21 * x + self.a22 * y + self.a23) / w,
        )
    }
}

/// Sample the binarized image into a square module matrix
///
/// Module-space anchors sit 3.5 modules inside each finder pattern and 6.5
/// modules inside the bottom-right corner, matching standard QR geometry.
/// Each module is sampled at its center; samples falling outside the image
/// read as unset.
pub fn extract_modules(grid: &BitGrid, location: &SymbolLocation) -> BitGrid {
    let dimension = location.dimension;
    let d = dimension as f64;
    let module_corners = [
        Point::new(3.5, 3.5),
        Point::new(d - 3.5, 3.5),
        Point::new(d - 6.5, d - 6.5),
        Point::new(3.5, d - 3.5),
    ];
    let image_corners = [
        location.top_left,
        location.top_right,
        location.alignment,
        location.bottom_left,
    ];
    let transform =
        PerspectiveTransform::quadrilateral_to_quadrilateral(&module_corners, &image_corners);

    let mut modules = BitGrid::new(dimension, dimension);
    for y in 0..dimension {
        for x in 0..dimension {
            let (ix, iy) = transform.apply(x as f64 + 0.5, y as f64 + 0.5);
            if !ix.is_finite() || !iy.is_finite() || ix < 0.0 || iy < 0.0 {
                continue;
            }
            if grid.get(ix.floor() as usize, iy.floor() as usize) {
                modules.set(x, y, true);
            }
        }
    }
    modules
}
