//! Dense face-mesh landmarks for a single frame.
//!
//! Coordinates are normalised to the frame (x and y roughly in [0, 1]) but a
//! misbehaving detector can emit NaN, infinities or huge sentinel values, so
//! nothing here assumes the points are well formed.

use serde::{Deserialize, Serialize};

/// One landmark in normalised image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Ordered, index-addressed landmark points produced once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Point3>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The x coordinate at `index`, if present and finite.
    pub fn finite_x(&self, index: usize) -> Option<f64> {
        self.points
            .get(index)
            .map(|p| p.x)
            .filter(|x| x.is_finite())
    }

    /// All x coordinates in index order, including non-finite ones.
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.x)
    }
}

impl From<Vec<[f64; 3]>> for LandmarkSet {
    fn from(raw: Vec<[f64; 3]>) -> Self {
        Self::new(raw.into_iter().map(Point3::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(xs: &[f64]) -> LandmarkSet {
        LandmarkSet::new(xs.iter().map(|&x| Point3::new(x, 0.5, 0.0)).collect())
    }

    #[test]
    fn test_finite_x_present() {
        let lm = set(&[0.1, 0.2, 0.3]);
        assert_eq!(lm.finite_x(1), Some(0.2));
    }

    #[test]
    fn test_finite_x_out_of_range_index() {
        let lm = set(&[0.1, 0.2]);
        assert_eq!(lm.finite_x(263), None);
    }

    #[test]
    fn test_finite_x_rejects_nan_and_infinity() {
        let lm = set(&[f64::NAN, f64::INFINITY, f64::NEG_INFINITY]);
        assert_eq!(lm.finite_x(0), None);
        assert_eq!(lm.finite_x(1), None);
        assert_eq!(lm.finite_x(2), None);
    }

    #[test]
    fn test_from_raw_triples() {
        let lm = LandmarkSet::from(vec![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]);
        assert_eq!(lm.len(), 2);
        assert_eq!(lm.points()[1], Point3::new(0.4, 0.5, 0.6));
    }

    #[test]
    fn test_xs_keeps_order_and_garbage() {
        let lm = set(&[0.3, 7.99e34, 0.1]);
        let xs: Vec<f64> = lm.xs().collect();
        assert_eq!(xs, vec![0.3, 7.99e34, 0.1]);
    }

    #[test]
    fn test_empty() {
        assert!(LandmarkSet::new(Vec::new()).is_empty());
    }
}
