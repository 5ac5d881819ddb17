//! Neuron layouts: topological coordinates for each SOM neuron.

use crate::error::{NeuriteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// A neuron's fixed coordinate in topology space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Point(Vec<f64>);

impl Point {
    /// Wraps `coords`.
    pub fn new(coords: Vec<f64>) -> Self {
        Self(coords)
    }

    /// The coordinates.
    pub fn coords(&self) -> &[f64] {
        &self.0
    }
}

impl Deref for Point {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self(coords)
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(coords: [f64; N]) -> Self {
        Self(coords.to_vec())
    }
}

/// How neurons are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// A line: shape `[n]`, points `(i)`.
    #[default]
    Linear,
    /// A row-major grid: shape `[rows, cols]`, points `(col, row)`.
    Rectangular,
    /// Offset hexagonal grid: shape `[rows, cols]`.
    Hexagonal,
}

impl Topology {
    /// Looks a topology up by its lowercase name.
    pub fn get(name: &str) -> Option<Topology> {
        match name {
            "linear" => Some(Topology::Linear),
            "rectangular" => Some(Topology::Rectangular),
            "hexagonal" => Some(Topology::Hexagonal),
            _ => None,
        }
    }

    /// Lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Linear => "linear",
            Topology::Rectangular => "rectangular",
            Topology::Hexagonal => "hexagonal",
        }
    }

    /// Validates `shape` and reduces it to the dimensions this topology
    /// uses.
    ///
    /// Linear keeps the first dimension. The grids keep the first two; a
    /// single dimension means a square grid. Every kept dimension must be
    /// positive.
    pub fn normalize_shape(&self, shape: &[usize]) -> Result<Vec<usize>> {
        let normalized = match (self, shape) {
            (_, []) => return Err(NeuriteError::invalid("shape is empty")),
            (Topology::Linear, [n, ..]) => vec![*n],
            (_, [n]) => vec![*n, *n],
            (_, [rows, cols, ..]) => vec![*rows, *cols],
        };
        if normalized.contains(&0) {
            return Err(NeuriteError::invalid(format!(
                "shape {shape:?} has a zero dimension"
            )));
        }
        Ok(normalized)
    }

    /// Generates the coordinates for a normalized `shape`, in neuron order.
    pub fn points(&self, shape: &[usize]) -> Vec<Point> {
        match (self, shape) {
            (_, []) => Vec::new(),
            (Topology::Linear, [n, ..]) => (0..*n).map(|i| Point(vec![i as f64])).collect(),
            (Topology::Rectangular, dims) => {
                let (rows, cols) = grid(dims);
                (0..rows)
                    .flat_map(|y| (0..cols).map(move |x| Point(vec![x as f64, y as f64])))
                    .collect()
            }
            (Topology::Hexagonal, dims) => {
                let (rows, cols) = grid(dims);
                let mut points = Vec::with_capacity(rows * cols);
                let mut offset = -SQRT_3;
                for _ in 0..rows {
                    offset += SQRT_3;
                    let mut x = -1.0;
                    for col in 0..cols {
                        x += 1.5;
                        let y = if col % 2 == 1 { offset + SQRT_3 / 2.0 } else { offset };
                        points.push(Point(vec![x, y]));
                    }
                }
                points
            }
        }
    }
}

fn grid(shape: &[usize]) -> (usize, usize) {
    match shape {
        [n] => (*n, *n),
        [rows, cols, ..] => (*rows, *cols),
        [] => (0, 0),
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_points(actual: &[Point], expected: &[[f64; 2]]) {
        assert_eq!(actual.len(), expected.len());
        for (point, coords) in actual.iter().zip(expected) {
            assert!((point[0] - coords[0]).abs() < 1e-3, "{point:?} vs {coords:?}");
            assert!((point[1] - coords[1]).abs() < 1e-3, "{point:?} vs {coords:?}");
        }
    }

    #[test]
    fn test_linear() {
        let points = Topology::Linear.points(&[3]);
        assert_eq!(points, vec![Point::from([0.0]), Point::from([1.0]), Point::from([2.0])]);
    }

    #[test]
    fn test_rectangular() {
        let points = Topology::Rectangular.points(&[2, 3]);
        assert_points(
            &points,
            &[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 1.0], [1.0, 1.0], [2.0, 1.0]],
        );
        assert_eq!(Topology::Rectangular.points(&[2]).len(), 4);
    }

    #[test]
    fn test_hexagonal() {
        assert_points(&Topology::Hexagonal.points(&[1]), &[[0.5, 0.0]]);
        assert_points(
            &Topology::Hexagonal.points(&[2, 3]),
            &[
                [0.5, 0.0],
                [2.0, 0.866],
                [3.5, 0.0],
                [0.5, 1.732],
                [2.0, 2.598],
                [3.5, 1.732],
            ],
        );
    }

    #[test]
    fn test_normalize_shape() {
        assert_eq!(Topology::Linear.normalize_shape(&[6, 2]).unwrap(), vec![6]);
        assert_eq!(Topology::Rectangular.normalize_shape(&[3]).unwrap(), vec![3, 3]);
        assert_eq!(Topology::Hexagonal.normalize_shape(&[2, 3, 4]).unwrap(), vec![2, 3]);
        assert!(Topology::Linear.normalize_shape(&[]).is_err());
        assert!(Topology::Rectangular.normalize_shape(&[2, 0]).is_err());
        assert!(Topology::Linear.normalize_shape(&[0, 5]).is_err());
    }

    #[test]
    fn test_names() {
        for topology in [Topology::Linear, Topology::Rectangular, Topology::Hexagonal] {
            assert_eq!(Topology::get(topology.name()), Some(topology));
        }
        assert_eq!(Topology::get("toroidal"), None);
        assert_eq!(serde_json::to_string(&Topology::Hexagonal).unwrap(), "\"hexagonal\"");
    }
}
