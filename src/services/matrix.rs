//! Distance matrix between stops

use crate::services::geo::haversine_distance;
use crate::types::{Coordinates, Stop};

/// A dense n×n distance matrix in kilometers, stored row-major.
///
/// Indices follow the order of the stops the matrix was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Matrix of the given size, all zeros
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Build from explicit rows. Returns `None` unless the rows form a square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            data: rows.into_iter().flatten().collect(),
            size,
        })
    }

    /// Haversine matrix for a list of points; the diagonal is zero
    pub fn from_points(points: &[Coordinates]) -> Self {
        let n = points.len();
        let mut matrix = Self::new(n);

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    matrix.set(i, j, haversine_distance(&points[i], &points[j]));
                }
            }
        }

        matrix
    }

    pub fn from_stops(stops: &[Stop]) -> Self {
        let points: Vec<Coordinates> = stops.iter().map(Stop::coordinates).collect();
        Self::from_points(&points)
    }

    /// Distance from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Sum of consecutive legs along `order`
    pub fn path_length(&self, order: &[usize]) -> f64 {
        order.windows(2).map(|leg| self.get(leg[0], leg[1])).sum()
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Coordinates> {
        vec![
            Coordinates { lat: 50.0, lng: 14.0 },
            Coordinates { lat: 50.1, lng: 14.1 },
            Coordinates { lat: 50.2, lng: 14.2 },
        ]
    }

    #[test]
    fn test_distance_matrix() {
        let matrix = DistanceMatrix::from_points(&points());

        assert_eq!(matrix.size(), 3);

        for i in 0..3 {
            assert_eq!(matrix.get(i, i), 0.0);
        }
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!(matrix.get(i, j) > 0.0);
                }
            }
        }
        assert!(matrix.is_symmetric(1e-9));
    }

    #[test]
    fn test_trivial_sizes() {
        let empty = DistanceMatrix::from_points(&[]);
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.path_length(&[]), 0.0);

        let single = DistanceMatrix::from_points(&points()[..1]);
        assert_eq!(single.size(), 1);
        assert_eq!(single.get(0, 0), 0.0);
    }

    #[test]
    fn test_from_rows_requires_square() {
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).is_none());

        let m = DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![3.0, 0.0]]).unwrap();
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(1, 0), 3.0);
        assert!(!m.is_symmetric(0.5));
    }

    #[test]
    fn test_path_length() {
        let m = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 5.0],
            vec![1.0, 0.0, 2.0],
            vec![5.0, 2.0, 0.0],
        ])
        .unwrap();

        assert_eq!(m.path_length(&[0, 1, 2]), 3.0);
        assert_eq!(m.path_length(&[0, 2, 1]), 7.0);
        assert_eq!(m.path_length(&[0]), 0.0);
        assert_eq!(m.path_length(&[]), 0.0);
    }

    #[test]
    fn test_from_stops_uses_input_order() {
        let stops = vec![
            Stop::new("a", 50.0, 14.0),
            Stop::new("b", 50.0, 14.0),
            Stop::new("c", 51.0, 14.0),
        ];
        let m = DistanceMatrix::from_stops(&stops);

        assert_eq!(m.get(0, 1), 0.0);
        assert!((m.get(0, 2) - 111.19).abs() < 0.1);
    }
}
