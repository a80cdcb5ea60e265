//! Dense weight matrix.

/// A dense n×n weight matrix stored in row-major order.
///
/// `get(i, j)` is the cost of travelling from visit `i` to visit `j`.
/// Weights may be asymmetric; the diagonal is never read by the solvers.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
///
/// let wm = WeightMatrix::from_rows(&[
///     vec![0.0, 3.0],
///     vec![4.0, 0.0],
/// ]).unwrap();
/// assert_eq!(wm.get(0, 1), 3.0);
/// assert_eq!(wm.get(1, 0), 4.0);
/// assert_eq!(wm.size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    data: Vec<f64>,
    size: usize,
}

impl WeightMatrix {
    /// Creates a weight matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a matrix where every off-diagonal weight is `weight`.
    pub fn uniform(size: usize, weight: f64) -> Self {
        let mut wm = Self::new(size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    wm.set(i, j, weight);
                }
            }
        }
        wm
    }

    /// Computes a Euclidean weight matrix from planar coordinates.
    pub fn from_coordinates(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut wm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                let d = (dx * dx + dy * dy).sqrt();
                wm.set(i, j, d);
                wm.set(j, i, d);
            }
        }
        wm
    }

    /// Creates a weight matrix from rows.
    ///
    /// Returns `None` if the rows do not form a square matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            data: rows.iter().flatten().copied().collect(),
            size,
        })
    }

    /// Returns the weight from visit `from` to visit `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the weight from visit `from` to visit `to`.
    pub fn set(&mut self, from: usize, to: usize, weight: f64) {
        self.data[from * self.size + to] = weight;
    }

    /// Number of visits in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total weight of a path visiting `visits` in order.
    pub fn path_weight(&self, visits: &[usize]) -> f64 {
        visits.windows(2).map(|w| self.get(w[0], w[1])).sum()
    }
}
