/// Dense square matrix of `f64`, stored row-major.
///
/// Used for both raw transition counts and the normalized transition
/// probabilities. Row `i` belongs to the state at catalogue index `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    size: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// An all-zero `size` x `size` matrix.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Build from explicit rows. Returns `None` unless the rows form a square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.size && col < self.size {
            Some(self.data[row * self.size + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row < self.size {
            Some(&self.data[row * self.size..(row + 1) * self.size])
        } else {
            None
        }
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut [f64]> {
        if row < self.size {
            Some(&mut self.data[row * self.size..(row + 1) * self.size])
        } else {
            None
        }
    }

    /// Add `amount` to one cell. Out-of-range coordinates are ignored and
    /// reported as `false`.
    pub fn add(&mut self, row: usize, col: usize, amount: f64) -> bool {
        if row < self.size && col < self.size {
            self.data[row * self.size + col] += amount;
            true
        } else {
            false
        }
    }

    pub fn row_sum(&self, row: usize) -> Option<f64> {
        self.row(row).map(|r| r.iter().sum())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics, and a 0x0 matrix has no rows anyway
        self.data.chunks_exact(self.size.max(1))
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.data.chunks_exact_mut(self.size.max(1))
    }
}
