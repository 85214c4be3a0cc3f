//! Turning raw counts into probability distributions.
//!
//! An all-zero input means "nothing observed" and stays all-zero. Output
//! never contains NaN or infinity.

use crate::matrix::Matrix;

/// Scale `counts` so it sums to 1, or return it unchanged when it sums to 0.
pub fn normalize_vector(counts: &[f64]) -> Vec<f64> {
    let mut out = counts.to_vec();
    normalize_vector_in_place(&mut out);
    out
}

pub fn normalize_vector_in_place(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total == 0.0 || !total.is_finite() {
        for v in values.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
        return;
    }
    for v in values.iter_mut() {
        *v /= total;
        if !v.is_finite() {
            *v = 0.0;
        }
    }
}

/// Normalize every row independently. A zero row stays zero without
/// affecting its neighbours.
pub fn normalize_matrix(counts: &Matrix) -> Matrix {
    let mut out = counts.clone();
    for row in out.rows_mut() {
        normalize_vector_in_place(row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn vector_sums_to_one() {
        let v = normalize_vector(&[2.0, 1.0, 1.0]);
        assert_eq!(v, vec![0.5, 0.25, 0.25]);
        assert!((v.iter().sum::<f64>() - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_vector_stays_zero() {
        let v = normalize_vector(&[0.0, 0.0, 0.0]);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
        assert!(v.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn empty_vector() {
        assert!(normalize_vector(&[]).is_empty());
    }

    #[test]
    fn non_finite_input_is_coerced() {
        let v = normalize_vector(&[f64::NAN, 1.0]);
        assert!(v.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn zero_row_does_not_suppress_others() {
        let counts = Matrix::from_rows(vec![
            vec![0.0, 3.0, 1.0],
            vec![0.0, 0.0, 0.0],
            vec![5.0, 0.0, 0.0],
        ])
        .unwrap();
        let p = normalize_matrix(&counts);

        assert_eq!(p.row(0).unwrap(), &[0.0, 0.75, 0.25]);
        assert_eq!(p.row(1).unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(p.row(2).unwrap(), &[1.0, 0.0, 0.0]);
        assert_eq!(p.row_sum(1), Some(0.0));
    }

    #[test]
    fn rows_sum_to_one_within_tolerance() {
        let counts = Matrix::from_rows(vec![vec![1.0, 1.0, 1.0]; 3]).unwrap();
        let p = normalize_matrix(&counts);
        for i in 0..3 {
            assert!((p.row_sum(i).unwrap() - 1.0).abs() < EPS);
        }
    }
}
