use crate::config::MetricType;

use super::Tensor;
use super::error::Error;

/// Scores `predicted` against `expected` with `metric`.
///
/// Both tensors must have the same shape and hold at least one value.
///
/// ```
/// use mol_readout::MetricType;
/// use mol_readout::nn::evaluate;
/// use ndarray::array;
///
/// let predicted = array![[1.0], [2.0], [4.0]];
/// let expected = array![[1.0], [3.0], [2.0]];
///
/// assert_eq!(evaluate(MetricType::Mae, &predicted, &expected)?, 1.0);
/// assert_eq!(evaluate(MetricType::Mse, &predicted, &expected)?, 5.0 / 3.0);
/// # Ok::<(), mol_readout::ReadoutError>(())
/// ```
pub fn evaluate(metric: MetricType, predicted: &Tensor, expected: &Tensor) -> Result<f64, Error> {
    if predicted.ncols() != expected.ncols() {
        return Err(Error::feature_mismatch("metric", expected.ncols(), predicted.ncols()));
    }
    if predicted.nrows() != expected.nrows() {
        return Err(Error::row_mismatch("metric", expected.nrows(), predicted.nrows()));
    }
    if predicted.is_empty() {
        return Err(Error::EmptyInput);
    }

    let diff = predicted - expected;
    let n = diff.len() as f64;

    let score = match metric {
        MetricType::Mae => diff.mapv(f64::abs).sum() / n,
        MetricType::Mse => diff.mapv(|d| d * d).sum() / n,
        MetricType::Rmse => (diff.mapv(|d| d * d).sum() / n).sqrt(),
    };
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    #[test]
    fn perfect_prediction_scores_zero() {
        let x = array![[0.5, -1.0], [2.0, 3.0]];
        for metric in [MetricType::Rmse, MetricType::Mse, MetricType::Mae] {
            assert_eq!(evaluate(metric, &x, &x).unwrap(), 0.0);
        }
    }

    #[test]
    fn rmse_is_root_of_mse() {
        let predicted = array![[1.0, 2.0], [3.0, 4.0]];
        let expected = array![[2.0, 2.0], [1.0, 4.0]];

        let mse = evaluate(MetricType::Mse, &predicted, &expected).unwrap();
        let rmse = evaluate(MetricType::Rmse, &predicted, &expected).unwrap();

        assert_abs_diff_eq!(mse, 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(rmse, 1.25f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn rejects_shape_mismatch() {
        let a = Array2::zeros((3, 1));
        assert!(matches!(
            evaluate(MetricType::Mae, &a, &Array2::zeros((3, 2))),
            Err(Error::FeatureMismatch { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            evaluate(MetricType::Mae, &a, &Array2::zeros((4, 1))),
            Err(Error::RowMismatch { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn rejects_empty_input() {
        let empty = Array2::zeros((0, 1));
        assert!(matches!(
            evaluate(MetricType::Rmse, &empty, &empty),
            Err(Error::EmptyInput)
        ));
    }
}
