use burn::prelude::{Backend, Tensor};
use std::fmt::Debug;

pub fn assert_close_to_vec<T>(
    actual: &[T],
    expected: &[T],
    tolerance: T,
) where
    T: num_traits::float::Float + Copy + Debug,
{
    let pass = actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected.iter())
            .all(|(&a, &e)| (a - e).abs() <= tolerance);
    if !pass {
        panic!(
            "Expected (+/- {:?}):\n{:?}\nActual:\n{:?}",
            tolerance, expected, actual
        );
    }
}

/// Assert a float tensor matches an expected flat value list, within tolerance.
pub fn assert_tensor_close<B: Backend, const D: usize>(
    actual: Tensor<B, D>,
    expected: &[f64],
    tolerance: f64,
) {
    let actual = actual
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .unwrap();
    assert_close_to_vec(&actual, expected, tolerance);
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_assert_close_to_vec() {
        assert_close_to_vec(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 0.01);
        assert_close_to_vec(&[1.0, 2.0, 3.1], &[1.0, 2.0, 3.0], 0.2);
    }

    #[test]
    #[should_panic]
    fn test_assert_close_to_vec_bad_values() {
        assert_close_to_vec(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.5], 0.01);
    }

    #[test]
    #[should_panic]
    fn test_assert_close_to_vec_different_lengths() {
        assert_close_to_vec(&[1.0, 2.0], &[1.0, 2.0, 3.0], 0.01);
    }

    #[test]
    fn test_assert_tensor_close() {
        let device = Default::default();
        let x: Tensor<NdArray, 2> = Tensor::from_data([[0.5, 1.5]], &device);
        assert_tensor_close(x, &[0.5, 1.5], 1e-6);
    }
}
