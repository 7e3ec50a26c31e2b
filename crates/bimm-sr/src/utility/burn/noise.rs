//! # Tensor Noise Generation Utilities.
use burn::prelude::{Backend, Shape, Tensor};
use burn::tensor::{Distribution, ElementConversion};
use serde::{Deserialize, Serialize};

/// Truncated normal noise configuration.
///
/// Values further than `bound` standard deviations from the mean are redrawn;
/// after `max_redraws` rounds any survivors are clamped to the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruncatedNormal {
    /// The distribution mean.
    pub mean: f64,

    /// The distribution standard deviation.
    pub std: f64,

    /// Truncation bound, in standard deviations.
    pub bound: f64,

    /// Maximum redraw rounds.
    pub max_redraws: usize,
}

impl Default for TruncatedNormal {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std: 1.0,
            bound: 2.0,
            max_redraws: 8,
        }
    }
}

impl TruncatedNormal {
    /// Create a truncated normal with the given mean and std, truncated at two std.
    pub fn new(
        mean: f64,
        std: f64,
    ) -> Self {
        Self {
            mean,
            std,
            ..Default::default()
        }
    }

    /// Generate noise.
    ///
    /// # Arguments
    ///
    /// - `shape` - the shape of the noise tensor to generate.
    /// - `device` - the device to build the tensor on.
    pub fn noise<B: Backend, S, const D: usize>(
        &self,
        shape: S,
        device: &B::Device,
    ) -> Tensor<B, D>
    where
        S: Into<Shape>,
    {
        let shape = shape.into();
        let distribution = Distribution::Normal(self.mean, self.std);
        let radius = self.bound * self.std;
        let (low, high) = (self.mean - radius, self.mean + radius);

        let mut noise: Tensor<B, D> = Tensor::random(shape.clone(), distribution, device);
        for _ in 0..self.max_redraws {
            let outside = noise
                .clone()
                .sub_scalar(self.mean)
                .abs()
                .greater_elem(radius);
            if outside.clone().int().sum().into_scalar().elem::<i64>() == 0 {
                break;
            }
            let redraw = Tensor::random(shape.clone(), distribution, device);
            noise = noise.mask_where(outside, redraw);
        }
        noise.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_truncated_normal_bounds() {
        type B = NdArray;
        let device = Default::default();

        let cfg = TruncatedNormal::new(0.0, 0.02);
        assert_eq!(cfg.bound, 2.0);

        let noise: Tensor<B, 2> = cfg.noise([64, 64], &device);
        assert_eq!(noise.dims(), [64, 64]);

        let max = noise.clone().abs().max().into_scalar() as f64;
        assert!(max <= 0.04 + 1e-6, "max |x| = {max}");

        // Not degenerate.
        let std = noise.var(0).mean().sqrt().into_scalar() as f64;
        assert!(std > 0.01 && std < 0.03, "std = {std}");
    }

    #[test]
    fn test_truncated_normal_mean_shift() {
        type B = NdArray;
        let device = Default::default();

        let cfg = TruncatedNormal {
            mean: 5.0,
            std: 1.0,
            bound: 1.0,
            max_redraws: 0,
        };
        let noise: Tensor<B, 1> = cfg.noise([500], &device);

        let min = noise.clone().min().into_scalar() as f64;
        let max = noise.max().into_scalar() as f64;
        assert!(min >= 4.0 - 1e-6);
        assert!(max <= 6.0 + 1e-6);
    }
}
