//! # Pixel Shuffle (Sub-Pixel Convolution) Upsampling
//!
//! Based upon [Shi et al., 2016](https://arxiv.org/abs/1609.05158).
//!
//! Channels are grouped into `n_split` blocks of ``r * r``; each block is
//! rearranged into one channel at `r` times the spatial resolution.
//! Within a block, the channel index is column-offset-major:
//!
//! ```text
//! out[n, g, i*r + dy, j*r + dx] = in[n, g*r*r + dx*r + dy, i, j]
//! ```

use burn::config::Config;
use burn::module::Module;
use burn::prelude::{Backend, Tensor};

/// Apply pixel shuffle upsampling.
///
/// ## Arguments
///
/// * `x` - Input of shape ``(B, n_split * r * r, H, W)``.
/// * `r` - The upscale factor.
/// * `n_split` - The number of output channels.
///
/// ## Returns
///
/// Output of shape ``(B, n_split, H * r, W * r)``.
///
/// ## Panics
///
/// If the channel count is not ``n_split * r * r``.
#[must_use]
pub fn pixel_shuffle<B: Backend>(
    x: Tensor<B, 4>,
    r: usize,
    n_split: usize,
) -> Tensor<B, 4> {
    let [batch, channels, h, w] = x.dims();
    assert!(r > 0 && n_split > 0, "r and n_split must be > 0");
    assert_eq!(
        channels,
        n_split * r * r,
        "Pixel shuffle expects n_split * r * r = {} channels, found {channels}",
        n_split * r * r
    );

    // (b, g, dx, dy, h, w) -> (b, g, h, dy, w, dx)
    let x: Tensor<B, 6> = x.reshape([batch, n_split, r, r, h, w]);
    let x = x.permute([0, 1, 4, 3, 5, 2]);
    x.reshape([batch, n_split, h * r, w * r])
}

/// Inverse of [`pixel_shuffle`].
///
/// ## Arguments
///
/// * `x` - Input of shape ``(B, n_split, H * r, W * r)``.
/// * `r` - The downscale factor.
///
/// ## Returns
///
/// Output of shape ``(B, n_split * r * r, H, W)``.
#[must_use]
pub fn pixel_unshuffle<B: Backend>(
    x: Tensor<B, 4>,
    r: usize,
) -> Tensor<B, 4> {
    let [batch, n_split, hr, wr] = x.dims();
    assert!(r > 0, "r must be > 0");
    assert!(
        hr % r == 0 && wr % r == 0,
        "Spatial shape {:?} must be divisible by {r}",
        [hr, wr]
    );
    let (h, w) = (hr / r, wr / r);

    // (b, g, h, dy, w, dx) -> (b, g, dx, dy, h, w)
    let x: Tensor<B, 6> = x.reshape([batch, n_split, h, r, w, r]);
    let x = x.permute([0, 1, 5, 3, 2, 4]);
    x.reshape([batch, n_split * r * r, h, w])
}

/// Configuration for [`PixelShuffle`].
#[derive(Config, Debug)]
pub struct PixelShuffleConfig {
    /// The upscale factor.
    pub upscale: usize,

    /// The number of output channels.
    #[config(default = 1)]
    pub n_split: usize,
}

impl PixelShuffleConfig {
    /// Input channels required by the layer.
    pub fn d_input(&self) -> usize {
        self.n_split * self.upscale * self.upscale
    }

    /// Initialize a [`PixelShuffle`] layer.
    #[must_use]
    pub fn init(&self) -> PixelShuffle {
        assert!(
            self.upscale > 0 && self.n_split > 0,
            "upscale and n_split must be > 0: {self:?}"
        );
        PixelShuffle {
            upscale: self.upscale,
            n_split: self.n_split,
        }
    }
}

/// Stateless pixel shuffle layer.
#[derive(Module, Clone, Debug)]
pub struct PixelShuffle {
    /// The upscale factor.
    pub upscale: usize,

    /// The number of output channels.
    pub n_split: usize,
}

impl PixelShuffle {
    /// Apply the layer; see [`pixel_shuffle`].
    #[must_use]
    pub fn forward<B: Backend>(
        &self,
        x: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        pixel_shuffle(x, self.upscale, self.n_split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_tensor_close;
    use burn::backend::NdArray;
    use burn::prelude::TensorData;

    type B = NdArray;

    fn iota(shape: [usize; 4]) -> Tensor<B, 4> {
        let n = shape.iter().product::<usize>();
        Tensor::from_data(
            TensorData::new((0..n).map(|v| v as f32).collect::<Vec<_>>(), shape),
            &Default::default(),
        )
    }

    #[test]
    fn test_pixel_shuffle_single_pixel() {
        // Channels (dx, dy): c0=(0,0), c1=(0,1), c2=(1,0), c3=(1,1).
        let x = iota([1, 4, 1, 1]);
        let y = pixel_shuffle(x, 2, 1);
        assert_eq!(y.dims(), [1, 1, 2, 2]);
        assert_tensor_close(y, &[0.0, 2.0, 1.0, 3.0], 0.0);
    }

    #[test]
    fn test_pixel_shuffle_layout() {
        let r = 2;
        let n_split = 2;
        let (h, w) = (2, 3);
        let x = iota([2, n_split * r * r, h, w]);
        let expected = x.clone().into_data().to_vec::<f32>().unwrap();

        let y = pixel_shuffle(x, r, n_split);
        assert_eq!(y.dims(), [2, n_split, h * r, w * r]);
        let actual = y.into_data().to_vec::<f32>().unwrap();

        let idx4 = |d: [usize; 4], i: [usize; 4]| ((i[0] * d[1] + i[1]) * d[2] + i[2]) * d[3] + i[3];
        let in_dims = [2, n_split * r * r, h, w];
        let out_dims = [2, n_split, h * r, w * r];
        for n in 0..2 {
            for g in 0..n_split {
                for i in 0..h {
                    for j in 0..w {
                        for dy in 0..r {
                            for dx in 0..r {
                                let src = idx4(in_dims, [n, g * r * r + dx * r + dy, i, j]);
                                let dst = idx4(out_dims, [n, g, i * r + dy, j * r + dx]);
                                assert_eq!(actual[dst], expected[src]);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_pixel_unshuffle_inverts() {
        let x = iota([1, 2 * 9, 2, 2]);
        let y = pixel_unshuffle(pixel_shuffle(x.clone(), 3, 2), 3);
        y.to_data().assert_eq(&x.to_data(), true);
    }

    #[should_panic(expected = "Pixel shuffle expects")]
    #[test]
    fn test_pixel_shuffle_bad_channels() {
        let _ = pixel_shuffle(iota([1, 6, 2, 2]), 2, 1);
    }

    #[test]
    fn test_pixel_shuffle_layer() {
        let config = PixelShuffleConfig::new(4).with_n_split(2);
        assert_eq!(config.d_input(), 32);

        let layer = config.init();
        let y = layer.forward(iota([3, 32, 5, 6]));
        assert_eq!(y.dims(), [3, 2, 20, 24]);
    }
}
