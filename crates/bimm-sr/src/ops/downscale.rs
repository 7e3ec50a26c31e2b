//! # Strided Box Downscaling
//!
//! Produces the low-resolution half of paired training samples.

use crate::compat::ops::same_padding;
use anyhow::bail;
use burn::config::Config;
use burn::prelude::{Backend, Tensor};
use burn::tensor::module::conv2d;
use burn::tensor::ops::ConvOptions;

/// How the box kernel combines channels.
#[derive(Config, Debug, Copy, PartialEq, Eq)]
pub enum DownscaleKernel {
    /// Each output channel is the box mean of its own input channel.
    PerChannel,

    /// Every output channel is the box mean over all input channels.
    ///
    /// Equivalent to a constant ``(c, c, K, K)`` kernel of ``1 / (c * K²)``.
    /// For two channels this is the fixed ``1 / (2 * K²)`` velocity-field
    /// kernel; for other channel counts the weight scales with `c`.
    CrossChannel,
}

/// Configuration for [`downscale`].
#[derive(Config, Debug, Copy)]
pub struct DownscaleConfig {
    /// Downscale factor; both the box size and the stride.
    pub factor: usize,

    /// Channel mixing.
    #[config(default = "DownscaleKernel::PerChannel")]
    pub kernel: DownscaleKernel,
}

impl DownscaleConfig {
    /// Output resolution for a given input resolution.
    pub fn output_resolution(
        &self,
        input_resolution: [usize; 2],
    ) -> [usize; 2] {
        input_resolution.map(|d| d.div_ceil(self.factor))
    }

    /// Build the constant convolution weight for `channels` channels.
    fn weight<B: Backend>(
        &self,
        channels: usize,
        device: &B::Device,
    ) -> (Tensor<B, 4>, usize) {
        let k = self.factor;
        match self.kernel {
            DownscaleKernel::PerChannel => {
                let scale = 1.0 / (k * k) as f64;
                (Tensor::full([channels, 1, k, k], scale, device), channels)
            }
            DownscaleKernel::CrossChannel => {
                let scale = 1.0 / (channels * k * k) as f64;
                (Tensor::full([channels, channels, k, k], scale, device), 1)
            }
        }
    }
}

/// Downscale a batch by strided box filtering.
///
/// Uses "same" zero padding when the input does not divide evenly; padded
/// zeros count towards the box sum.
///
/// ## Arguments
///
/// * `x` - Input of shape ``(B, C, H, W)``.
/// * `config` - The downscale configuration.
///
/// ## Returns
///
/// Output of shape ``(B, C, ceil(H / K), ceil(W / K))``; or an error if the
/// factor is zero.
pub fn try_downscale<B: Backend>(
    x: Tensor<B, 4>,
    config: &DownscaleConfig,
) -> anyhow::Result<Tensor<B, 4>> {
    let k = config.factor;
    if k == 0 {
        bail!("downscale factor must be > 0: {config:?}");
    }
    if k == 1 && config.kernel == DownscaleKernel::PerChannel {
        return Ok(x);
    }

    let [_, channels, h, w] = x.dims();
    let (top, bottom) = same_padding(h, k, k);
    let (left, right) = same_padding(w, k, k);
    let x = match top + bottom + left + right {
        0 => x,
        _ => x.pad((left, right, top, bottom), 0.0),
    };

    let (weight, groups) = config.weight::<B>(channels, &x.device());
    Ok(conv2d(
        x,
        weight,
        None,
        ConvOptions::new([k, k], [0, 0], [1, 1], groups),
    ))
}

/// Downscale a batch by strided box filtering; panics on a zero factor.
///
/// See [`try_downscale`].
#[must_use]
pub fn downscale<B: Backend>(
    x: Tensor<B, 4>,
    config: &DownscaleConfig,
) -> Tensor<B, 4> {
    try_downscale(x, config).unwrap_or_else(|e| panic!("{e}"))
}

/// Downscale a single ``(C, H, W)`` image.
pub fn downscale_image<B: Backend>(
    x: Tensor<B, 3>,
    config: &DownscaleConfig,
) -> anyhow::Result<Tensor<B, 3>> {
    let y = try_downscale(x.unsqueeze_dim(0), config)?;
    Ok(y.squeeze(0))
}
