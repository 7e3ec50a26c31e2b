//! # "Same"-Padded Strided Convolution

use crate::compat::ops::same_padding;
use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Initializer, PaddingConfig2d};
use burn::prelude::{Backend, Tensor};

/// Common introspection interface for `SameConv2d` modules.
pub trait SameConv2dMeta {
    /// Input channels.
    fn d_input(&self) -> usize;

    /// Output channels.
    fn d_output(&self) -> usize;

    /// Kernel size (height, width).
    fn kernel_size(&self) -> [usize; 2];

    /// Stride, applied to both spatial axes.
    fn stride(&self) -> usize;

    /// Output resolution for a given input resolution.
    fn output_resolution(
        &self,
        input_resolution: [usize; 2],
    ) -> [usize; 2] {
        let [h, w] = input_resolution;
        [h.div_ceil(self.stride()), w.div_ceil(self.stride())]
    }
}

/// Configuration for [`SameConv2d`].
#[derive(Config, Debug)]
pub struct SameConv2dConfig {
    /// Input channels.
    pub d_input: usize,

    /// Output channels.
    pub d_output: usize,

    /// Kernel size (height, width).
    pub kernel_size: [usize; 2],

    /// Stride, applied to both spatial axes.
    #[config(default = 1)]
    pub stride: usize,

    /// Whether the parameters receive gradients.
    #[config(default = true)]
    pub trainable: bool,

    /// Weight and bias initializer.
    #[config(default = "Initializer::XavierUniform { gain: 1.0 }")]
    pub initializer: Initializer,
}

impl SameConv2dMeta for SameConv2dConfig {
    fn d_input(&self) -> usize {
        self.d_input
    }

    fn d_output(&self) -> usize {
        self.d_output
    }

    fn kernel_size(&self) -> [usize; 2] {
        self.kernel_size
    }

    fn stride(&self) -> usize {
        self.stride
    }
}

impl SameConv2dConfig {
    /// Initialize a [`SameConv2d`] module.
    ///
    /// ## Arguments
    ///
    /// * `device` - The device on which the module will be initialized.
    #[must_use]
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> SameConv2d<B> {
        assert!(self.stride > 0, "stride must be > 0");

        let conv = Conv2dConfig::new([self.d_input, self.d_output], self.kernel_size)
            .with_stride([self.stride, self.stride])
            .with_padding(PaddingConfig2d::Valid)
            .with_bias(true)
            .with_initializer(self.initializer.clone())
            .init(device);

        let layer = SameConv2d {
            stride: self.stride,
            conv,
        };

        match self.trainable {
            true => layer,
            false => layer.no_grad(),
        }
    }
}

/// Strided 2d convolution with "same" padding.
///
/// Output resolution is ``ceil(input / stride)``; zero padding is split
/// with the smaller half on the top/left edges.
#[derive(Module, Debug)]
pub struct SameConv2d<B: Backend> {
    /// Stride, applied to both spatial axes.
    pub stride: usize,

    /// The unpadded convolution.
    pub conv: Conv2d<B>,
}

impl<B: Backend> SameConv2dMeta for SameConv2d<B> {
    fn d_input(&self) -> usize {
        self.conv.weight.dims()[1]
    }

    fn d_output(&self) -> usize {
        self.conv.weight.dims()[0]
    }

    fn kernel_size(&self) -> [usize; 2] {
        let [_, _, kh, kw] = self.conv.weight.dims();
        [kh, kw]
    }

    fn stride(&self) -> usize {
        self.stride
    }
}

impl<B: Backend> SameConv2d<B> {
    /// Apply the convolution.
    ///
    /// ## Arguments
    ///
    /// * `x` - Input tensor of shape ``(B, d_input, H, W)``.
    ///
    /// ## Returns
    ///
    /// * Output tensor of shape ``(B, d_output, ceil(H / stride), ceil(W / stride))``.
    #[must_use]
    pub fn forward(
        &self,
        x: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        let [_, d_input, h, w] = x.dims();
        assert_eq!(
            d_input,
            self.d_input(),
            "Expected {} input channels, found {d_input}",
            self.d_input()
        );

        let [kh, kw] = self.kernel_size();
        let (top, bottom) = same_padding(h, kh, self.stride);
        let (left, right) = same_padding(w, kw, self.stride);

        let x = match top + bottom + left + right {
            0 => x,
            _ => x.pad((left, right, top, bottom), 0.0),
        };

        self.conv.forward(x)
    }
}
