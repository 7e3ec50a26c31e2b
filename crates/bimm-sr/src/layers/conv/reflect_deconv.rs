//! # Reflect-Padded Transposed Convolution
//!
//! Upsampling deconvolution which reflect-pads its input, runs a "same"
//! transposed convolution, and crops the padding margin back off the
//! result. Reflection keeps the kernel from seeing artificial zero borders.

use crate::compat::ops::{crop2d, reflect_pad2d};
use burn::config::Config;
use burn::module::Module;
use burn::nn::Initializer;
use burn::nn::conv::{ConvTranspose2d, ConvTranspose2dConfig};
use burn::prelude::{Backend, Tensor};

/// Common introspection interface for `ReflectConvTranspose2d` modules.
pub trait ReflectConvTranspose2dMeta {
    /// Input channels.
    fn d_input(&self) -> usize;

    /// Output channels.
    fn d_output(&self) -> usize;

    /// Kernel size (height, width).
    fn kernel_size(&self) -> [usize; 2];

    /// Stride, applied to both spatial axes.
    fn stride(&self) -> usize;

    /// Reflection padding applied to the input, and cropped from the output.
    fn reflect_margin(&self) -> usize;

    /// Output resolution for a given input resolution.
    ///
    /// ``(size + 2 * margin) * stride - 2 * margin`` on each axis.
    fn output_resolution(
        &self,
        input_resolution: [usize; 2],
    ) -> [usize; 2] {
        let m = self.reflect_margin();
        let s = self.stride();
        input_resolution.map(|d| (d + 2 * m) * s - 2 * m)
    }
}

/// Configuration for [`ReflectConvTranspose2d`].
#[derive(Config, Debug)]
pub struct ReflectConvTranspose2dConfig {
    /// Input channels.
    pub d_input: usize,

    /// Output channels.
    pub d_output: usize,

    /// Kernel size (height, width).
    pub kernel_size: [usize; 2],

    /// Stride, applied to both spatial axes.
    #[config(default = 1)]
    pub stride: usize,

    /// Reflection padding applied to the input, and cropped from the output.
    #[config(default = 3)]
    pub reflect_margin: usize,

    /// Whether the parameters receive gradients.
    #[config(default = true)]
    pub trainable: bool,

    /// Weight and bias initializer.
    #[config(default = "Initializer::XavierUniform { gain: 1.0 }")]
    pub initializer: Initializer,
}

impl ReflectConvTranspose2dMeta for ReflectConvTranspose2dConfig {
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

    fn reflect_margin(&self) -> usize {
        self.reflect_margin
    }
}

impl ReflectConvTranspose2dConfig {
    /// Initialize a [`ReflectConvTranspose2d`] module.
    ///
    /// ## Arguments
    ///
    /// * `device` - The device on which the module will be initialized.
    #[must_use]
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> ReflectConvTranspose2d<B> {
        assert!(self.stride > 0, "stride must be > 0");

        // Short kernels leave the full transposed output shorter than
        // ``size * stride``; pad the tail to make up the difference.
        let padding_out = self.kernel_size.map(|k| self.stride.saturating_sub(k));

        let deconv = ConvTranspose2dConfig::new([self.d_input, self.d_output], self.kernel_size)
            .with_stride([self.stride, self.stride])
            .with_padding([0, 0])
            .with_padding_out(padding_out)
            .with_bias(true)
            .with_initializer(self.initializer.clone())
            .init(device);

        let layer = ReflectConvTranspose2d {
            stride: self.stride,
            reflect_margin: self.reflect_margin,
            deconv,
        };

        match self.trainable {
            true => layer,
            false => layer.no_grad(),
        }
    }
}

/// Reflect-padded transposed 2d convolution with "same" output sizing.
#[derive(Module, Debug)]
pub struct ReflectConvTranspose2d<B: Backend> {
    /// Stride, applied to both spatial axes.
    pub stride: usize,

    /// Reflection padding applied to the input, and cropped from the output.
    pub reflect_margin: usize,

    /// The unpadded transposed convolution.
    pub deconv: ConvTranspose2d<B>,
}

impl<B: Backend> ReflectConvTranspose2dMeta for ReflectConvTranspose2d<B> {
    fn d_input(&self) -> usize {
        self.deconv.weight.dims()[0]
    }

    fn d_output(&self) -> usize {
        self.deconv.weight.dims()[1]
    }

    fn kernel_size(&self) -> [usize; 2] {
        let [_, _, kh, kw] = self.deconv.weight.dims();
        [kh, kw]
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn reflect_margin(&self) -> usize {
        self.reflect_margin
    }
}

impl<B: Backend> ReflectConvTranspose2d<B> {
    /// Apply the layer.
    ///
    /// ## Arguments
    ///
    /// * `x` - Input tensor of shape ``(B, d_input, H, W)``;
    ///   `H` and `W` must exceed `reflect_margin`.
    ///
    /// ## Returns
    ///
    /// * Output tensor of shape ``(B, d_output, H', W')``, see
    ///   [`ReflectConvTranspose2dMeta::output_resolution`].
    #[must_use]
    pub fn forward(
        &self,
        x: Tensor<B, 4>,
    ) -> Tensor<B, 4> {
        let [_, d_input, _, _] = x.dims();
        assert_eq!(
            d_input,
            self.d_input(),
            "Expected {} input channels, found {d_input}",
            self.d_input()
        );

        let x = reflect_pad2d(x, self.reflect_margin);
        let [_, _, h, w] = x.dims();

        let y = self.deconv.forward(x);

        // Keep the centered ``size * stride`` window of the full output.
        let [kh, kw] = self.kernel_size();
        let top = kh.saturating_sub(self.stride) / 2;
        let left = kw.saturating_sub(self.stride) / 2;
        let y = y
            .narrow(2, top, h * self.stride)
            .narrow(3, left, w * self.stride);

        crop2d(y, self.reflect_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_tensor_close;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::Param;
    use burn::prelude::TensorData;

    type B = NdArray;

    #[test]
    fn test_reflect_deconv_meta() {
        let config = ReflectConvTranspose2dConfig::new(4, 2, [5, 5]).with_stride(2);
        assert_eq!(config.reflect_margin(), 3);
        assert_eq!(config.output_resolution([8, 10]), [22, 26]);

        let wide = config.clone().with_reflect_margin(5);
        assert_eq!(wide.output_resolution([8, 10]), [26, 30]);

        let device = Default::default();
        let layer: ReflectConvTranspose2d<B> = config.init(&device);
        assert_eq!(layer.d_input(), 4);
        assert_eq!(layer.d_output(), 2);
        assert_eq!(layer.kernel_size(), [5, 5]);
        assert_eq!(layer.stride(), 2);
        assert_eq!(layer.reflect_margin(), 3);
    }

    #[test]
    fn test_reflect_deconv_output_shapes() {
        let device = Default::default();

        for (stride, kernel, margin) in [
            (1, [3, 3], 3),
            (2, [4, 4], 3),
            (2, [3, 3], 3),
            (4, [2, 2], 3),
            (2, [5, 5], 5),
        ] {
            let layer: ReflectConvTranspose2d<B> = ReflectConvTranspose2dConfig::new(3, 2, kernel)
                .with_stride(stride)
                .with_reflect_margin(margin)
                .init(&device);

            let input = [6, 7];
            let x = Tensor::<B, 4>::ones([2, 3, input[0], input[1]], &device);
            let y = layer.forward(x);

            let [oh, ow] = layer.output_resolution(input);
            assert_eq!(y.dims(), [2, 2, oh, ow]);
        }
    }

    #[test]
    fn test_reflect_deconv_identity_kernel() {
        let device = Default::default();
        let mut layer: ReflectConvTranspose2d<B> = ReflectConvTranspose2dConfig::new(1, 1, [1, 1])
            .with_reflect_margin(1)
            .init(&device);

        layer.deconv.weight = Param::from_tensor(Tensor::ones([1, 1, 1, 1], &device));
        layer.deconv.bias = Some(Param::from_tensor(Tensor::from_data([1.0], &device)));

        let x = Tensor::<B, 4>::from_data(
            TensorData::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [1, 1, 2, 3]),
            &device,
        );
        let y = layer.forward(x);
        assert_eq!(y.dims(), [1, 1, 2, 3]);
        assert_tensor_close(y, &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 1e-5);
    }

    #[test]
    fn test_reflect_deconv_nearest_upsample() {
        let device = Default::default();
        let mut layer: ReflectConvTranspose2d<B> = ReflectConvTranspose2dConfig::new(1, 1, [2, 2])
            .with_stride(2)
            .with_reflect_margin(1)
            .init(&device);

        layer.deconv.weight = Param::from_tensor(Tensor::ones([1, 1, 2, 2], &device));
        layer.deconv.bias = Some(Param::from_tensor(Tensor::zeros([1], &device)));

        let x = Tensor::<B, 4>::from_data(
            TensorData::new(vec![1.0, 2.0, 3.0, 4.0], [1, 1, 2, 2]),
            &device,
        );
        let y = layer.forward(x);

        // Padded to 4x4, upsampled to 8x8, cropped by 1 to 6x6.
        assert_eq!(y.dims(), [1, 1, 6, 6]);
        #[rustfmt::skip]
        let expected = [
            4.0, 3.0, 3.0, 4.0, 4.0, 3.0,
            2.0, 1.0, 1.0, 2.0, 2.0, 1.0,
            2.0, 1.0, 1.0, 2.0, 2.0, 1.0,
            4.0, 3.0, 3.0, 4.0, 4.0, 3.0,
            4.0, 3.0, 3.0, 4.0, 4.0, 3.0,
            2.0, 1.0, 1.0, 2.0, 2.0, 1.0,
        ];
        assert_tensor_close(y, &expected, 1e-5);
    }

    /// Direct transposed convolution: scatter each padded input pixel through
    /// the kernel, keep the centered ``padded * s`` window, crop the margin.
    fn scatter_reference(
        padded: &[f32],
        [ph, pw]: [usize; 2],
        kernel: &[f32],
        k: usize,
        s: usize,
        margin: usize,
    ) -> Vec<f64> {
        let fh = ((ph - 1) * s + k).max(ph * s);
        let fw = ((pw - 1) * s + k).max(pw * s);
        let mut full = vec![0.0f64; fh * fw];
        for y in 0..ph {
            for x in 0..pw {
                for ky in 0..k {
                    for kx in 0..k {
                        full[(y * s + ky) * fw + x * s + kx] +=
                            (padded[y * pw + x] * kernel[ky * k + kx]) as f64;
                    }
                }
            }
        }

        let offset = k.saturating_sub(s) / 2;
        let mut out = Vec::new();
        for oy in margin..ph * s - margin {
            for ox in margin..pw * s - margin {
                out.push(full[(offset + oy) * fw + offset + ox]);
            }
        }
        out
    }

    #[test]
    fn test_reflect_deconv_matches_scatter() {
        let device = Default::default();
        let (h, w, margin) = (4, 5, 2);
        let input = (0..h * w).map(|v| (v * v % 7) as f32 - 2.0).collect::<Vec<_>>();
        let x = Tensor::<B, 4>::from_data(TensorData::new(input, [1, 1, h, w]), &device);

        let padded = reflect_pad2d(x.clone(), margin);
        let [_, _, ph, pw] = padded.dims();
        let padded = padded.into_data().to_vec::<f32>().unwrap();

        for (k, s) in [(3, 1), (4, 2), (5, 2)] {
            // Asymmetric kernel, so a flipped kernel would not match.
            let kernel = (0..k * k).map(|v| 1.0 + v as f32 * 0.5).collect::<Vec<_>>();

            let mut layer: ReflectConvTranspose2d<B> =
                ReflectConvTranspose2dConfig::new(1, 1, [k, k])
                    .with_stride(s)
                    .with_reflect_margin(margin)
                    .init(&device);
            layer.deconv.weight = Param::from_tensor(Tensor::from_data(
                TensorData::new(kernel.clone(), [1, 1, k, k]),
                &device,
            ));
            layer.deconv.bias = Some(Param::from_tensor(Tensor::zeros([1], &device)));

            let y = layer.forward(x.clone());
            let [oh, ow] = layer.output_resolution([h, w]);
            assert_eq!(y.dims(), [1, 1, oh, ow], "k={k} s={s}");

            let expected = scatter_reference(&padded, [ph, pw], &kernel, k, s, margin);
            assert_eq!(expected.len(), oh * ow);
            assert_tensor_close(y, &expected, 1e-3);
        }
    }

    #[should_panic(expected = "Reflect padding must be < dim size")]
    #[test]
    fn test_reflect_deconv_input_too_small() {
        let device = Default::default();
        let layer: ReflectConvTranspose2d<B> =
            ReflectConvTranspose2dConfig::new(1, 1, [3, 3]).init(&device);
        let _ = layer.forward(Tensor::ones([1, 1, 3, 3], &device));
    }

    #[test]
    fn test_reflect_deconv_frozen() {
        type AB = Autodiff<NdArray>;
        let device = Default::default();

        let layer: ReflectConvTranspose2d<AB> = ReflectConvTranspose2dConfig::new(2, 2, [3, 3])
            .with_trainable(false)
            .init(&device);
        assert!(!layer.deconv.weight.is_require_grad());
    }
}
