//! # Dense Head Layers
//!
//! Flattening and fully-connected layers for the discriminator-style
//! heads of super-resolution models.

use crate::utility::burn::noise::TruncatedNormal;
use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::prelude::{Backend, Tensor};

/// Flatten a ``(B, C, H, W)`` feature map to ``(B, C * H * W)``.
///
/// Features are laid out channel-major: all of channel 0, then channel 1, ...
#[must_use]
pub fn flatten<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 2> {
    x.flatten(1, 3)
}

/// Configuration for [`Dense`].
#[derive(Config, Debug)]
pub struct DenseConfig {
    /// Input feature size.
    pub d_input: usize,

    /// Output feature size.
    pub d_output: usize,

    /// Standard deviation of the truncated normal weight init.
    #[config(default = 0.02)]
    pub init_std: f64,

    /// Whether the parameters receive gradients.
    #[config(default = true)]
    pub trainable: bool,
}

impl DenseConfig {
    /// Initialize a [`Dense`] module.
    ///
    /// Weights are drawn from a normal distribution truncated at two standard
    /// deviations; the bias starts at zero.
    #[must_use]
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Dense<B> {
        let mut linear: Linear<B> = LinearConfig::new(self.d_input, self.d_output)
            .with_bias(true)
            .with_initializer(Initializer::Zeros)
            .init(device);

        let weight = TruncatedNormal::new(0.0, self.init_std)
            .noise([self.d_input, self.d_output], device);
        linear.weight = Param::from_tensor(weight);

        let layer = Dense { linear };
        match self.trainable {
            true => layer,
            false => layer.no_grad(),
        }
    }
}

/// Fully-connected layer: ``x @ W + b``.
#[derive(Module, Debug)]
pub struct Dense<B: Backend> {
    /// The wrapped linear layer.
    pub linear: Linear<B>,
}

impl<B: Backend> Dense<B> {
    /// Input feature size.
    pub fn d_input(&self) -> usize {
        self.linear.weight.dims()[0]
    }

    /// Output feature size.
    pub fn d_output(&self) -> usize {
        self.linear.weight.dims()[1]
    }

    /// Apply the layer to ``(B, d_input)``, producing ``(B, d_output)``.
    #[must_use]
    pub fn forward(
        &self,
        x: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        self.linear.forward(x)
    }
}
