use burn::prelude::{Backend, Tensor};
use burn::tensor::BasicOps;

/// Compute "same" padding for one spatial axis.
///
/// Matches the `SAME` padding rule of the `tf.nn` convolution family:
/// the output size is ``ceil(size / stride)``, and the total padding
/// is split with the smaller half placed before the data.
///
/// ## Parameters
///
/// - `size`: the input size along the axis.
/// - `kernel`: the kernel size along the axis.
/// - `stride`: the stride along the axis.
///
/// ## Returns
///
/// ``(before, after)`` padding amounts.
#[must_use]
pub fn same_padding(
    size: usize,
    kernel: usize,
    stride: usize,
) -> (usize, usize) {
    assert!(stride > 0, "stride must be > 0");
    let out = size.div_ceil(stride);
    let needed = (out.saturating_sub(1) * stride + kernel).saturating_sub(size);
    let before = needed / 2;
    (before, needed - before)
}

/// Reflect-pad a tensor along a single dimension.
///
/// Mirrors the data around the edge element, excluding the edge itself;
/// for ``[a, b, c, d]`` and `pad = 2` the result is
/// ``[c, b, a, b, c, d, c, b]``.
///
/// ## Parameters
///
/// - `tensor`: The input tensor.
/// - `pad`: The number of elements to add on each side; must be less than the dim size.
/// - `dim`: The dimension to pad.
///
/// ## Returns
///
/// A tensor with `dim` grown by ``2 * pad``.
#[must_use]
pub fn reflect_pad_dim<B: Backend, const D: usize, K>(
    tensor: Tensor<B, D, K>,
    pad: usize,
    dim: usize,
) -> Tensor<B, D, K>
where
    K: BasicOps<B>,
{
    if pad == 0 {
        return tensor;
    }
    let size = tensor.dims()[dim];
    assert!(
        pad < size,
        "Reflect padding must be < dim size: found pad={pad}, size={size}",
    );

    let before = tensor.clone().narrow(dim, 1, pad).flip([dim as isize]);
    let after = tensor
        .clone()
        .narrow(dim, size - 1 - pad, pad)
        .flip([dim as isize]);

    Tensor::cat(vec![before, tensor, after], dim)
}

/// Reflect-pad the two trailing (spatial) dimensions of a ``(B, C, H, W)`` tensor.
#[must_use]
pub fn reflect_pad2d<B: Backend>(
    x: Tensor<B, 4>,
    pad: usize,
) -> Tensor<B, 4> {
    let x = reflect_pad_dim(x, pad, 2);
    reflect_pad_dim(x, pad, 3)
}

/// Crop `margin` elements from each side of the two trailing dimensions.
#[must_use]
pub fn crop2d<B: Backend>(
    x: Tensor<B, 4>,
    margin: usize,
) -> Tensor<B, 4> {
    if margin == 0 {
        return x;
    }
    let [_, _, h, w] = x.dims();
    assert!(
        h > 2 * margin && w > 2 * margin,
        "Crop margin {margin} too large for spatial shape {:?}",
        [h, w]
    );
    x.narrow(2, margin, h - 2 * margin)
        .narrow(3, margin, w - 2 * margin)
}
