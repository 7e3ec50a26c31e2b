use bimm_sr::ops::downscale::{DownscaleConfig, DownscaleKernel, downscale};
use burn::backend::NdArray;
use burn::prelude::Tensor;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_downscale_16x2x128x128(c: &mut Criterion) {
    type B = NdArray<f32>;
    let device = Default::default();

    let shape = [16, 2, 128, 128];
    let tensor: Tensor<B, 4> = Tensor::ones(shape, &device);

    for factor in [2, 4, 8] {
        for kernel in [DownscaleKernel::PerChannel, DownscaleKernel::CrossChannel] {
            let config = DownscaleConfig::new(factor).with_kernel(kernel);

            c.bench_function(
                format!("downscale: {shape:?} factor={factor} kernel={kernel:?}").as_str(),
                |b| {
                    b.iter(|| {
                        black_box(downscale(tensor.clone(), &config));
                    })
                },
            );
        }
    }
}

criterion_group!(benches, bench_downscale_16x2x128x128,);
criterion_main!(benches);
