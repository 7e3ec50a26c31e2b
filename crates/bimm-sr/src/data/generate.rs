//! # Paired Sample Record Generation

use crate::data::records::RecordWriter;
use crate::data::sample::SrSample;
use crate::ops::downscale::{DownscaleConfig, DownscaleKernel, try_downscale};
use anyhow::Context;
use burn::config::Config;
use burn::prelude::{Backend, Tensor};
use prost::Message;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// What a record file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordMode {
    /// `data` is high resolution; it is downscaled by `factor` and both
    /// resolutions are written.
    Train {
        /// Downscale factor.
        factor: usize,
    },

    /// `data` is already low resolution; only it is written.
    Test,
}

/// Record generation parameters.
#[derive(Config, Debug)]
pub struct SrRecordConfig {
    /// Record mode.
    pub mode: RecordMode,

    /// Channel mixing used when downscaling training data.
    #[config(default = "DownscaleKernel::PerChannel")]
    pub kernel: DownscaleKernel,
}

impl SrRecordConfig {
    /// The downscale applied in this mode, if any.
    pub fn downscale(&self) -> Option<DownscaleConfig> {
        match self.mode {
            RecordMode::Train { factor } => {
                Some(DownscaleConfig::new(factor).with_kernel(self.kernel))
            }
            RecordMode::Test => None,
        }
    }

    /// Write `data` to a record file at `path`.
    ///
    /// See [`write_sr_records`].
    pub fn write<B: Backend, P: AsRef<Path>>(
        &self,
        path: P,
        data: Tensor<B, 4>,
    ) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let start = Instant::now();
        let [n, c, h, w] = data.dims();
        log::info!(
            "Writing {n} {:?} records of shape {:?} to {}",
            self.mode,
            [c, h, w],
            path.display()
        );

        let pairs: Vec<(Tensor<B, 3>, Option<Tensor<B, 3>>)> = match self.downscale() {
            Some(downscale) => {
                let lr = try_downscale(data.clone(), &downscale)?;
                log::debug!("Downscaled to {:?}", lr.dims());
                split_batch(lr)
                    .into_iter()
                    .zip(split_batch(data).into_iter().map(Some))
                    .collect()
            }
            None => split_batch(data)
                .into_iter()
                .map(|lr| (lr, None))
                .collect(),
        };

        let mut writer = RecordWriter::create(path)
            .with_context(|| format!("creating record file {}", path.display()))?;
        for (index, (lr, hr)) in pairs.into_iter().enumerate() {
            let sample = SrSample::from_tensors(index, lr, hr);
            writer
                .write(&sample.to_example().encode_to_vec())
                .with_context(|| format!("writing record {index} to {}", path.display()))?;
        }
        writer.flush()?;

        log::info!(
            "Wrote {} records to {} in {:.1}s",
            writer.count(),
            path.display(),
            start.elapsed().as_secs_f32()
        );
        Ok(writer.count())
    }
}

fn split_batch<B: Backend>(x: Tensor<B, 4>) -> Vec<Tensor<B, 3>> {
    if x.dims()[0] == 0 {
        return Vec::new();
    }
    x.split(1, 0).into_iter().map(|t| t.squeeze(0)).collect()
}

/// Write paired super-resolution samples to a record file.
///
/// ## Arguments
///
/// * `path` - The record file to create.
/// * `data` - ``(N, C, H, W)`` images; high resolution in [`RecordMode::Train`],
///   low resolution in [`RecordMode::Test`].
/// * `mode` - The record mode.
///
/// Downscaling runs at the backend's float precision (`f32` on `NdArray`);
/// values are widened to `f64` payloads afterwards, so LR payloads carry
/// backend rounding rather than double-precision box means.
///
/// ## Returns
///
/// The number of records written; one per image, with `index` in input order.
pub fn write_sr_records<B: Backend, P: AsRef<Path>>(
    path: P,
    data: Tensor<B, 4>,
    mode: RecordMode,
) -> anyhow::Result<usize> {
    SrRecordConfig::new(mode).write(path, data)
}
