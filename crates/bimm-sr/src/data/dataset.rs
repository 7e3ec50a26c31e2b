//! # Record-Backed Datasets and Batching

use crate::data::error::RecordError;
use crate::data::example::Example;
use crate::data::records::RecordReader;
use crate::data::sample::SrSample;
use anyhow::{Context, bail};
use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::{Backend, Tensor};
use prost::Message;
use std::path::Path;

/// An in-memory [`Dataset`] of every sample in a record file.
#[derive(Debug, Clone)]
pub struct SrRecordDataset {
    samples: Vec<SrSample>,
}

impl SrRecordDataset {
    /// Read and decode every record in `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader = RecordReader::open(path)
            .with_context(|| format!("opening record file {}", path.display()))?;

        let samples = reader
            .enumerate()
            .map(|(i, record)| {
                let example = Example::decode(record?.as_slice()).map_err(RecordError::from)?;
                SrSample::from_example(&example)
                    .with_context(|| format!("decoding record {i} of {}", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        log::debug!("Loaded {} samples from {}", samples.len(), path.display());
        Ok(Self { samples })
    }

    /// Wrap already-decoded samples.
    pub fn from_samples(samples: Vec<SrSample>) -> Self {
        Self { samples }
    }
}

impl Dataset<SrSample> for SrRecordDataset {
    fn get(
        &self,
        index: usize,
    ) -> Option<SrSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of paired samples.
#[derive(Debug, Clone)]
pub struct SrBatch<B: Backend> {
    /// Sample indices.
    pub indices: Vec<usize>,

    /// Low resolution images, ``(N, C, h, w)``.
    pub lr: Tensor<B, 4>,

    /// High resolution images, ``(N, C, H, W)``; present when every sample has one.
    pub hr: Option<Tensor<B, 4>>,
}

/// Stacks [`SrSample`]s into [`SrBatch`]es.
#[derive(Debug, Clone, Default)]
pub struct SrBatcher;

impl SrBatcher {
    /// Build a batch.
    ///
    /// ## Returns
    ///
    /// An error for an empty batch, or when sample shapes disagree.
    pub fn try_batch<B: Backend>(
        &self,
        items: Vec<SrSample>,
        device: &B::Device,
    ) -> anyhow::Result<SrBatch<B>> {
        let Some(first) = items.first() else {
            bail!("cannot batch zero samples");
        };
        let lr_shape = first.lr.shape.clone();
        let hr_shape = first.hr.as_ref().map(|hr| hr.shape.clone());

        for item in &items {
            if item.lr.shape != lr_shape {
                bail!(
                    "sample {} LR shape {:?} != batch LR shape {lr_shape:?}",
                    item.index,
                    item.lr.shape
                );
            }
            match (&hr_shape, &item.hr) {
                (Some(expected), Some(hr)) if &hr.shape != expected => bail!(
                    "sample {} HR shape {:?} != batch HR shape {expected:?}",
                    item.index,
                    hr.shape
                ),
                _ => (),
            }
        }

        let lr = Tensor::stack::<4>(
            items.iter().map(|s| s.lr_tensor::<B>(device)).collect(),
            0,
        );
        let hr = items
            .iter()
            .map(|s| s.hr_tensor::<B>(device))
            .collect::<Option<Vec<_>>>()
            .map(|hr| Tensor::stack::<4>(hr, 0));

        Ok(SrBatch {
            indices: items.iter().map(|s| s.index).collect(),
            lr,
            hr,
        })
    }
}

impl<B: Backend> Batcher<B, SrSample, SrBatch<B>> for SrBatcher {
    fn batch(
        &self,
        items: Vec<SrSample>,
        device: &B::Device,
    ) -> SrBatch<B> {
        self.try_batch(items, device)
            .expect("Failed to batch samples")
    }
}
