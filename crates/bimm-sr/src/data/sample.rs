//! # Paired Low/High Resolution Samples
//!
//! Record schema (all int64 unless noted):
//!
//! | key       | train | test | value                         |
//! |-----------|-------|------|-------------------------------|
//! | `index`   | yes   | yes  | sample index                  |
//! | `data_LR` | yes   | yes  | bytes: `(h_LR, w_LR, c)` f64  |
//! | `h_LR`    | yes   | yes  |                               |
//! | `w_LR`    | yes   | yes  |                               |
//! | `data_HR` | yes   |      | bytes: `(h_HR, w_HR, c)` f64  |
//! | `h_HR`    | yes   |      |                               |
//! | `w_HR`    | yes   |      |                               |
//! | `c`       | yes   | yes  | channels                      |
//!
//! Payloads are row-major, channels-last, little-endian `f64`.

use crate::data::error::RecordError;
use crate::data::example::{Example, Feature, bytes_feature, int64_feature};
use burn::prelude::{Backend, Tensor, TensorData};

/// Record key: sample index.
pub const INDEX_KEY: &str = "index";
/// Record key: channel count.
pub const CHANNELS_KEY: &str = "c";
/// Record key: low resolution payload.
pub const LR_DATA_KEY: &str = "data_LR";
/// Record key: low resolution height.
pub const LR_HEIGHT_KEY: &str = "h_LR";
/// Record key: low resolution width.
pub const LR_WIDTH_KEY: &str = "w_LR";
/// Record key: high resolution payload.
pub const HR_DATA_KEY: &str = "data_HR";
/// Record key: high resolution height.
pub const HR_HEIGHT_KEY: &str = "h_HR";
/// Record key: high resolution width.
pub const HR_WIDTH_KEY: &str = "w_HR";

/// One record: a low resolution image, and for training, its high resolution source.
#[derive(Debug, Clone, PartialEq)]
pub struct SrSample {
    /// Sample index within its record file.
    pub index: usize,

    /// Low resolution image, ``(h, w, c)`` f64.
    pub lr: TensorData,

    /// High resolution image, ``(h, w, c)`` f64; present on training samples.
    pub hr: Option<TensorData>,
}

impl SrSample {
    /// Build a sample from a ``(C, H, W)`` image tensor, and an optional HR tensor.
    pub fn from_tensors<B: Backend>(
        index: usize,
        lr: Tensor<B, 3>,
        hr: Option<Tensor<B, 3>>,
    ) -> Self {
        Self {
            index,
            lr: chw_to_hwc_data(lr),
            hr: hr.map(chw_to_hwc_data),
        }
    }

    /// Channel count.
    pub fn channels(&self) -> usize {
        self.lr.shape[2]
    }

    /// The LR image as a ``(C, H, W)`` tensor.
    pub fn lr_tensor<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Tensor<B, 3> {
        hwc_data_to_chw(self.lr.clone(), device)
    }

    /// The HR image as a ``(C, H, W)`` tensor, if present.
    pub fn hr_tensor<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Option<Tensor<B, 3>> {
        self.hr
            .as_ref()
            .map(|hr| hwc_data_to_chw(hr.clone(), device))
    }

    /// Encode as an [`Example`].
    pub fn to_example(&self) -> Example {
        let mut features: Vec<(&str, Feature)> = vec![
            (INDEX_KEY, int64_feature(self.index as i64)),
            (CHANNELS_KEY, int64_feature(self.channels() as i64)),
        ];
        features.extend(image_features(
            &self.lr,
            LR_DATA_KEY,
            LR_HEIGHT_KEY,
            LR_WIDTH_KEY,
        ));
        if let Some(hr) = &self.hr {
            features.extend(image_features(hr, HR_DATA_KEY, HR_HEIGHT_KEY, HR_WIDTH_KEY));
        }
        Example::from_features(features)
    }

    /// Decode from an [`Example`].
    ///
    /// The HR image is read only when `data_HR` is present.
    pub fn from_example(example: &Example) -> Result<Self, RecordError> {
        let index = require_int(example, INDEX_KEY)?;
        let channels = require_int(example, CHANNELS_KEY)?;

        let lr = read_image(example, LR_DATA_KEY, LR_HEIGHT_KEY, LR_WIDTH_KEY, channels)?;
        let hr = match example.get(HR_DATA_KEY) {
            None => None,
            Some(_) => Some(read_image(
                example,
                HR_DATA_KEY,
                HR_HEIGHT_KEY,
                HR_WIDTH_KEY,
                channels,
            )?),
        };

        Ok(Self { index, lr, hr })
    }
}

/// Convert a ``(C, H, W)`` tensor into ``(H, W, C)`` f64 data.
fn chw_to_hwc_data<B: Backend>(x: Tensor<B, 3>) -> TensorData {
    x.permute([1, 2, 0]).into_data().convert::<f64>()
}

/// Convert ``(H, W, C)`` data into a ``(C, H, W)`` tensor.
fn hwc_data_to_chw<B: Backend>(
    data: TensorData,
    device: &B::Device,
) -> Tensor<B, 3> {
    Tensor::<B, 3>::from_data(data, device).permute([2, 0, 1])
}

fn image_features(
    data: &TensorData,
    data_key: &'static str,
    height_key: &'static str,
    width_key: &'static str,
) -> [(&'static str, Feature); 3] {
    let bytes = data
        .iter::<f64>()
        .flat_map(|v| v.to_le_bytes())
        .collect::<Vec<u8>>();
    [
        (data_key, bytes_feature(bytes)),
        (height_key, int64_feature(data.shape[0] as i64)),
        (width_key, int64_feature(data.shape[1] as i64)),
    ]
}

fn require_int(
    example: &Example,
    key: &str,
) -> Result<usize, RecordError> {
    if example.get(key).is_none() {
        return Err(RecordError::missing(key));
    }
    let value = example
        .get_int64(key)
        .ok_or_else(|| RecordError::kind(key, "int64_list"))?;
    usize::try_from(value).map_err(|_| RecordError::kind(key, "non-negative int64"))
}

fn read_image(
    example: &Example,
    data_key: &str,
    height_key: &str,
    width_key: &str,
    channels: usize,
) -> Result<TensorData, RecordError> {
    let height = require_int(example, height_key)?;
    let width = require_int(example, width_key)?;
    let shape = vec![height, width, channels];

    if example.get(data_key).is_none() {
        return Err(RecordError::missing(data_key));
    }
    let bytes = example
        .get_bytes(data_key)
        .ok_or_else(|| RecordError::kind(data_key, "bytes_list"))?;

    if bytes.len() != height * width * channels * size_of::<f64>() {
        return Err(RecordError::PayloadShape {
            key: data_key.to_string(),
            shape,
            found: bytes.len(),
        });
    }

    let values = bytes
        .chunks_exact(size_of::<f64>())
        .map(|chunk| {
            let mut le = [0u8; 8];
            le.copy_from_slice(chunk);
            f64::from_le_bytes(le)
        })
        .collect::<Vec<f64>>();

    Ok(TensorData::new(values, shape))
}
