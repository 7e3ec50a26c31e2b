//! # `tf.train.Example` Messages
//!
//! Hand-declared `prost` messages, wire-compatible with
//! `tensorflow/core/example/{example,feature}.proto`.
//!
//! Feature maps are `BTreeMap`s, so encoding is deterministic.

use std::collections::BTreeMap;

/// A list of byte strings.
#[derive(Clone, PartialEq, prost::Message)]
pub struct BytesList {
    /// The values.
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub value: Vec<Vec<u8>>,
}

/// A list of floats.
#[derive(Clone, PartialEq, prost::Message)]
pub struct FloatList {
    /// The values.
    #[prost(float, repeated, tag = "1")]
    pub value: Vec<f32>,
}

/// A list of 64-bit integers.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Int64List {
    /// The values.
    #[prost(int64, repeated, tag = "1")]
    pub value: Vec<i64>,
}

/// A single named feature value.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    /// The feature payload.
    #[prost(oneof = "feature::Kind", tags = "1, 2, 3")]
    pub kind: Option<feature::Kind>,
}

/// Nested types for [`Feature`].
pub mod feature {
    /// The feature payload.
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        /// Byte strings.
        #[prost(message, tag = "1")]
        BytesList(super::BytesList),

        /// Floats.
        #[prost(message, tag = "2")]
        FloatList(super::FloatList),

        /// Integers.
        #[prost(message, tag = "3")]
        Int64List(super::Int64List),
    }
}

/// Named features.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Features {
    /// Feature map.
    #[prost(btree_map = "string, message", tag = "1")]
    pub feature: BTreeMap<String, Feature>,
}

/// A record: a bag of named features.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Example {
    /// The features.
    #[prost(message, optional, tag = "1")]
    pub features: Option<Features>,
}

/// Build a single-value bytes feature.
pub fn bytes_feature(value: Vec<u8>) -> Feature {
    Feature {
        kind: Some(feature::Kind::BytesList(BytesList { value: vec![value] })),
    }
}

/// Build a single-value int64 feature.
pub fn int64_feature(value: i64) -> Feature {
    Feature {
        kind: Some(feature::Kind::Int64List(Int64List { value: vec![value] })),
    }
}

/// Build a float list feature.
pub fn float_feature(value: Vec<f32>) -> Feature {
    Feature {
        kind: Some(feature::Kind::FloatList(FloatList { value })),
    }
}

impl Example {
    /// Build an example from `(key, feature)` pairs.
    pub fn from_features<I, K>(features: I) -> Self
    where
        I: IntoIterator<Item = (K, Feature)>,
        K: Into<String>,
    {
        Example {
            features: Some(Features {
                feature: features.into_iter().map(|(k, f)| (k.into(), f)).collect(),
            }),
        }
    }

    /// Look up a feature by key.
    pub fn get(
        &self,
        key: &str,
    ) -> Option<&Feature> {
        self.features.as_ref()?.feature.get(key)
    }

    /// The first value of an int64 feature.
    pub fn get_int64(
        &self,
        key: &str,
    ) -> Option<i64> {
        match self.get(key)?.kind.as_ref()? {
            feature::Kind::Int64List(list) => list.value.first().copied(),
            _ => None,
        }
    }

    /// The first value of a bytes feature.
    pub fn get_bytes(
        &self,
        key: &str,
    ) -> Option<&[u8]> {
        match self.get(key)?.kind.as_ref()? {
            feature::Kind::BytesList(list) => list.value.first().map(Vec::as_slice),
            _ => None,
        }
    }
}
