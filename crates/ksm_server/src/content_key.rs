//! Content key providers
//!
//! The policy source deciding which key an asset gets sits behind
//! [`ContentKeyProvider`]. Three implementations ship here: fresh random keys,
//! a single fixed key, and a static per-asset table.

use std::collections::HashMap;

use ksm_crypto::KeyError;
use thiserror::Error;
use tracing::debug;

use crate::types::{AssetContext, ContentKey};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no content key for asset {asset_id}")]
    UnknownAsset { asset_id: String },

    #[error("invalid content key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("content key source unavailable: {0}")]
    Unavailable(String),
}

/// Issues the content key for one request
pub trait ContentKeyProvider: Send + Sync {
    fn issue(&self, context: &AssetContext) -> Result<ContentKey, ProviderError>;
}

/// A new random key and IV for every request
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomContentKey;

impl ContentKeyProvider for RandomContentKey {
    fn issue(&self, _context: &AssetContext) -> Result<ContentKey, ProviderError> {
        Ok(ContentKey::random())
    }
}

/// The same key for every asset
#[derive(Debug, Clone)]
pub struct FixedContentKey(ContentKey);

impl FixedContentKey {
    pub fn new(key: ContentKey) -> Self {
        Self(key)
    }
}

impl ContentKeyProvider for FixedContentKey {
    fn issue(&self, _context: &AssetContext) -> Result<ContentKey, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Per-asset keys held in memory
#[derive(Debug, Default)]
pub struct StaticContentKeys {
    keys: HashMap<Vec<u8>, ContentKey>,
}

impl StaticContentKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_id: impl Into<Vec<u8>>, key: ContentKey) -> Option<ContentKey> {
        self.keys.insert(asset_id.into(), key)
    }

    pub fn with_key(mut self, asset_id: impl Into<Vec<u8>>, key: ContentKey) -> Self {
        self.insert(asset_id, key);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl ContentKeyProvider for StaticContentKeys {
    fn issue(&self, context: &AssetContext) -> Result<ContentKey, ProviderError> {
        match self.keys.get(&context.asset_id) {
            Some(key) => Ok(key.clone()),
            None => {
                debug!(asset_id = %hex::encode(&context.asset_id), "no static key for asset");
                Err(ProviderError::UnknownAsset {
                    asset_id: hex::encode(&context.asset_id),
                })
            }
        }
    }
}
