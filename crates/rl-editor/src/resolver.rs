//! Asset resolution: provenance → renderable visual.
//!
//! Primitives resolve synchronously from the built-in shape table and never
//! fail. Asset references are fetched and parsed asynchronously; a failure
//! is returned as [`AssetLoadError`] and the caller decides what to
//! substitute. The resolver itself never falls back.

use crate::error::AssetLoadError;
use crate::gltf_import::parse_visual;
use rl_core::model::{PrimitiveShape, Provenance};
use rl_core::visual::VisualTree;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Source of raw asset bytes.
pub trait AssetFetcher: Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = io::Result<Vec<u8>>>;
}

/// Reads asset urls as paths relative to a models directory.
#[derive(Debug, Clone)]
pub struct FsAssetFetcher {
    root: PathBuf,
}

impl FsAssetFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a url onto the models directory. Absolute paths and `..`
    /// segments are refused so a layout cannot reach outside it.
    fn path_for(&self, url: &str) -> io::Result<PathBuf> {
        let relative = Path::new(url.trim_start_matches("./"));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("asset url {url:?} is not a relative path"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetFetcher for FsAssetFetcher {
    async fn fetch(&self, url: &str) -> io::Result<Vec<u8>> {
        let path = self.path_for(url)?;
        tokio::fs::read(path).await
    }
}

/// Serves assets from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetFetcher {
    assets: Arc<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Arc::make_mut(&mut self.assets).insert(url.into(), bytes.into());
        self
    }
}

impl AssetFetcher for MemoryAssetFetcher {
    async fn fetch(&self, url: &str) -> io::Result<Vec<u8>> {
        self.assets.get(url).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no asset at {url:?}"))
        })
    }
}

/// A visual ready to attach, plus the uniform scale that normalizes it.
#[derive(Debug, Clone)]
pub struct ResolvedVisual {
    pub tree: VisualTree,
    /// Uniform scale bringing the largest bounding-box dimension to the
    /// target size. `1.0` for primitives and for degenerate assets.
    pub normalized_scale: f32,
}

#[derive(Debug, Clone)]
pub struct AssetResolver<F> {
    fetcher: F,
    target_size: f32,
}

impl<F: AssetFetcher> AssetResolver<F> {
    pub fn new(fetcher: F, target_size: f32) -> Self {
        Self {
            fetcher,
            target_size,
        }
    }

    pub fn target_size(&self) -> f32 {
        self.target_size
    }

    /// Build the shape for a primitive kind. Never fails.
    pub fn resolve_primitive(&self, kind: &str) -> ResolvedVisual {
        ResolvedVisual {
            tree: VisualTree::primitive(PrimitiveShape::for_kind(kind)),
            normalized_scale: 1.0,
        }
    }

    /// Fetch, parse and normalize an external model.
    pub async fn resolve_asset(&self, url: &str) -> Result<ResolvedVisual, AssetLoadError> {
        let bytes = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| AssetLoadError::new(url, e))?;
        let mut tree = parse_visual(&bytes).map_err(|cause| AssetLoadError::new(url, cause))?;
        tree.enable_shadows();

        let normalized_scale = self.normalization_scale(&tree);
        log::debug!("resolved {url}: scale {normalized_scale}");
        Ok(ResolvedVisual {
            tree,
            normalized_scale,
        })
    }

    pub async fn resolve(&self, provenance: &Provenance) -> Result<ResolvedVisual, AssetLoadError> {
        match provenance {
            Provenance::Primitive { kind } => Ok(self.resolve_primitive(kind)),
            Provenance::AssetRef { url, .. } => self.resolve_asset(url).await,
        }
    }

    fn normalization_scale(&self, tree: &VisualTree) -> f32 {
        let Some(max_dim) = tree.bounding_box().map(|b| b.max_dimension()) else {
            return 1.0;
        };
        if max_dim > 0.0 && max_dim.is_finite() {
            self.target_size / max_dim
        } else {
            1.0
        }
    }
}
