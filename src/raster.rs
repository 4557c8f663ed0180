//! Grayscale raster buffers and the image file codec that produces them.

use std::path::Path;

use image::GrayImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// Image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Dimensions { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Errors unless `samples` is exactly `width * height`
    pub fn check(&self, samples: usize) -> Result<()> {
        if samples != self.pixel_count() {
            return Err(CodecError::DimensionMismatch {
                width: self.width,
                height: self.height,
                expected: self.pixel_count(),
                actual: samples,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Row-major 8-bit intensity samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayRaster {
    dimensions: Dimensions,
    samples: Vec<u8>,
}

impl GrayRaster {
    pub fn new(dimensions: Dimensions, samples: Vec<u8>) -> Result<Self> {
        dimensions.check(samples.len())?;
        Ok(GrayRaster {
            dimensions,
            samples,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.samples
            .get(y as usize * self.width() as usize + x as usize)
            .copied()
    }

    /// `height` rows of `width` samples each
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks() rejects a zero size; a zero-width raster has no samples anyway
        let width = (self.width() as usize).max(1);
        self.samples.chunks(width)
    }
}

/// Loads image files as grayscale rasters and writes them back.
pub trait RasterCodec {
    fn load(&self, path: &Path) -> Result<GrayRaster>;
    fn save(&self, raster: &GrayRaster, path: &Path) -> Result<()>;
}

/// [`RasterCodec`] backed by the `image` crate. Color inputs are converted to luma.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRasterCodec;

impl RasterCodec for ImageRasterCodec {
    fn load(&self, path: &Path) -> Result<GrayRaster> {
        let img = image::open(path)?.into_luma8();
        let dimensions = Dimensions::new(img.width(), img.height());
        debug!("loaded {} ({})", path.display(), dimensions);
        GrayRaster::new(dimensions, img.into_raw())
    }

    fn save(&self, raster: &GrayRaster, path: &Path) -> Result<()> {
        let dimensions = raster.dimensions();
        let img = GrayImage::from_raw(dimensions.width, dimensions.height, raster.samples().to_vec())
            .ok_or(CodecError::DimensionMismatch {
                width: dimensions.width,
                height: dimensions.height,
                expected: dimensions.pixel_count(),
                actual: raster.samples().len(),
            })?;
        img.save(path)?;
        debug!("saved {} ({})", path.display(), dimensions);
        Ok(())
    }
}
