use super::{ImageConverter, run_tool};
use crate::error::{BookError, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const JPEG_QUALITY: u8 = 95;

/// SVG to PNG through `rsvg-convert`, PNG to JPEG in-process.
pub struct CoverConverter {
    rsvg_convert: PathBuf,
}

impl CoverConverter {
    pub fn new(rsvg_convert: impl Into<PathBuf>) -> Self {
        CoverConverter {
            rsvg_convert: rsvg_convert.into(),
        }
    }
}

#[async_trait]
impl ImageConverter for CoverConverter {
    async fn vector_to_raster(&self, svg: &Path, png: &Path) -> Result<()> {
        let mut command = Command::new(&self.rsvg_convert);
        command.arg("-o").arg(png).arg(svg);
        run_tool(&mut command, &self.rsvg_convert).await?;
        tracing::info!(from = %svg.display(), to = %png.display(), "cover rasterized");
        Ok(())
    }

    async fn raster_recompress(&self, png: &Path, jpg: &Path, size: (u32, u32)) -> Result<()> {
        let (png, jpg) = (png.to_path_buf(), jpg.to_path_buf());
        tokio::task::spawn_blocking(move || recompress(&png, &jpg, size))
            .await
            .map_err(|e| BookError::Rendering {
                tool: "jpeg encoder".to_string(),
                detail: e.to_string(),
            })?
    }
}

fn recompress(png: &Path, jpg: &Path, (width, height): (u32, u32)) -> Result<()> {
    let source = image::open(png)?.to_rgba8();
    let flat = flatten_onto_white(&source);
    let resized = imageops::resize(&flat, width, height, FilterType::Lanczos3);

    let writer = BufWriter::new(File::create(jpg)?);
    resized.write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))?;
    tracing::info!(to = %jpg.display(), width, height, "cover recompressed");
    Ok(())
}

/// Composites `image` over an opaque white background.
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(image.width(), image.height(), Rgba([255; 4]));
    imageops::overlay(&mut canvas, image, 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}
