use std::path::Path;

use super::RasterImage;
use crate::error::{Error, Result};

pub(super) fn load_rgba(path: &Path) -> Result<RasterImage> {
    let img = image::open(path).map_err(|source| Error::Codec {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();

    RasterImage::new(width, height, rgba.into_raw())
}

pub(super) fn save_rgba(raster: &RasterImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        common::ensure_dir(parent).map_err(|e| Error::io(parent, e))?;
    }

    image::save_buffer(
        path,
        raster.pixels(),
        raster.width(),
        raster.height(),
        image::ExtendedColorType::Rgba8,
    )
    .map_err(|source| Error::Codec {
        path: path.to_path_buf(),
        source,
    })
}
