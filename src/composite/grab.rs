//! Framebuffer dumps for offline inspection

use std::path::{Path, PathBuf};

use crate::core::types::Result;
use super::fragment::PixelBuffer;

/// `00042.png` style file name for a frame
pub fn dump_file_name(frame_id: u64) -> String {
    format!("{:05}.png", frame_id)
}

/// Write `pixels` as an 8-bit RGBA PNG, top row first
pub fn save_png(pixels: &PixelBuffer, path: &Path) -> Result<()> {
    let rgba = pixels.to_rgba8();
    let width = pixels.width as usize;
    let mut flipped: Vec<[u8; 4]> = Vec::with_capacity(rgba.len());
    if width > 0 {
        for row in rgba.chunks_exact(width).rev() {
            flipped.extend_from_slice(row);
        }
    }
    image::save_buffer(
        path,
        bytemuck::cast_slice(&flipped),
        pixels.width,
        pixels.height,
        image::ExtendedColorType::Rgba8,
    )?;
    log::info!("saved frame grab {}", path.display());
    Ok(())
}

/// Save into `dir` under the frame's dump name, returning the written path
pub fn dump_frame(pixels: &PixelBuffer, dir: &Path, frame_id: u64) -> Result<PathBuf> {
    let path = dir.join(dump_file_name(frame_id));
    save_png(pixels, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec4;

    #[test]
    fn test_dump_file_name() {
        assert_eq!(dump_file_name(0), "00000.png");
        assert_eq!(dump_file_name(42), "00042.png");
        assert_eq!(dump_file_name(123456), "123456.png");
    }

    #[test]
    fn test_dump_frame_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut pixels = PixelBuffer::new(3, 2);
        // bottom-left in framebuffer space
        pixels.set(0, 0, Vec4::new(1.0, 0.0, 0.0, 1.0));

        let path = dump_frame(&pixels, dir.path(), 7).unwrap();
        assert!(path.ends_with("00007.png"));

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 1).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
