//! Writing rendered images to disk.

use anyhow::{Context, Result};
use glint_renderer::ImageBuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Image container picked from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text PPM (`P3`).
    Ppm,
    /// Anything else the `image` crate can encode from the extension.
    Encoded,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ppm") => Self::Ppm,
            _ => Self::Encoded,
        }
    }
}

/// Save `image` to `path`, gamma corrected.
pub fn save_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    match OutputFormat::from_path(path) {
        OutputFormat::Ppm => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_ppm(image, &mut writer).with_context(|| format!("writing {}", path.display()))?;
            writer.flush()?;
        }
        OutputFormat::Encoded => {
            let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
                .context("pixel buffer does not match image dimensions")?;
            rgb.save(path).with_context(|| format!("encoding {}", path.display()))?;
        }
    }

    log::info!("Saved {}", path.display());
    Ok(())
}

/// Write `image` as an ASCII PPM, top row first.
pub fn write_ppm(image: &ImageBuffer, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for pixel in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", pixel[0], pixel[1], pixel[2])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::Color;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.ppm")), OutputFormat::Ppm);
        assert_eq!(OutputFormat::from_path(Path::new("OUT.PPM")), OutputFormat::Ppm);
        assert_eq!(OutputFormat::from_path(Path::new("out.png")), OutputFormat::Encoded);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Encoded);
    }

    #[test]
    fn test_write_ppm() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Color::ONE);
        image.set(1, 0, Color::ZERO);

        let mut bytes = Vec::new();
        write_ppm(&image, &mut bytes).expect("writes to memory");
        let text = String::from_utf8(bytes).expect("ascii output");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["P3", "2 1", "255", "255 255 255", "0 0 0"]);
    }
}
