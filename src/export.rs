//! Exporting a finished buffer as a PNG without ever leaving a broken
//! file behind.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use image::png::PNGEncoder;
use image::ColorType;

use cancel::CancelFlag;
use palette::Palette;
use pixels::PixelBuffer;

/// How an export ended when it did not fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The destination now holds the encoded image.
    Written,
    /// The cancel flag was observed first; nothing was left on disk.
    Cancelled,
}

/// An export failure, with the underlying cause attached.  By the time
/// the caller sees one of these, any partially-written staging file has
/// already been removed.
#[derive(Debug, Fail)]
#[fail(display = "exporting {}: {}", path, cause)]
pub struct ExportError {
    /// The destination the export was writing toward.
    pub path: String,
    /// The encoder or filesystem error underneath.
    #[cause]
    pub cause: io::Error,
}

/// Encodes the buffer as an RGB PNG at `destination`.
///
/// The encode goes to a staging file next to the destination, which is
/// renamed into place only after a successful encode.  The destination
/// is therefore never truncated: after this returns it is either
/// absent, untouched prior content, or fully the new image.
///
/// The flag is the export's own token.  An export is an independent
/// cancellable operation; it never shares a render session's flag.
/// Cancellation observed before the rename removes the staging file and
/// reports `Cancelled`, which is an ordinary outcome, not an error.
pub fn export_png(
    buffer: &PixelBuffer,
    palette: &Palette,
    destination: &Path,
    cancel: &CancelFlag,
) -> Result<ExportOutcome, ExportError> {
    if cancel.is_cancelled() {
        return Ok(ExportOutcome::Cancelled);
    }

    let grid = buffer.grid();
    let mut rgb = Vec::with_capacity(grid.width * grid.height * 3);
    for value in buffer.values() {
        let (r, g, b) = palette.color_for(*value);
        rgb.push(r);
        rgb.push(g);
        rgb.push(b);
    }

    let staging = staging_path(destination);
    if let Err(cause) = encode_to(&staging, &rgb, grid.width as u32, grid.height as u32) {
        let _ = fs::remove_file(&staging);
        return Err(export_error(destination, cause));
    }

    if cancel.is_cancelled() {
        let _ = fs::remove_file(&staging);
        return Ok(ExportOutcome::Cancelled);
    }

    if let Err(cause) = fs::rename(&staging, destination) {
        let _ = fs::remove_file(&staging);
        return Err(export_error(destination, cause));
    }

    Ok(ExportOutcome::Written)
}

fn encode_to(staging: &Path, rgb: &[u8], width: u32, height: u32) -> io::Result<()> {
    let file = File::create(staging)?;
    PNGEncoder::new(file).encode(rgb, width, height, ColorType::RGB(8))
}

fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "export".into());
    name.push(".part");
    destination.with_file_name(name)
}

fn export_error(destination: &Path, cause: io::Error) -> ExportError {
    ExportError {
        path: destination.display().to_string(),
        cause,
    }
}

#[cfg(test)]
mod tests {
    extern crate tempfile;

    use super::*;
    use pixels::PixelBuffer;
    use planes::GridSize;
    use worker::ColumnResult;

    fn checkered_buffer() -> PixelBuffer {
        let mut buffer = PixelBuffer::new(GridSize {
            width: 4,
            height: 3,
        });
        for column in 0..4 {
            buffer.apply_column(&ColumnResult {
                column,
                row_origin: 0,
                values: vec![column as u32 * 40; 3],
            });
        }
        buffer
    }

    #[test]
    fn a_written_export_decodes_back_to_the_palette_colors() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("field.png");
        let palette = Palette::nice();

        let outcome = export_png(
            &checkered_buffer(),
            &palette,
            &destination,
            &CancelFlag::new(),
        )
        .unwrap();
        assert_eq!(outcome, ExportOutcome::Written);

        let decoded = ::image::open(&destination).unwrap().to_rgb();
        assert_eq!(decoded.dimensions(), (4, 3));
        let expected = palette.color_for(80);
        assert_eq!(
            decoded.get_pixel(2, 1).0,
            [expected.0, expected.1, expected.2]
        );

        // No staging leftovers.
        assert!(!dir.path().join("field.png.part").exists());
    }

    #[test]
    fn a_preset_flag_cancels_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("field.png");
        fs::write(&destination, b"previous export").unwrap();

        let flag = CancelFlag::new();
        flag.cancel();

        let outcome = export_png(
            &checkered_buffer(),
            &Palette::nice(),
            &destination,
            &flag,
        )
        .unwrap();
        assert_eq!(outcome, ExportOutcome::Cancelled);
        assert_eq!(fs::read(&destination).unwrap(), b"previous export");
        assert!(!dir.path().join("field.png.part").exists());
    }

    #[test]
    fn a_failed_export_leaves_an_existing_destination_intact() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("field.png");
        fs::write(&destination, b"previous export").unwrap();

        // A directory squatting on the staging path makes the encode's
        // file creation fail partway into the flow.
        fs::create_dir(dir.path().join("field.png.part")).unwrap();

        let result = export_png(
            &checkered_buffer(),
            &Palette::nice(),
            &destination,
            &CancelFlag::new(),
        );
        assert!(result.is_err());
        assert_eq!(fs::read(&destination).unwrap(), b"previous export");
    }

    #[test]
    fn a_failed_export_to_a_missing_directory_reports_the_cause() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nowhere").join("field.png");

        let err = export_png(
            &checkered_buffer(),
            &Palette::nice(),
            &destination,
            &CancelFlag::new(),
        )
        .unwrap_err();
        assert!(err.path.contains("field.png"));
        assert!(!destination.exists());
    }
}
