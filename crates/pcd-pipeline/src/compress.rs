//! Brotli variants of the artifacts, served with `Content-Encoding: br`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use brotli::enc::BrotliEncoderParams;

use crate::error::PipelineResult;
use crate::layout::ReleasePaths;

/// Maximum brotli quality.
pub const QUALITY: i32 = 11;

/// Largest standard window (2^22 bytes).
pub const WINDOW_BITS: i32 = 22;

fn encoder_params() -> BrotliEncoderParams {
    let mut params = BrotliEncoderParams::default();
    params.quality = QUALITY;
    params.lgwin = WINDOW_BITS;
    params
}

/// Compresses `source` into `target`, returning the compressed size.
pub fn compress_file(source: &Path, target: &Path) -> PipelineResult<u64> {
    let partial = target.with_extension("br.partial");
    let mut reader = BufReader::new(File::open(source)?);
    {
        let mut writer = BufWriter::new(File::create(&partial)?);
        brotli::BrotliCompress(&mut reader, &mut writer, &encoder_params())?;
        writer.flush()?;
    }
    fs::rename(&partial, target)?;
    Ok(fs::metadata(target)?.len())
}

/// Compresses both artifacts of a release.
///
/// Returns `false` without doing anything when both `.br` files exist.
pub fn compress_artifacts(paths: &ReleasePaths) -> PipelineResult<bool> {
    if paths.compressed_artifacts_exist() {
        return Ok(false);
    }
    compress_file(&paths.definitions_json, &paths.definitions_br)?;
    compress_file(&paths.refsets_json, &paths.refsets_br)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FilesLayout;
    use std::io::Read;

    fn decompress(path: &Path) -> String {
        let mut out = String::new();
        brotli::Decompressor::new(File::open(path).unwrap(), 4096)
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_compress_file_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("pcd-defs.json");
        let target = dir.path().join("pcd-defs.json.br");
        let body = "{\"22\": {\"t\": \"Aspirin\", \"e\": \"20200101\"}}\n".repeat(200);
        fs::write(&source, &body).unwrap();

        let size = compress_file(&source, &target).unwrap();

        assert!(size < body.len() as u64);
        assert_eq!(decompress(&target), body);
    }

    #[test]
    fn test_compress_artifacts_skips_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let paths = FilesLayout::new(dir.path()).release("r1");
        fs::create_dir_all(&paths.processed_dir).unwrap();
        fs::write(&paths.definitions_json, "{}").unwrap();
        fs::write(&paths.refsets_json, "{}").unwrap();

        assert!(compress_artifacts(&paths).unwrap());
        assert_eq!(decompress(&paths.refsets_br), "{}");

        fs::write(&paths.definitions_json, "{\"changed\": true}").unwrap();
        assert!(!compress_artifacts(&paths).unwrap());
        assert_eq!(decompress(&paths.definitions_br), "{}");
    }
}
