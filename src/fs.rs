//! Whole-file helpers around [`Codec`].
//!
//! Output files are only written once the complete result is in memory, so a
//! failed run never leaves a partial file behind.

use log::info;
use std::fs;
use std::path::Path;

use crate::codec::Codec;
use crate::error::Result;

pub fn read_all_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(fs::read(path)?)
}

pub fn write_all_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    Ok(fs::write(path, bytes)?)
}

/// Compresses `src` into `dst`, returning the compressed size.
pub fn compress_file(codec: &Codec, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<usize> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let input = read_all_bytes(src)?;
    let out = codec.compress(&input)?;
    write_all_bytes(dst, &out)?;

    info!(
        "compressed {} ({} bytes) into {} ({} bytes)",
        src.display(),
        input.len(),
        dst.display(),
        out.len()
    );
    Ok(out.len())
}

/// Decompresses `src` into `dst`, returning the decompressed size.
pub fn decompress_file(
    codec: &Codec,
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
) -> Result<usize> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let input = read_all_bytes(src)?;
    let out = codec.decompress(&input)?;
    write_all_bytes(dst, &out)?;

    info!(
        "decompressed {} ({} bytes) into {} ({} bytes)",
        src.display(),
        input.len(),
        dst.display(),
        out.len()
    );
    Ok(out.len())
}
