//! Streaming LZMA codec over liblzma.

use std::io::{self, Read, Write};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Maximum effort; speed is secondary for the file sizes this tool targets.
const PRESET: u32 = 9;

/// Compress everything from `reader` into `writer` as an xz stream.
/// Returns the writer once the stream trailer has been written.
pub fn compress_stream<R: Read, W: Write>(reader: &mut R, writer: W) -> io::Result<W> {
    let mut encoder = XzEncoder::new(writer, PRESET);
    copy_stream(reader, &mut encoder)?;
    encoder.finish()
}

/// Decompress an xz stream from `reader` into `writer`.
pub fn decompress_stream<R: Read, W: Write>(reader: R, mut writer: W) -> io::Result<W> {
    let mut decoder = XzDecoder::new(reader);
    copy_stream(&mut decoder, &mut writer)?;
    Ok(writer)
}

// Fixed-size copy loop; peak memory stays flat regardless of file size.
fn copy_stream<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
) -> io::Result<u64> {
    let mut buf = vec![0u8; 1024 * 1024];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}
