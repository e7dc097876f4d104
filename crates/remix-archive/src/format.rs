use std::io::{self, Read, Seek};

/// Check the leading magic bytes for a zip container.
pub fn is_zip(data: &[u8]) -> bool {
    matches!(data, [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..])
}

/// Peek the header of `reader` and rewind it.
///
/// Short inputs are reported as not-a-zip rather than as an error.
pub fn detect_zip<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    reader.rewind()?;
    Ok(is_zip(&header[..filled]))
}
