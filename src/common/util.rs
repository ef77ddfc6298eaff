use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::error::{Id3Error, Result};

/// Insert `size` zero bytes at `offset` in the stream, shifting existing data forward.
///
/// Trailing data is moved in chunks of at most `chunk_size` bytes, starting from
/// the end of the stream, so a chunk is never overwritten before it has been read.
/// The operation is not atomic: an IO error part way through leaves the stream
/// in an indeterminate state.
pub fn insert_bytes<F>(fobj: &mut F, size: u64, offset: u64, chunk_size: usize) -> Result<()>
where
    F: Read + Write + Seek,
{
    if size == 0 {
        return Ok(());
    }

    let file_len = fobj.seek(SeekFrom::End(0))?;
    if offset > file_len {
        return Err(Id3Error::InvalidData("offset beyond end of file".into()));
    }

    let chunk_size = chunk_size.max(1);
    let mut buf = vec![0u8; chunk_size];

    let mut end = file_len;
    while end > offset {
        let len = (end - offset).min(chunk_size as u64) as usize;
        let start = end - len as u64;

        fobj.seek(SeekFrom::Start(start))?;
        fobj.read_exact(&mut buf[..len])?;
        fobj.seek(SeekFrom::Start(start + size))?;
        fobj.write_all(&buf[..len])?;

        log::trace!("Moved {} bytes from {} to {}", len, start, start + size);
        end = start;
    }

    // Zero the opened gap
    buf.fill(0);
    fobj.seek(SeekFrom::Start(offset))?;
    let mut remaining = size;
    while remaining > 0 {
        let len = remaining.min(chunk_size as u64) as usize;
        fobj.write_all(&buf[..len])?;
        remaining -= len as u64;
    }
    fobj.flush()?;

    Ok(())
}

/// Insert `size` zero bytes at `offset` in an in-memory buffer.
///
/// Returns a new buffer holding the prefix, the gap, then the suffix.
pub fn insert_bytes_in_mem(blob: &[u8], size: usize, offset: usize) -> Result<Vec<u8>> {
    if offset > blob.len() {
        return Err(Id3Error::InvalidData("offset beyond end of buffer".into()));
    }

    let mut out = vec![0u8; blob.len() + size];
    out[..offset].copy_from_slice(&blob[..offset]);
    out[offset + size..].copy_from_slice(&blob[offset..]);
    Ok(out)
}

/// Open a file for read/write access.
pub fn open_rw(path: impl AsRef<Path>) -> Result<File> {
    Ok(OpenOptions::new().read(true).write(true).open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test_log::test]
    fn insert_shifts_across_chunks() {
        let original: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut cursor = Cursor::new(original.clone());

        insert_bytes(&mut cursor, 7, 10, 64).unwrap();

        let out = cursor.into_inner();
        assert_eq!(out.len(), 1007);
        assert_eq!(&out[..10], &original[..10]);
        assert!(out[10..17].iter().all(|&b| b == 0));
        assert_eq!(&out[17..], &original[10..]);
    }

    #[test_log::test]
    fn insert_larger_than_chunk() {
        let original = b"abcdefghij".to_vec();
        let mut cursor = Cursor::new(original);

        insert_bytes(&mut cursor, 25, 3, 4).unwrap();

        let out = cursor.into_inner();
        assert_eq!(&out[..3], b"abc");
        assert!(out[3..28].iter().all(|&b| b == 0));
        assert_eq!(&out[28..], b"defghij");
    }

    #[test_log::test]
    fn insert_at_end_extends() {
        let mut cursor = Cursor::new(b"xyz".to_vec());
        insert_bytes(&mut cursor, 2, 3, 16).unwrap();
        assert_eq!(cursor.into_inner(), b"xyz\0\0");
    }

    #[test_log::test]
    fn insert_past_end_fails() {
        let mut cursor = Cursor::new(b"xyz".to_vec());
        assert!(insert_bytes(&mut cursor, 2, 4, 16).is_err());
        assert!(insert_bytes_in_mem(b"xyz", 2, 4).is_err());
    }

    #[test_log::test]
    fn insert_in_mem() {
        let out = insert_bytes_in_mem(b"headbody", 3, 4).unwrap();
        assert_eq!(out, b"head\0\0\0body");
    }
}
