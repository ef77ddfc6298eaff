//! Commit engine: writes an edited tag back into its storage.
//!
//! ID3v2 tags live at the start of the stream. A tag that grew past its
//! on-disk footprint moves everything after it forward; a tag that shrank
//! is padded back to its footprint, so data never moves backward. ID3v1
//! trailers are overwritten in place at the end of the stream.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::common::error::Result;
use crate::common::util;
use crate::config::WriteOptions;
use crate::id3::id3v1::{Id3v1Tag, TAG_SIZE};
use crate::id3::tags::Id3v2Tag;
use crate::id3::Tagger;

/// Full on-disk image of a tag: header, frames, padding and optional footer.
pub fn render_tag(tag: &Id3v2Tag) -> Vec<u8> {
    let mut data = tag.bytes();
    data.resize(data.len() + tag.padding() as usize, 0);
    if tag.header().flags.footer {
        data.extend_from_slice(&tag.header().footer_bytes());
    }
    data
}

/// Validate and size the tag for writing.
/// Returns the rendered tag, the number of bytes to insert and where.
///
/// A truncated tag claims more bytes than the stream holds, so its footprint
/// is clamped to `stream_len`.
fn prepare_v2(tag: &mut Id3v2Tag, stream_len: u64) -> Result<(Vec<u8>, u64, u64)> {
    tag.check_sizes()?;

    let original = tag.original_size().unwrap_or(0).min(stream_len);
    let overhead = tag.header().full_size() - u64::from(tag.size());
    if original > overhead && tag.header().full_size() < original {
        tag.pad_to((original - overhead) as u32);
    }

    let data = render_tag(tag);
    let grow = (data.len() as u64).saturating_sub(original);
    log::debug!(
        "Writing ID3v{} tag: {} bytes over {} on disk, inserting {}",
        tag.version(),
        data.len(),
        original,
        grow
    );
    Ok((data, grow, original))
}

/// Commit a tag into a seekable stream.
pub fn write_tag_to_file<F>(file: &mut F, tagger: &mut Tagger, options: WriteOptions) -> Result<()>
where
    F: Read + Write + Seek,
{
    match tagger {
        Tagger::V2(tag) => {
            let len = file.seek(SeekFrom::End(0))?;
            let (data, grow, original) = prepare_v2(tag, len)?;
            util::insert_bytes(file, grow, original, options.chunk_size)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&data)?;
            file.flush()?;
            tag.mark_committed();
        }
        Tagger::V1(tag) => {
            let offset = v1_offset(file)?;
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&tag.bytes())?;
            file.flush()?;
            tag.mark_committed();
        }
    }
    Ok(())
}

/// Offset of the existing ID3v1 trailer, or the end of the stream.
fn v1_offset<F: Read + Seek>(file: &mut F) -> Result<u64> {
    let len = file.seek(SeekFrom::End(0))?;
    if len < TAG_SIZE as u64 {
        return Ok(len);
    }

    let start = len - TAG_SIZE as u64;
    file.seek(SeekFrom::Start(start))?;
    let mut marker = [0u8; 3];
    file.read_exact(&mut marker)?;
    Ok(if &marker == b"TAG" { start } else { len })
}

/// Commit a tag into an in-memory buffer, returning the updated buffer.
pub fn write_tag_to_bytes(blob: &[u8], tagger: &mut Tagger) -> Result<Vec<u8>> {
    match tagger {
        Tagger::V2(tag) => {
            let (data, grow, original) = prepare_v2(tag, blob.len() as u64)?;
            let mut out = if grow > 0 {
                util::insert_bytes_in_mem(blob, grow as usize, original as usize)?
            } else {
                blob.to_vec()
            };
            if out.len() < data.len() {
                out.resize(data.len(), 0);
            }
            out[..data.len()].copy_from_slice(&data);
            tag.mark_committed();
            Ok(out)
        }
        Tagger::V1(tag) => {
            let out = write_v1_to_bytes(blob, tag);
            tag.mark_committed();
            Ok(out)
        }
    }
}

fn write_v1_to_bytes(blob: &[u8], tag: &Id3v1Tag) -> Vec<u8> {
    let has_trailer = blob.len() >= TAG_SIZE && &blob[blob.len() - TAG_SIZE..][..3] == b"TAG";
    let keep = if has_trailer {
        blob.len() - TAG_SIZE
    } else {
        blob.len()
    };

    let mut out = Vec::with_capacity(keep + TAG_SIZE);
    out.extend_from_slice(&blob[..keep]);
    out.extend_from_slice(&tag.bytes());
    out
}
