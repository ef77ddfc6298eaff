pub mod header;
pub mod specs;
pub mod frame_types;
pub mod frames;
pub mod tags;
pub mod id3v1;
pub mod writer;
pub mod file;

use std::io::{Read, Seek, SeekFrom};

use crate::common::error::Result;
use crate::config::ParseOptions;
use crate::id3::frames::Frame;
use crate::id3::id3v1::Id3v1Tag;
use crate::id3::tags::Id3v2Tag;

/// The tag found in (or created for) a piece of storage.
///
/// Frame-level operations on an ID3v1 tag do nothing and return empty results.
#[derive(Debug, Clone)]
pub enum Tagger {
    V1(Id3v1Tag),
    V2(Id3v2Tag),
}

/// Locate a tag: ID3v2 at the start, then the ID3v1 trailer, else a fresh ID3v2 tag.
pub fn parse_tagger<R: Read + Seek>(reader: &mut R, options: ParseOptions) -> Result<Tagger> {
    reader.seek(SeekFrom::Start(0))?;
    if let Some(tag) = Id3v2Tag::parse(reader, options)? {
        return Ok(Tagger::V2(tag));
    }

    if options.read_id3v1 {
        if let Some(tag) = Id3v1Tag::read_from(reader)? {
            return Ok(Tagger::V1(tag));
        }
    }

    log::debug!("No tag found, creating ID3v2.{}", options.new_tag_version);
    Ok(Tagger::V2(Id3v2Tag::new(options.new_tag_version)))
}

macro_rules! dispatch {
    ($self:ident, $tag:ident => $body:expr) => {
        match $self {
            Tagger::V1($tag) => $body,
            Tagger::V2($tag) => $body,
        }
    };
}

impl Tagger {
    pub fn title(&self) -> String {
        dispatch!(self, tag => tag.title())
    }

    pub fn artist(&self) -> String {
        dispatch!(self, tag => tag.artist())
    }

    pub fn album(&self) -> String {
        dispatch!(self, tag => tag.album())
    }

    pub fn year(&self) -> String {
        dispatch!(self, tag => tag.year())
    }

    pub fn genre(&self) -> String {
        dispatch!(self, tag => tag.genre())
    }

    pub fn length(&self) -> i32 {
        dispatch!(self, tag => tag.length())
    }

    pub fn comments(&self) -> Vec<String> {
        dispatch!(self, tag => tag.comments())
    }

    pub fn set_title(&mut self, text: &str) -> Result<()> {
        dispatch!(self, tag => tag.set_title(text))
    }

    pub fn set_artist(&mut self, text: &str) -> Result<()> {
        dispatch!(self, tag => tag.set_artist(text))
    }

    pub fn set_album(&mut self, text: &str) -> Result<()> {
        dispatch!(self, tag => tag.set_album(text))
    }

    pub fn set_year(&mut self, text: &str) -> Result<()> {
        dispatch!(self, tag => tag.set_year(text))
    }

    pub fn set_genre(&mut self, text: &str) -> Result<()> {
        dispatch!(self, tag => tag.set_genre(text))
    }

    pub fn set_length(&mut self, length: i32) -> Result<()> {
        dispatch!(self, tag => tag.set_length(length))
    }

    pub fn frame(&self, id: &str) -> Option<&Frame> {
        match self {
            Tagger::V1(_) => None,
            Tagger::V2(tag) => tag.frame(id),
        }
    }

    pub fn frames(&self, id: &str) -> Vec<&Frame> {
        match self {
            Tagger::V1(_) => Vec::new(),
            Tagger::V2(tag) => tag.frames(id),
        }
    }

    pub fn all_frames(&self) -> &[Frame] {
        match self {
            Tagger::V1(_) => &[],
            Tagger::V2(tag) => tag.all_frames(),
        }
    }

    pub fn add_frames<I>(&mut self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Frame>,
    {
        match self {
            Tagger::V1(_) => Ok(()),
            Tagger::V2(tag) => tag.add_frames(frames),
        }
    }

    pub fn delete_frames(&mut self, id: &str) -> Vec<Frame> {
        match self {
            Tagger::V1(_) => Vec::new(),
            Tagger::V2(tag) => tag.delete_frames(id),
        }
    }

    pub fn delete_frame(&mut self, frame: &Frame) -> Option<Frame> {
        match self {
            Tagger::V1(_) => None,
            Tagger::V2(tag) => tag.delete_frame(frame),
        }
    }

    /// Serialized tag. ID3v2 output excludes padding.
    pub fn bytes(&self) -> Vec<u8> {
        dispatch!(self, tag => tag.bytes())
    }

    pub fn dirty(&self) -> bool {
        dispatch!(self, tag => tag.dirty())
    }

    pub fn padding(&self) -> u32 {
        match self {
            Tagger::V1(_) => 0,
            Tagger::V2(tag) => tag.padding(),
        }
    }

    /// Declared ID3v2 size (excluding the header), or 128 for ID3v1.
    pub fn size(&self) -> u32 {
        match self {
            Tagger::V1(tag) => tag.size() as u32,
            Tagger::V2(tag) => tag.size(),
        }
    }

    pub fn version(&self) -> String {
        dispatch!(self, tag => tag.version())
    }

    pub fn as_v2(&self) -> Option<&Id3v2Tag> {
        match self {
            Tagger::V2(tag) => Some(tag),
            Tagger::V1(_) => None,
        }
    }

    pub fn as_v2_mut(&mut self) -> Option<&mut Id3v2Tag> {
        match self {
            Tagger::V2(tag) => Some(tag),
            Tagger::V1(_) => None,
        }
    }

    pub fn as_v1(&self) -> Option<&Id3v1Tag> {
        match self {
            Tagger::V1(tag) => Some(tag),
            Tagger::V2(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::id3v1::TAG_SIZE;
    use std::io::Cursor;

    fn v1_trailer() -> Vec<u8> {
        let mut data = vec![0u8; TAG_SIZE];
        data[..3].copy_from_slice(b"TAG");
        data[3..9].copy_from_slice(b"Legacy");
        data
    }

    #[test_log::test]
    fn prefers_id3v2() {
        let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x0c".to_vec();
        data.extend_from_slice(b"TIT2\x00\x00\x00\x02\x00\x00\x03V");
        data.extend(v1_trailer());

        let tagger = parse_tagger(&mut Cursor::new(data), ParseOptions::new()).unwrap();
        assert_eq!(tagger.version(), "2.4.0");
        assert_eq!(tagger.title(), "V");
    }

    #[test_log::test]
    fn falls_back_to_id3v1() {
        let mut data = vec![0xFFu8; 64];
        data.extend(v1_trailer());

        let tagger = parse_tagger(&mut Cursor::new(data), ParseOptions::new()).unwrap();
        assert_eq!(tagger.version(), "1.0");
        assert_eq!(tagger.title(), "Legacy");
        assert!(tagger.all_frames().is_empty());
        assert_eq!(tagger.size(), 128);
    }

    #[test_log::test]
    fn creates_fresh_tag() {
        let mut data = vec![0xFFu8; 64];
        data.extend(v1_trailer());

        let options = ParseOptions::new().read_id3v1(false).new_tag_version(4);
        let tagger = parse_tagger(&mut Cursor::new(data), options).unwrap();
        assert_eq!(tagger.version(), "2.4.0");
        assert_eq!(tagger.size(), 0);
        assert!(!tagger.dirty());
        assert!(tagger.as_v2().unwrap().original_size().is_none());
    }

    #[test_log::test]
    fn v1_frame_operations_are_empty() {
        let mut tagger = Tagger::V1(Id3v1Tag::new());
        assert!(tagger.frame("TIT2").is_none());
        assert!(tagger.delete_frames("TIT2").is_empty());
        tagger.add_frames(Vec::new()).unwrap();
        assert!(!tagger.dirty());
        assert_eq!(tagger.padding(), 0);
    }
}
