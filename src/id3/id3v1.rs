use std::io::{Read, Seek, SeekFrom};

use crate::common::error::Result;
use crate::id3::specs::{self, Encoding, GENRES};

/// Size of the ID3v1 trailer.
pub const TAG_SIZE: usize = 128;

const TITLE: std::ops::Range<usize> = 3..33;
const ARTIST: std::ops::Range<usize> = 33..63;
const ALBUM: std::ops::Range<usize> = 63..93;
const YEAR: std::ops::Range<usize> = 93..97;
const COMMENT: std::ops::Range<usize> = 97..127;
const COMMENT_V11: std::ops::Range<usize> = 97..125;
const GENRE: usize = 127;

/// Genre byte for "no genre".
pub const NO_GENRE: u8 = 255;

/// The 128-byte ID3v1 / ID3v1.1 trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v1Tag {
    title: String,
    artist: String,
    album: String,
    year: String,
    comment: String,
    /// ID3v1.1 track number
    track: Option<u8>,
    genre: u8,
    dirty: bool,
}

impl Default for Id3v1Tag {
    fn default() -> Self {
        Self::new()
    }
}

impl Id3v1Tag {
    pub fn new() -> Self {
        Id3v1Tag {
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            year: String::new(),
            comment: String::new(),
            track: None,
            genre: NO_GENRE,
            dirty: false,
        }
    }

    /// Parse a 128-byte trailer. Returns `None` without the "TAG" marker.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() != TAG_SIZE || &data[0..3] != b"TAG" {
            return None;
        }

        // v1.1 stores the track in the last two comment bytes
        let track = (data[125] == 0 && data[126] != 0).then_some(data[126]);
        let comment = if track.is_some() {
            &data[COMMENT_V11]
        } else {
            &data[COMMENT]
        };

        Some(Id3v1Tag {
            title: decode_v1_string(&data[TITLE]),
            artist: decode_v1_string(&data[ARTIST]),
            album: decode_v1_string(&data[ALBUM]),
            year: decode_v1_string(&data[YEAR]),
            comment: decode_v1_string(comment),
            track,
            genre: data[GENRE],
            dirty: false,
        })
    }

    /// Read the trailer from the last 128 bytes of `reader`.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Option<Self>> {
        let len = reader.seek(SeekFrom::End(0))?;
        if len < TAG_SIZE as u64 {
            return Ok(None);
        }

        reader.seek(SeekFrom::Start(len - TAG_SIZE as u64))?;
        let mut data = [0u8; TAG_SIZE];
        reader.read_exact(&mut data)?;

        let tag = Self::parse(&data);
        if tag.is_none() {
            log::debug!("No ID3v1 tag found");
        }
        Ok(tag)
    }

    pub fn title(&self) -> String {
        self.title.clone()
    }

    pub fn artist(&self) -> String {
        self.artist.clone()
    }

    pub fn album(&self) -> String {
        self.album.clone()
    }

    pub fn year(&self) -> String {
        self.year.clone()
    }

    /// Genre name, empty for an unknown genre byte.
    pub fn genre(&self) -> String {
        GENRES
            .get(usize::from(self.genre))
            .map_or_else(String::new, |g| (*g).to_owned())
    }

    pub fn genre_index(&self) -> u8 {
        self.genre
    }

    /// ID3v1 has no length field.
    pub fn length(&self) -> i32 {
        -1
    }

    pub fn comments(&self) -> Vec<String> {
        if self.comment.is_empty() {
            Vec::new()
        } else {
            vec![self.comment.clone()]
        }
    }

    pub fn track(&self) -> Option<u8> {
        self.track
    }

    pub fn set_title(&mut self, text: &str) -> Result<()> {
        self.title = fit_field(text, TITLE.len())?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_artist(&mut self, text: &str) -> Result<()> {
        self.artist = fit_field(text, ARTIST.len())?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_album(&mut self, text: &str) -> Result<()> {
        self.album = fit_field(text, ALBUM.len())?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_year(&mut self, text: &str) -> Result<()> {
        self.year = fit_field(text, YEAR.len())?;
        self.dirty = true;
        Ok(())
    }

    /// Set the genre by name or number; unknown genres clear it.
    pub fn set_genre(&mut self, text: &str) -> Result<()> {
        self.genre = specs::genre_index(text).unwrap_or(NO_GENRE);
        self.dirty = true;
        Ok(())
    }

    /// Ignored, ID3v1 has no length field.
    pub fn set_length(&mut self, _length: i32) -> Result<()> {
        Ok(())
    }

    pub fn set_comment(&mut self, text: &str) -> Result<()> {
        let len = if self.track.is_some() {
            COMMENT_V11.len()
        } else {
            COMMENT.len()
        };
        self.comment = fit_field(text, len)?;
        self.dirty = true;
        Ok(())
    }

    /// Set the track number, switching to ID3v1.1. `None` or 0 switches back to ID3v1.0.
    pub fn set_track(&mut self, track: Option<u8>) {
        self.track = track.filter(|&t| t != 0);
        if self.track.is_some() {
            self.comment = self.comment.chars().take(COMMENT_V11.len()).collect();
        }
        self.dirty = true;
    }

    /// Serialize to the 128-byte trailer.
    pub fn bytes(&self) -> Vec<u8> {
        let mut tag = vec![0u8; TAG_SIZE];
        tag[0..3].copy_from_slice(b"TAG");
        write_v1_string(&mut tag[TITLE], &self.title);
        write_v1_string(&mut tag[ARTIST], &self.artist);
        write_v1_string(&mut tag[ALBUM], &self.album);
        write_v1_string(&mut tag[YEAR], &self.year);
        match self.track {
            Some(track) => {
                write_v1_string(&mut tag[COMMENT_V11], &self.comment);
                tag[126] = track;
            }
            None => write_v1_string(&mut tag[COMMENT], &self.comment),
        }
        tag[GENRE] = self.genre;
        tag
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_committed(&mut self) {
        self.dirty = false;
    }

    pub fn size(&self) -> usize {
        TAG_SIZE
    }

    /// "1.1" when a track number is present, "1.0" otherwise.
    pub fn version(&self) -> String {
        if self.track.is_some() { "1.1" } else { "1.0" }.to_owned()
    }
}

/// Decode an ID3v1 fixed-length string, trimming nulls and trailing spaces.
fn decode_v1_string(data: &[u8]) -> String {
    let end = memchr::memchr(0, data).unwrap_or(data.len());
    let s: String = data[..end].iter().map(|&b| char::from(b)).collect();
    s.trim_end().to_owned()
}

/// Check `text` is Latin-1 and cut it to the field width.
fn fit_field(text: &str, len: usize) -> Result<String> {
    Encoding::Latin1.encode(text)?;
    Ok(text.chars().take(len).collect())
}

fn write_v1_string(dest: &mut [u8], text: &str) {
    for (slot, c) in dest.iter_mut().zip(text.chars()) {
        *slot = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(track: Option<u8>) -> Vec<u8> {
        let mut data = vec![0u8; TAG_SIZE];
        data[0..3].copy_from_slice(b"TAG");
        data[3..8].copy_from_slice(b"Title");
        data[33..39].copy_from_slice(b"Artist");
        data[63..68].copy_from_slice(b"Album");
        data[93..97].copy_from_slice(b"1999");
        data[97..104].copy_from_slice(b"Comment");
        if let Some(track) = track {
            data[126] = track;
        }
        data[127] = 17;
        data
    }

    #[test_log::test]
    fn parse_v10() {
        let tag = Id3v1Tag::parse(&sample(None)).unwrap();
        assert_eq!(tag.title(), "Title");
        assert_eq!(tag.artist(), "Artist");
        assert_eq!(tag.album(), "Album");
        assert_eq!(tag.year(), "1999");
        assert_eq!(tag.genre(), "Rock");
        assert_eq!(tag.comments(), vec!["Comment"]);
        assert_eq!(tag.length(), -1);
        assert_eq!(tag.track(), None);
        assert_eq!(tag.version(), "1.0");
        assert!(!tag.dirty());
    }

    #[test_log::test]
    fn parse_v11() {
        let tag = Id3v1Tag::parse(&sample(Some(7))).unwrap();
        assert_eq!(tag.track(), Some(7));
        assert_eq!(tag.version(), "1.1");
        assert_eq!(tag.comments(), vec!["Comment"]);
    }

    #[test_log::test]
    fn bytes_round_trip() {
        for data in [sample(None), sample(Some(3))] {
            assert_eq!(Id3v1Tag::parse(&data).unwrap().bytes(), data);
        }
    }

    #[test_log::test]
    fn trims_spaces() {
        let mut data = sample(None);
        data[8..33].fill(b' ');
        assert_eq!(Id3v1Tag::parse(&data).unwrap().title(), "Title");
    }

    #[test_log::test]
    fn not_a_tag() {
        assert!(Id3v1Tag::parse(&[0u8; TAG_SIZE]).is_none());
        assert!(Id3v1Tag::parse(b"TAG").is_none());
    }

    #[test_log::test]
    fn setters() {
        let mut tag = Id3v1Tag::parse(&sample(None)).unwrap();
        tag.set_title(&"x".repeat(40)).unwrap();
        tag.set_genre("Jazz").unwrap();
        tag.set_track(Some(2));
        assert!(tag.dirty());
        assert_eq!(tag.title().len(), 30);
        assert_eq!(tag.genre(), "Jazz");
        assert_eq!(tag.version(), "1.1");

        assert!(tag.set_artist("\u{65e5}\u{672c}").is_err());
        assert_eq!(tag.artist(), "Artist");

        let again = Id3v1Tag::parse(&tag.bytes()).unwrap();
        assert_eq!(again.title(), tag.title());
        assert_eq!(again.track(), Some(2));
        assert_eq!(again.genre_index(), 8);
    }

    #[test_log::test]
    fn unknown_genre() {
        let mut tag = Id3v1Tag::new();
        tag.set_genre("Not a genre").unwrap();
        assert_eq!(tag.genre_index(), NO_GENRE);
        assert_eq!(tag.genre(), "");
    }

    #[test_log::test]
    fn read_from_stream() {
        let mut data = vec![0xFFu8; 300];
        data.extend(sample(None));
        let tag = Id3v1Tag::read_from(&mut Cursor::new(data)).unwrap();
        assert_eq!(tag.unwrap().title(), "Title");

        let tag = Id3v1Tag::read_from(&mut Cursor::new(vec![0u8; 64])).unwrap();
        assert!(tag.is_none());
    }
}
