use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::common::error::{Id3Error, Result};
use crate::config::ParseOptions;
use crate::id3::frame_types::{CommonField, FrameLayout};
use crate::id3::frames::{self, Frame, FrameHead, TextFrame};
use crate::id3::header::{BitPaddedInt, ID3Header, HEADER_SIZE};
use crate::id3::specs::Encoding;

/// Upper bound on the buffer reserved before a tag body is read.
const INITIAL_BODY_CAPACITY: usize = 64 * 1024;

/// An ID3v2 tag: header, ordered frames and padding.
///
/// `size` follows the header's declared size (everything after the 10-byte
/// header, padding included). Mutations go through [`Id3v2Tag::change_size`]
/// so the declared size never drops below what is on disk.
#[derive(Debug, Clone)]
pub struct Id3v2Tag {
    header: ID3Header,
    extended_header: Vec<u8>,
    frames: Vec<Frame>,
    padding: u32,
    layout: FrameLayout,
    dirty: bool,
    /// Footprint (header, body and footer) of the tag as parsed, `None` for a fresh tag.
    original_size: Option<u64>,
}

impl Id3v2Tag {
    /// A fresh, empty tag for the given major version.
    pub fn new(version: u8) -> Self {
        Id3v2Tag {
            header: ID3Header::new(version),
            extended_header: Vec::new(),
            frames: Vec::with_capacity(8),
            padding: 0,
            layout: FrameLayout::for_version(version),
            dirty: false,
            original_size: None,
        }
    }

    /// Parse a tag from the start of `reader`.
    ///
    /// Returns `Ok(None)` when there is no usable ID3v2 header. Only I/O
    /// failures other than a short read are errors.
    pub fn parse<R: Read>(reader: &mut R, options: ParseOptions) -> Result<Option<Self>> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        if let Err(e) = reader.read_exact(&mut header_bytes) {
            return match e.kind() {
                std::io::ErrorKind::UnexpectedEof => Ok(None),
                _ => Err(e.into()),
            };
        }

        let header = match ID3Header::parse(&header_bytes) {
            Ok(Some(header)) => header,
            Ok(None) => {
                log::debug!("No ID3v2 header found");
                return Ok(None);
            }
            Err(e) => {
                log::warn!("Invalid ID3v2 header size: {}", e);
                return Ok(None);
            }
        };

        if header.size > options.max_tag_size {
            log::debug!(
                "ID3v2 tag declares {} bytes, above the limit of {}",
                header.size,
                options.max_tag_size
            );
            return Ok(None);
        }

        // The declared size is untrusted until the bytes are actually read
        let mut body = Vec::with_capacity((header.size as usize).min(INITIAL_BODY_CAPACITY));
        reader
            .by_ref()
            .take(u64::from(header.size))
            .read_to_end(&mut body)?;
        if body.len() < header.size as usize {
            log::debug!(
                "ID3v2 tag truncated, expected {} bytes, got {}",
                header.size,
                body.len()
            );
        }

        Ok(Some(Self::from_parts(header, &body)))
    }

    /// Parse a tag from the start of an in-memory buffer.
    pub fn from_bytes(data: &[u8], options: ParseOptions) -> Result<Option<Self>> {
        Self::parse(&mut &data[..], options)
    }

    fn from_parts(header: ID3Header, body: &[u8]) -> Self {
        let mut tag = Self::new(header.major());
        tag.original_size = Some(header.full_size());

        let ext_len = if header.flags.extended {
            extended_header_len(body, header.major())
        } else {
            0
        };
        tag.extended_header = body[..ext_len].to_vec();

        let used = tag.read_frames(&body[ext_len..]);

        let used = (ext_len + used) as u32;
        if used <= header.size {
            tag.padding = header.size - used;
        }
        tag.header = header;
        tag
    }

    /// Scan frames until padding, a malformed header or the end of the data.
    /// Returns the number of bytes consumed.
    fn read_frames(&mut self, data: &[u8]) -> usize {
        let layout = self.layout;
        let header_size = layout.frame_header_size();
        let mut offset = 0;

        while offset + header_size <= data.len() {
            let frame_header = &data[offset..offset + header_size];
            let id_bytes = &frame_header[..layout.id_len];

            if id_bytes.iter().all(|&b| b == 0) {
                log::debug!("Reached padding at offset {}", offset);
                break;
            }

            if !id_bytes.is_ascii() {
                log::warn!("Invalid frame id at offset {}", offset);
                break;
            }

            let size_bytes = &frame_header[layout.id_len..layout.id_len + layout.size_len];
            let size = match BitPaddedInt::decode(size_bytes, layout.size_bits) {
                Ok(size) => size as usize,
                Err(e) => {
                    log::warn!("Invalid frame size at offset {}: {}", offset, e);
                    break;
                }
            };

            let id: String = id_bytes.iter().map(|&b| char::from(b)).collect();
            let (status_flags, format_flags) = if layout.has_flags {
                (frame_header[header_size - 2], frame_header[header_size - 1])
            } else {
                (0, 0)
            };

            let start = offset + header_size;
            let Some(payload) = data.get(start..start + size) else {
                log::warn!(
                    "Frame {} truncated, {} bytes declared but {} available",
                    id,
                    size,
                    data.len() - start
                );
                break;
            };

            let frame_type = layout.frame_type_or_unknown(&id);
            let head = FrameHead::with_id(id, frame_type).with_flags(status_flags, format_flags);
            log::trace!("Parsed frame {} ({} bytes)", head.id, size);
            self.frames.push(frames::parse_frame(head, frame_type.kind, payload));

            offset = start + size;
        }

        offset
    }

    // ---- Frame access ----

    /// First frame with the given identifier.
    pub fn frame(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id() == id)
    }

    /// All frames with the given identifier, in tag order.
    pub fn frames(&self, id: &str) -> Vec<&Frame> {
        self.frames.iter().filter(|f| f.id() == id).collect()
    }

    pub fn all_frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Mutable handle on the first frame with the given identifier.
    pub fn frame_mut(&mut self, id: &str) -> Option<FrameMut<'_>> {
        let index = self.frames.iter().position(|f| f.id() == id)?;
        Some(FrameMut { tag: self, index })
    }

    /// Mutable handle on the frame at `index` in tag order.
    pub fn frame_mut_at(&mut self, index: usize) -> Option<FrameMut<'_>> {
        (index < self.frames.len()).then(|| FrameMut { tag: self, index })
    }

    /// Append frames, growing the tag by each frame's footprint.
    ///
    /// Frames whose identifier does not fit this version's frame header are
    /// rejected and nothing is added.
    pub fn add_frames<I>(&mut self, frames: I) -> Result<()>
    where
        I: IntoIterator<Item = Frame>,
    {
        let frames: Vec<Frame> = frames.into_iter().collect();
        if let Some(bad) = frames
            .iter()
            .find(|f| f.id().len() != self.layout.id_len || !f.id().is_ascii())
        {
            return Err(Id3Error::InvalidData(format!(
                "frame id {:?} is not valid for ID3v{}",
                bad.id(),
                self.version()
            )));
        }

        for frame in frames {
            self.change_size(self.footprint(&frame) as isize);
            self.frames.push(frame);
        }
        Ok(())
    }

    /// Remove every frame with the given identifier.
    pub fn delete_frames(&mut self, id: &str) -> Vec<Frame> {
        let (removed, kept): (Vec<Frame>, Vec<Frame>) = std::mem::take(&mut self.frames)
            .into_iter()
            .partition(|f| f.id() == id);
        self.frames = kept;

        if !removed.is_empty() {
            let freed: usize = removed.iter().map(|f| self.footprint(f)).sum();
            self.change_size(-(freed as isize));
        }
        removed
    }

    /// Remove the first frame equal to `frame`.
    pub fn delete_frame(&mut self, frame: &Frame) -> Option<Frame> {
        let index = self.frames.iter().position(|f| f == frame)?;
        let removed = self.frames.remove(index);
        self.change_size(-(self.footprint(&removed) as isize));
        Some(removed)
    }

    fn footprint(&self, frame: &Frame) -> usize {
        self.layout.frame_header_size() + frame.size()
    }

    /// Account for `delta` bytes of frame data.
    ///
    /// Growth is taken from padding first and only the remainder grows the
    /// declared size. Shrinking turns the freed bytes into padding.
    pub fn change_size(&mut self, delta: isize) {
        let remaining = i64::from(self.padding) - delta as i64;
        if remaining < 0 {
            self.padding = 0;
            self.header.size = self.header.size.saturating_add((-remaining) as u32);
        } else {
            self.padding = remaining as u32;
        }
        self.dirty = true;
    }

    // ---- Semantic fields ----

    /// Index of the first text-bearing frame for `field`.
    fn text_frame_index(&self, field: CommonField) -> Option<usize> {
        let id = self.layout.common_id(field);
        self.frames.iter().position(|f| f.id() == id && f.is_text())
    }

    fn text_frame_text(&self, field: CommonField) -> String {
        self.text_frame_index(field)
            .and_then(|index| self.frames[index].text())
            .map(|t| t.trim_end_matches('\0').to_owned())
            .unwrap_or_default()
    }

    /// Reuse the text frame the getter reads, else replace the first opaque
    /// frame with that id, else append a new one.
    fn set_text_frame_text(&mut self, field: CommonField, text: &str) -> Result<()> {
        if let Some(index) = self.text_frame_index(field) {
            let mut frame = FrameMut { tag: self, index };
            frame.set_encoding(Encoding::Utf8)?;
            return frame.set_text(text);
        }

        let frame = Frame::Text(TextFrame::new(
            self.layout.common_type(field),
            text,
            Encoding::Utf8,
        )?);
        let id = self.layout.common_id(field);
        match self.frames.iter().position(|f| f.id() == id) {
            Some(index) => {
                log::debug!("Replacing undecoded {} frame", id);
                let old = self.footprint(&self.frames[index]) as isize;
                let delta = self.footprint(&frame) as isize - old;
                self.frames[index] = frame;
                self.change_size(delta);
                Ok(())
            }
            None => self.add_frames([frame]),
        }
    }

    pub fn title(&self) -> String {
        self.text_frame_text(CommonField::Title)
    }

    pub fn artist(&self) -> String {
        self.text_frame_text(CommonField::Artist)
    }

    pub fn album(&self) -> String {
        self.text_frame_text(CommonField::Album)
    }

    pub fn year(&self) -> String {
        self.text_frame_text(CommonField::Year)
    }

    pub fn genre(&self) -> String {
        self.text_frame_text(CommonField::Genre)
    }

    /// Length in milliseconds, -1 when absent or not a number.
    pub fn length(&self) -> i32 {
        self.text_frame_text(CommonField::Length)
            .trim()
            .parse()
            .unwrap_or(-1)
    }

    /// Every comment frame rendered as `language\tdescription:\ntext`.
    pub fn comments(&self) -> Vec<String> {
        self.frames(self.layout.common_id(CommonField::Comments))
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn set_title(&mut self, text: &str) -> Result<()> {
        self.set_text_frame_text(CommonField::Title, text)
    }

    pub fn set_artist(&mut self, text: &str) -> Result<()> {
        self.set_text_frame_text(CommonField::Artist, text)
    }

    pub fn set_album(&mut self, text: &str) -> Result<()> {
        self.set_text_frame_text(CommonField::Album, text)
    }

    pub fn set_year(&mut self, text: &str) -> Result<()> {
        self.set_text_frame_text(CommonField::Year, text)
    }

    pub fn set_genre(&mut self, text: &str) -> Result<()> {
        self.set_text_frame_text(CommonField::Genre, text)
    }

    pub fn set_length(&mut self, length: i32) -> Result<()> {
        self.set_text_frame_text(CommonField::Length, &length.to_string())
    }

    // ---- Serialization ----

    /// Header, extended header and frames. Padding is not included.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.header.size as usize);
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.extended_header);
        for frame in &self.frames {
            self.write_frame(frame, &mut out);
        }
        out
    }

    fn write_frame(&self, frame: &Frame, out: &mut Vec<u8>) {
        let layout = &self.layout;
        let payload = frame.payload();

        out.extend_from_slice(frame.id().as_bytes());
        let size = BitPaddedInt::encode(payload.len() as u32, layout.size_bits);
        out.extend_from_slice(&size[size.len() - layout.size_len..]);
        if layout.has_flags {
            out.push(frame.status_flags());
            out.push(frame.format_flags());
        }
        out.extend_from_slice(&payload);
    }

    /// Check that every size fits its field before the tag is written.
    pub(crate) fn check_sizes(&self) -> Result<()> {
        if !self.layout.is_supported() {
            return Err(Id3Error::UnsupportedVersion(self.version()));
        }
        if u64::from(self.header.size) > BitPaddedInt::max_value(BitPaddedInt::SYNCHSAFE_BITS, 4) {
            return Err(Id3Error::TagTooLarge(u64::from(self.header.size)));
        }
        let max_frame = self.layout.max_frame_size();
        if let Some(frame) = self.frames.iter().find(|f| f.size() as u64 > max_frame) {
            return Err(Id3Error::TagTooLarge(frame.size() as u64));
        }
        Ok(())
    }

    /// Grow the declared size through padding so the tag covers at least `size` body bytes.
    pub(crate) fn pad_to(&mut self, size: u32) {
        if self.header.size < size {
            let gap = size - self.header.size;
            self.header.size = size;
            self.padding += gap;
        }
    }

    pub(crate) fn mark_committed(&mut self) {
        self.original_size = Some(self.header.full_size());
        self.dirty = false;
    }

    // ---- Introspection ----

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Zero bytes reserved after the frames.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Declared tag size, excluding the 10-byte header.
    pub fn size(&self) -> u32 {
        self.header.size
    }

    /// Declared size without padding.
    pub fn real_size(&self) -> u32 {
        self.header.size - self.padding
    }

    /// Version string, e.g. "2.3.0".
    pub fn version(&self) -> String {
        self.header.to_string()
    }

    pub fn major_version(&self) -> u8 {
        self.header.major()
    }

    pub fn header(&self) -> &ID3Header {
        &self.header
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn extended_header(&self) -> &[u8] {
        &self.extended_header
    }

    /// On-disk footprint recorded at parse time, `None` for a fresh tag.
    pub fn original_size(&self) -> Option<u64> {
        self.original_size
    }
}

/// Length of the extended header at the start of `body`, clamped to the body.
fn extended_header_len(body: &[u8], major: u8) -> usize {
    if body.len() < 4 {
        return body.len();
    }
    let len = match major {
        // v2.4 counts the size field itself, synch-safe
        4 => match BitPaddedInt::syncsafe(&body[..4]) {
            Ok(size) => size as usize,
            Err(e) => {
                log::warn!("Invalid extended header size: {}", e);
                4
            }
        },
        _ => 4 + BigEndian::read_u32(&body[..4]) as usize,
    };
    len.min(body.len())
}

/// Mutable handle on a frame that keeps the owning tag's size in step.
pub struct FrameMut<'a> {
    tag: &'a mut Id3v2Tag,
    index: usize,
}

impl FrameMut<'_> {
    pub fn frame(&self) -> &Frame {
        &self.tag.frames[self.index]
    }

    /// Replace the frame's text. The frame and tag are unchanged on error.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let delta = self.tag.frames[self.index].set_text(text)?;
        self.tag.change_size(delta);
        Ok(())
    }

    /// Re-encode the frame's strings.
    pub fn set_encoding(&mut self, encoding: Encoding) -> Result<()> {
        let delta = self.tag.frames[self.index].set_encoding(encoding)?;
        self.tag.change_size(delta);
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> Result<()> {
        let delta = self.tag.frames[self.index].set_description(description)?;
        self.tag.change_size(delta);
        Ok(())
    }
}
