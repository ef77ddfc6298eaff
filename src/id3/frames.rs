use std::fmt;

use crate::common::error::{Id3Error, Result};
use crate::id3::frame_types::{FrameKind, FrameType};
use crate::id3::specs::{self, Encoding};

/// Identifier, description and flag bytes shared by every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHead {
    pub id: String,
    pub description: &'static str,
    pub status_flags: u8,
    pub format_flags: u8,
}

impl FrameHead {
    pub fn new(frame_type: &FrameType) -> Self {
        Self::with_id(frame_type.id, frame_type)
    }

    /// Head for an identifier that may not be registered (`frame_type` is then
    /// [`FrameType::UNKNOWN`]).
    pub fn with_id(id: impl Into<String>, frame_type: &FrameType) -> Self {
        FrameHead {
            id: id.into(),
            description: frame_type.description,
            status_flags: 0,
            format_flags: 0,
        }
    }

    pub fn with_flags(mut self, status_flags: u8, format_flags: u8) -> Self {
        self.status_flags = status_flags;
        self.format_flags = format_flags;
        self
    }
}

/// A parsed ID3v2 frame.
///
/// Text carried by a frame is always representable in the frame's encoding:
/// constructors and the mutation paths through the owning tag check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Data(DataFrame),
    Text(TextFrame),
    DescText(DescTextFrame),
    UnsynchText(UnsynchTextFrame),
    Id(IdFrame),
    Image(ImageFrame),
}

/// Opaque frame, used for unknown identifiers and undecodable payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    head: FrameHead,
    data: Vec<u8>,
}

/// Standard text frame (TIT2, TPE1, TALB, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFrame {
    head: FrameHead,
    encoding: Encoding,
    text: String,
}

/// Text with a description (TXXX, WXXX).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescTextFrame {
    head: FrameHead,
    encoding: Encoding,
    description: String,
    text: String,
}

/// Text with a language and a description (COMM, USLT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsynchTextFrame {
    head: FrameHead,
    encoding: Encoding,
    language: [u8; 3],
    description: String,
    text: String,
}

/// Unique file identifier (UFID).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFrame {
    head: FrameHead,
    owner_identifier: String,
    identifier: Vec<u8>,
}

/// Attached picture (APIC, PIC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFrame {
    head: FrameHead,
    encoding: Encoding,
    /// A 3 character image format ("JPG") for v2.2 PIC frames
    mime_type: String,
    picture_type: u8,
    description: String,
    data: Vec<u8>,
    fixed_format: bool,
}

fn check_encodable(encoding: Encoding, text: &str) -> Result<()> {
    encoding.encode(text).map(|_| ())
}

fn language_bytes(language: &str) -> [u8; 3] {
    let mut lang = *b"XXX";
    let bytes = language.as_bytes();
    if bytes.len() >= 3 && bytes[..3].is_ascii() {
        lang.copy_from_slice(&bytes[..3]);
    }
    lang
}

impl DataFrame {
    pub fn new(head: FrameHead, data: Vec<u8>) -> Self {
        DataFrame { head, data }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl TextFrame {
    pub fn new(frame_type: &FrameType, text: &str, encoding: Encoding) -> Result<Self> {
        check_encodable(encoding, text)?;
        Ok(TextFrame {
            head: FrameHead::new(frame_type),
            encoding,
            text: text.to_owned(),
        })
    }
}

impl DescTextFrame {
    pub fn new(
        frame_type: &FrameType,
        description: &str,
        text: &str,
        encoding: Encoding,
    ) -> Result<Self> {
        check_encodable(encoding, description)?;
        check_encodable(encoding, text)?;
        Ok(DescTextFrame {
            head: FrameHead::new(frame_type),
            encoding,
            description: description.to_owned(),
            text: text.to_owned(),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl UnsynchTextFrame {
    /// `language` is an ISO-639-2 code, anything shorter than 3 ASCII bytes becomes "XXX".
    pub fn new(
        frame_type: &FrameType,
        language: &str,
        description: &str,
        text: &str,
        encoding: Encoding,
    ) -> Result<Self> {
        check_encodable(encoding, description)?;
        check_encodable(encoding, text)?;
        Ok(UnsynchTextFrame {
            head: FrameHead::new(frame_type),
            encoding,
            language: language_bytes(language),
            description: description.to_owned(),
            text: text.to_owned(),
        })
    }

    pub fn language(&self) -> String {
        self.language.iter().map(|&b| char::from(b)).collect()
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl IdFrame {
    pub fn new(frame_type: &FrameType, owner_identifier: &str, identifier: Vec<u8>) -> Result<Self> {
        check_encodable(Encoding::Latin1, owner_identifier)?;
        Ok(IdFrame {
            head: FrameHead::new(frame_type),
            owner_identifier: owner_identifier.to_owned(),
            identifier,
        })
    }

    pub fn owner_identifier(&self) -> &str {
        &self.owner_identifier
    }

    pub fn identifier(&self) -> &[u8] {
        &self.identifier
    }
}

impl ImageFrame {
    pub fn new(
        frame_type: &FrameType,
        mime_type: &str,
        picture_type: u8,
        description: &str,
        data: Vec<u8>,
        encoding: Encoding,
    ) -> Result<Self> {
        check_encodable(Encoding::Latin1, mime_type)?;
        check_encodable(encoding, description)?;
        Ok(ImageFrame {
            head: FrameHead::new(frame_type),
            encoding,
            mime_type: mime_type.to_owned(),
            picture_type,
            description: description.to_owned(),
            data,
            fixed_format: frame_type.id.len() == 3,
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn picture_type(&self) -> u8 {
        self.picture_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl From<DataFrame> for Frame {
    fn from(f: DataFrame) -> Self {
        Frame::Data(f)
    }
}

impl From<TextFrame> for Frame {
    fn from(f: TextFrame) -> Self {
        Frame::Text(f)
    }
}

impl From<DescTextFrame> for Frame {
    fn from(f: DescTextFrame) -> Self {
        Frame::DescText(f)
    }
}

impl From<UnsynchTextFrame> for Frame {
    fn from(f: UnsynchTextFrame) -> Self {
        Frame::UnsynchText(f)
    }
}

impl From<IdFrame> for Frame {
    fn from(f: IdFrame) -> Self {
        Frame::Id(f)
    }
}

impl From<ImageFrame> for Frame {
    fn from(f: ImageFrame) -> Self {
        Frame::Image(f)
    }
}

impl Frame {
    pub fn head(&self) -> &FrameHead {
        match self {
            Frame::Data(f) => &f.head,
            Frame::Text(f) => &f.head,
            Frame::DescText(f) => &f.head,
            Frame::UnsynchText(f) => &f.head,
            Frame::Id(f) => &f.head,
            Frame::Image(f) => &f.head,
        }
    }

    /// Frame identifier ("TIT2", "TT2", ...).
    pub fn id(&self) -> &str {
        &self.head().id
    }

    /// Human readable description of the frame type.
    pub fn description(&self) -> &'static str {
        self.head().description
    }

    pub fn status_flags(&self) -> u8 {
        self.head().status_flags
    }

    pub fn format_flags(&self) -> u8 {
        self.head().format_flags
    }

    /// Size of the serialized payload, excluding the frame header.
    pub fn size(&self) -> usize {
        self.payload().len()
    }

    /// Whether this frame exposes text through [`Frame::text`].
    pub fn is_text(&self) -> bool {
        matches!(self, Frame::Text(_) | Frame::DescText(_) | Frame::UnsynchText(_))
    }

    pub fn encoding(&self) -> Option<Encoding> {
        match self {
            Frame::Text(f) => Some(f.encoding),
            Frame::DescText(f) => Some(f.encoding),
            Frame::UnsynchText(f) => Some(f.encoding),
            Frame::Image(f) => Some(f.encoding),
            Frame::Data(_) | Frame::Id(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Frame::Text(f) => Some(&f.text),
            Frame::DescText(f) => Some(&f.text),
            Frame::UnsynchText(f) => Some(&f.text),
            _ => None,
        }
    }

    /// Serialize frame payload (without frame header).
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Frame::Data(f) => f.data.clone(),
            Frame::Text(f) => {
                let mut data = vec![f.encoding.index()];
                data.extend_from_slice(&encoded(f.encoding, &f.text));
                data
            }
            Frame::DescText(f) => {
                let mut data = vec![f.encoding.index()];
                push_terminated(&mut data, f.encoding, &f.description);
                data.extend_from_slice(&encoded(f.encoding, &f.text));
                data
            }
            Frame::UnsynchText(f) => {
                let mut data = vec![f.encoding.index()];
                data.extend_from_slice(&f.language);
                push_terminated(&mut data, f.encoding, &f.description);
                data.extend_from_slice(&encoded(f.encoding, &f.text));
                data
            }
            Frame::Id(f) => {
                let mut data = Vec::with_capacity(f.owner_identifier.len() + 1 + f.identifier.len());
                push_terminated(&mut data, Encoding::Latin1, &f.owner_identifier);
                data.extend_from_slice(&f.identifier);
                data
            }
            Frame::Image(f) => {
                let mut data = vec![f.encoding.index()];
                if f.fixed_format {
                    let mut format = encoded(Encoding::Latin1, &f.mime_type);
                    format.resize(3, 0);
                    data.extend_from_slice(&format);
                } else {
                    push_terminated(&mut data, Encoding::Latin1, &f.mime_type);
                }
                data.push(f.picture_type);
                push_terminated(&mut data, f.encoding, &f.description);
                data.extend_from_slice(&f.data);
                data
            }
        }
    }

    /// Replace the text, returning the change in payload size.
    /// The frame is left untouched on error.
    pub(crate) fn set_text(&mut self, text: &str) -> Result<isize> {
        let (encoding, slot) = match self {
            Frame::Text(f) => (f.encoding, &mut f.text),
            Frame::DescText(f) => (f.encoding, &mut f.text),
            Frame::UnsynchText(f) => (f.encoding, &mut f.text),
            _ => return Err(self.not_capable("text")),
        };

        let delta = specs::encoded_diff(encoding, text, encoding, slot)?;
        *slot = text.to_owned();
        Ok(delta)
    }

    /// Replace the description, returning the change in payload size.
    pub(crate) fn set_description(&mut self, description: &str) -> Result<isize> {
        let (encoding, slot) = match self {
            Frame::DescText(f) => (f.encoding, &mut f.description),
            Frame::UnsynchText(f) => (f.encoding, &mut f.description),
            Frame::Image(f) => (f.encoding, &mut f.description),
            _ => return Err(self.not_capable("a description")),
        };

        let delta = specs::encoded_diff(encoding, description, encoding, slot)?;
        *slot = description.to_owned();
        Ok(delta)
    }

    /// Re-encode every string of the frame, returning the change in payload size.
    pub(crate) fn set_encoding(&mut self, new: Encoding) -> Result<isize> {
        let Some(old) = self.encoding() else {
            return Err(self.not_capable("an encoding"));
        };

        let (text, description) = match &*self {
            Frame::Text(f) => (Some(f.text.as_str()), None),
            Frame::DescText(f) => (Some(f.text.as_str()), Some(f.description.as_str())),
            Frame::UnsynchText(f) => (Some(f.text.as_str()), Some(f.description.as_str())),
            Frame::Image(f) => (None, Some(f.description.as_str())),
            Frame::Data(_) | Frame::Id(_) => (None, None),
        };

        let mut delta = 0;
        if let Some(text) = text {
            delta += specs::encoded_diff(new, text, old, text)?;
        }
        if let Some(description) = description {
            delta += specs::encoded_diff(new, description, old, description)?;
            delta += new.terminator_len() as isize - old.terminator_len() as isize;
        }

        match self {
            Frame::Text(f) => f.encoding = new,
            Frame::DescText(f) => f.encoding = new,
            Frame::UnsynchText(f) => f.encoding = new,
            Frame::Image(f) => f.encoding = new,
            Frame::Data(_) | Frame::Id(_) => {}
        }
        Ok(delta)
    }

    fn not_capable(&self, what: &str) -> Id3Error {
        Id3Error::InvalidData(format!("frame {} does not carry {}", self.id(), what))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Data(d) => write!(f, "[{} bytes]", d.data.len()),
            Frame::Text(t) => f.write_str(&t.text),
            Frame::DescText(t) => write!(f, "{}: {}", t.description, t.text),
            Frame::UnsynchText(t) => {
                write!(f, "{}\t{}:\n{}", t.language(), t.description, t.text)
            }
            Frame::Id(i) => write!(f, "{} [{} bytes]", i.owner_identifier, i.identifier.len()),
            Frame::Image(p) => {
                write!(f, "{} ({}, {} bytes)", p.description, p.mime_type, p.data.len())
            }
        }
    }
}

// Strings held by frames are checked against their encoding before they are stored.
fn encoded(encoding: Encoding, text: &str) -> Vec<u8> {
    encoding.encode(text).unwrap_or_default()
}

fn push_terminated(data: &mut Vec<u8>, encoding: Encoding, text: &str) {
    data.extend_from_slice(&encoded(encoding, text));
    data.extend(std::iter::repeat(0u8).take(encoding.terminator_len()));
}

// ---- Parsing functions ----

/// Build a frame from its payload using the constructor bound to `kind`.
///
/// Payloads with format flags set (compression, encryption, grouping, ...) or
/// that the constructor cannot decode are kept as [`DataFrame`]s so that they
/// serialize back byte for byte.
pub fn parse_frame(head: FrameHead, kind: FrameKind, data: &[u8]) -> Frame {
    if head.format_flags != 0 && kind != FrameKind::Data {
        log::debug!(
            "Frame {} has format flags {:#04x}, keeping it opaque",
            head.id,
            head.format_flags
        );
        return Frame::Data(DataFrame::new(head, data.to_vec()));
    }

    let parsed = match kind {
        FrameKind::Data => return Frame::Data(DataFrame::new(head, data.to_vec())),
        FrameKind::Text => parse_text_frame(head.clone(), data),
        FrameKind::DescText => parse_desc_text_frame(head.clone(), data),
        FrameKind::UnsynchText => parse_unsynch_text_frame(head.clone(), data),
        FrameKind::Id => parse_id_frame(head.clone(), data),
        FrameKind::Image => parse_image_frame(head.clone(), data),
    };

    match parsed {
        // Frames are written back as they were read
        Ok(frame) if frame.payload() != data => {
            log::debug!(
                "Frame {} does not re-encode to its {} stored bytes, keeping it opaque",
                head.id,
                data.len()
            );
            Frame::Data(DataFrame::new(head, data.to_vec()))
        }
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("Failed to decode frame {}, keeping it opaque: {}", head.id, e);
            Frame::Data(DataFrame::new(head, data.to_vec()))
        }
    }
}

fn read_encoding(id: &str, data: &[u8]) -> Result<Encoding> {
    let byte = *data
        .first()
        .ok_or_else(|| Id3Error::InvalidData(format!("empty {} frame", id)))?;
    Encoding::try_from_byte(byte)
        .ok_or_else(|| Id3Error::InvalidData(format!("invalid encoding byte: {}", byte)))
}

/// Split a terminated description from the text that follows it.
fn split_description(data: &[u8], encoding: Encoding) -> Result<(String, String)> {
    let (at, after) = specs::find_terminator(data, encoding)
        .ok_or_else(|| Id3Error::InvalidData("unterminated description".into()))?;
    let description = encoding.decode(&data[..at])?;
    let text = encoding.decode(&data[after..])?;
    Ok((description, text))
}

fn parse_text_frame(head: FrameHead, data: &[u8]) -> Result<Frame> {
    let encoding = read_encoding(&head.id, data)?;
    let text = encoding.decode(&data[1..])?;
    Ok(Frame::Text(TextFrame {
        head,
        encoding,
        text,
    }))
}

fn parse_desc_text_frame(head: FrameHead, data: &[u8]) -> Result<Frame> {
    let encoding = read_encoding(&head.id, data)?;
    let (description, text) = split_description(&data[1..], encoding)?;
    Ok(Frame::DescText(DescTextFrame {
        head,
        encoding,
        description,
        text,
    }))
}

fn parse_unsynch_text_frame(head: FrameHead, data: &[u8]) -> Result<Frame> {
    if data.len() < 4 {
        return Err(Id3Error::InvalidData(format!("{} frame too short", head.id)));
    }

    let encoding = read_encoding(&head.id, data)?;
    let language = [data[1], data[2], data[3]];
    let (description, text) = split_description(&data[4..], encoding)?;
    Ok(Frame::UnsynchText(UnsynchTextFrame {
        head,
        encoding,
        language,
        description,
        text,
    }))
}

fn parse_id_frame(head: FrameHead, data: &[u8]) -> Result<Frame> {
    let (at, after) = specs::find_terminator(data, Encoding::Latin1)
        .ok_or_else(|| Id3Error::InvalidData("unterminated owner identifier".into()))?;
    Ok(Frame::Id(IdFrame {
        head,
        owner_identifier: Encoding::Latin1.decode(&data[..at])?,
        identifier: data[after..].to_vec(),
    }))
}

fn parse_image_frame(head: FrameHead, data: &[u8]) -> Result<Frame> {
    let encoding = read_encoding(&head.id, data)?;
    let fixed_format = head.id.len() == 3;

    let (mime_type, rest) = if fixed_format {
        // v2.2 uses a 3-char image format instead of a MIME type
        if data.len() < 5 {
            return Err(Id3Error::InvalidData("PIC frame too short".into()));
        }
        (Encoding::Latin1.decode(&data[1..4])?, &data[4..])
    } else {
        let (at, after) = specs::find_terminator(&data[1..], Encoding::Latin1)
            .ok_or_else(|| Id3Error::InvalidData("unterminated MIME type".into()))?;
        (Encoding::Latin1.decode(&data[1..1 + at])?, &data[1 + after..])
    };

    let (&picture_type, rest) = rest
        .split_first()
        .ok_or_else(|| Id3Error::InvalidData(format!("{} frame too short", head.id)))?;

    let (at, after) = specs::find_terminator(rest, encoding)
        .ok_or_else(|| Id3Error::InvalidData("unterminated description".into()))?;

    Ok(Frame::Image(ImageFrame {
        head,
        encoding,
        mime_type,
        picture_type,
        description: encoding.decode(&rest[..at])?,
        data: rest[after..].to_vec(),
        fixed_format,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::frame_types::FrameLayout;

    fn head(layout: FrameLayout, id: &str) -> (FrameHead, FrameKind) {
        let ft = layout.frame_type_or_unknown(id);
        (FrameHead::with_id(id, ft), ft.kind)
    }

    fn round_trip(layout: FrameLayout, id: &str, payload: &[u8]) -> Frame {
        let (head, kind) = head(layout, id);
        let frame = parse_frame(head, kind, payload);
        assert_eq!(frame.payload(), payload, "{id} did not round trip");
        assert_eq!(frame.size(), payload.len());
        frame
    }

    #[test_log::test]
    fn text_frame() {
        let frame = round_trip(FrameLayout::V23, "TIT2", b"\x00Title");
        assert!(matches!(frame, Frame::Text(_)));
        assert_eq!(frame.text(), Some("Title"));
        assert_eq!(frame.encoding(), Some(Encoding::Latin1));
        assert_eq!(frame.description(), "Title/songname/content description");
    }

    #[test_log::test]
    fn text_frame_keeps_terminator() {
        let frame = round_trip(FrameLayout::V24, "TIT2", b"\x03Title\x00");
        assert_eq!(frame.text(), Some("Title\0"));
    }

    #[test_log::test]
    fn utf16_text_frame() {
        let frame = round_trip(FrameLayout::V23, "TPE1", b"\x01\xFF\xFEA\x00b\x00");
        assert_eq!(frame.text(), Some("Ab"));
        assert_eq!(frame.encoding(), Some(Encoding::Utf16));
    }

    #[test_log::test]
    fn comment_frame() {
        let frame = round_trip(FrameLayout::V23, "COMM", b"\x00engdesc\x00hello");
        let Frame::UnsynchText(ref comm) = frame else {
            panic!("expected an unsynchronised text frame, got {frame:?}");
        };
        assert_eq!(comm.language(), "eng");
        assert_eq!(comm.description(), "desc");
        assert_eq!(frame.text(), Some("hello"));
        assert_eq!(frame.to_string(), "eng\tdesc:\nhello");
    }

    #[test_log::test]
    fn utf16_comment_frame() {
        let payload = b"\x01eng\xFF\xFEd\x00\x00\x00\xFF\xFEh\x00i\x00";
        let frame = round_trip(FrameLayout::V23, "COMM", payload);
        assert_eq!(frame.text(), Some("hi"));
    }

    #[test_log::test]
    fn user_text_frame() {
        let frame = round_trip(FrameLayout::V24, "TXXX", b"\x03key\x00value");
        assert!(matches!(frame, Frame::DescText(_)));
        assert_eq!(frame.to_string(), "key: value");
    }

    #[test_log::test]
    fn ufid_frame() {
        let frame = round_trip(FrameLayout::V23, "UFID", b"http://example.org\x00\x01\x02\x03");
        let Frame::Id(ref ufid) = frame else {
            panic!("expected an id frame");
        };
        assert_eq!(ufid.owner_identifier(), "http://example.org");
        assert_eq!(ufid.identifier(), [1, 2, 3]);
    }

    #[test_log::test]
    fn picture_frames() {
        let frame = round_trip(FrameLayout::V23, "APIC", b"\x00image/png\x00\x03cover\x00\x89PNG");
        let Frame::Image(ref apic) = frame else {
            panic!("expected an image frame");
        };
        assert_eq!(apic.mime_type(), "image/png");
        assert_eq!(apic.picture_type(), 3);
        assert_eq!(apic.description(), "cover");
        assert_eq!(apic.data(), b"\x89PNG");

        let frame = round_trip(FrameLayout::V22, "PIC", b"\x00JPG\x03\x00\xFF\xD8");
        let Frame::Image(ref pic) = frame else {
            panic!("expected an image frame");
        };
        assert_eq!(pic.mime_type(), "JPG");
        assert_eq!(pic.description(), "");
    }

    #[test_log::test]
    fn unknown_frame_is_opaque() {
        let frame = round_trip(FrameLayout::V23, "XYZW", b"\x00\x01\x02");
        assert!(matches!(frame, Frame::Data(_)));
        assert_eq!(frame.description(), "Unknown frame");
        assert_eq!(frame.to_string(), "[3 bytes]");
    }

    #[test_log::test]
    fn undecodable_payloads_are_opaque() {
        // Invalid encoding byte
        assert!(matches!(round_trip(FrameLayout::V23, "TIT2", b"\x07abc"), Frame::Data(_)));
        // Invalid UTF-8
        assert!(matches!(round_trip(FrameLayout::V24, "TIT2", b"\x03\xC3"), Frame::Data(_)));
        // Missing description terminator
        assert!(matches!(round_trip(FrameLayout::V23, "COMM", b"\x00engabc"), Frame::Data(_)));
        // Empty
        assert!(matches!(round_trip(FrameLayout::V23, "TALB", b""), Frame::Data(_)));
    }

    #[test_log::test]
    fn big_endian_bom_is_kept_verbatim() {
        let payload = b"\x01\xFE\xFF\x00A\x00b";
        let frame = round_trip(FrameLayout::V23, "TIT2", payload);
        assert!(matches!(frame, Frame::Data(_)));
        assert_eq!(frame.payload(), payload);
    }

    #[test_log::test]
    fn format_flags_keep_payload_opaque() {
        let (head, kind) = head(FrameLayout::V23, "TIT2");
        let frame = parse_frame(head.with_flags(0, 0x80), kind, b"\x78\x9c");
        assert!(matches!(frame, Frame::Data(_)));
        assert_eq!(frame.format_flags(), 0x80);
    }

    #[test_log::test]
    fn set_text_reports_delta() {
        let ft = FrameLayout::V23.frame_type_or_unknown("TIT2");
        let mut frame = Frame::from(TextFrame::new(ft, "A", Encoding::Utf8).unwrap());
        let before = frame.size();
        let delta = frame.set_text("Hello World").unwrap();
        assert_eq!(delta, 10);
        assert_eq!(frame.size() as isize - before as isize, delta);
    }

    #[test_log::test]
    fn set_encoding_reports_delta() {
        let ft = FrameLayout::V23.frame_type_or_unknown("COMM");
        let mut frame =
            Frame::from(UnsynchTextFrame::new(ft, "eng", "d", "text", Encoding::Latin1).unwrap());
        let before = frame.size() as isize;

        let delta = frame.set_encoding(Encoding::Utf16).unwrap();
        assert_eq!(frame.size() as isize - before, delta);
        assert_eq!(frame.encoding(), Some(Encoding::Utf16));
    }

    #[test_log::test]
    fn failed_mutation_leaves_frame_untouched() {
        let ft = FrameLayout::V23.frame_type_or_unknown("TIT2");
        let mut frame = Frame::from(TextFrame::new(ft, "A", Encoding::Latin1).unwrap());
        let copy = frame.clone();

        assert!(frame.set_text("日本").is_err());
        assert_eq!(frame, copy);

        let mut frame = Frame::from(TextFrame::new(ft, "日本", Encoding::Utf8).unwrap());
        assert!(frame.set_encoding(Encoding::Latin1).is_err());
        assert_eq!(frame.encoding(), Some(Encoding::Utf8));
    }

    #[test_log::test]
    fn data_frames_reject_text() {
        let ft = FrameLayout::V23.frame_type_or_unknown("PRIV");
        let mut frame = Frame::from(DataFrame::new(FrameHead::new(ft), vec![1, 2]));
        assert!(matches!(frame.set_text("x"), Err(Id3Error::InvalidData(_))));
        assert!(frame.set_encoding(Encoding::Utf8).is_err());
    }

    #[test_log::test]
    fn constructors_check_encoding() {
        let ft = FrameLayout::V23.frame_type_or_unknown("TIT2");
        assert!(TextFrame::new(ft, "€", Encoding::Latin1).is_err());
        assert!(TextFrame::new(ft, "€", Encoding::Utf16).is_ok());
    }
}
