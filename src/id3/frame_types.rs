//! Per-version frame type registry.
//!
//! The tables are immutable configuration compiled into the binary. A
//! [`FrameLayout`] bundles the tables and frame header layout of one major
//! version and is handed to the frame codec explicitly.

use std::fmt;

use crate::id3::header::BitPaddedInt;

/// Payload constructor a frame identifier is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Opaque payload, kept byte for byte
    Data,
    /// Encoding byte followed by text
    Text,
    /// Encoding, terminated description, text
    DescText,
    /// Encoding, 3-byte language, terminated description, text
    UnsynchText,
    /// Terminated Latin-1 owner identifier followed by binary identifier
    Id,
    /// Encoding, MIME type (image format in v2.2), picture type, description, data
    Image,
}

/// Description of a frame identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameType {
    pub id: &'static str,
    pub description: &'static str,
    pub kind: FrameKind,
}

impl FrameType {
    /// Stand-in for identifiers missing from the registry.
    pub const UNKNOWN: FrameType = FrameType {
        id: "",
        description: "Unknown frame",
        kind: FrameKind::Data,
    };
}

const fn ft(id: &'static str, description: &'static str, kind: FrameKind) -> FrameType {
    FrameType {
        id,
        description,
        kind,
    }
}

use FrameKind::{Data, DescText, Id, Image, Text, UnsynchText};

const V22_FRAMES: &[FrameType] = &[
    ft("BUF", "Recommended buffer size", Data),
    ft("CNT", "Play counter", Data),
    ft("COM", "Comments", UnsynchText),
    ft("CRA", "Audio encryption", Data),
    ft("CRM", "Encrypted meta frame", Data),
    ft("ETC", "Event timing codes", Data),
    ft("EQU", "Equalization", Data),
    ft("GEO", "General encapsulated object", Data),
    ft("IPL", "Involved people list", Text),
    ft("LNK", "Linked information", Data),
    ft("MCI", "Music CD Identifier", Data),
    ft("MLL", "MPEG location lookup table", Data),
    ft("PIC", "Attached picture", Image),
    ft("POP", "Popularimeter", Data),
    ft("REV", "Reverb", Data),
    ft("RVA", "Relative volume adjustment", Data),
    ft("SLT", "Synchronized lyric/text", Data),
    ft("STC", "Synced tempo codes", Data),
    ft("TAL", "Album/Movie/Show title", Text),
    ft("TBP", "BPM (Beats Per Minute)", Text),
    ft("TCM", "Composer", Text),
    ft("TCO", "Content type", Text),
    ft("TCR", "Copyright message", Text),
    ft("TDA", "Date", Text),
    ft("TDY", "Playlist delay", Text),
    ft("TEN", "Encoded by", Text),
    ft("TFT", "File type", Text),
    ft("TIM", "Time", Text),
    ft("TKE", "Initial key", Text),
    ft("TLA", "Language(s)", Text),
    ft("TLE", "Length", Text),
    ft("TMT", "Media type", Text),
    ft("TOA", "Original artist(s)/performer(s)", Text),
    ft("TOF", "Original filename", Text),
    ft("TOL", "Original Lyricist(s)/text writer(s)", Text),
    ft("TOR", "Original release year", Text),
    ft("TOT", "Original album/Movie/Show title", Text),
    ft("TP1", "Lead artist(s)/Lead performer(s)/Soloist(s)/Performing group", Text),
    ft("TP2", "Band/Orchestra/Accompaniment", Text),
    ft("TP3", "Conductor/Performer refinement", Text),
    ft("TP4", "Interpreted, remixed, or otherwise modified by", Text),
    ft("TPA", "Part of a set", Text),
    ft("TPB", "Publisher", Text),
    ft("TRC", "ISRC (International Standard Recording Code)", Text),
    ft("TRD", "Recording dates", Text),
    ft("TRK", "Track number/Position in set", Text),
    ft("TSI", "Size", Text),
    ft("TSS", "Software/hardware and settings used for encoding", Text),
    ft("TT1", "Content group description", Text),
    ft("TT2", "Title/Songname/Content description", Text),
    ft("TT3", "Subtitle/Description refinement", Text),
    ft("TXT", "Lyricist/text writer", Text),
    ft("TXX", "User defined text information frame", DescText),
    ft("TYE", "Year", Text),
    ft("UFI", "Unique file identifier", Id),
    ft("ULT", "Unsychronized lyric/text transcription", UnsynchText),
    ft("WAF", "Official audio file webpage", Data),
    ft("WAR", "Official artist/performer webpage", Data),
    ft("WAS", "Official audio source webpage", Data),
    ft("WCM", "Commercial information", Data),
    ft("WCP", "Copyright/Legal information", Data),
    ft("WPB", "Publishers official webpage", Data),
    ft("WXX", "User defined URL link frame", DescText),
];

// Identifiers valid in both ID3v2.3 and ID3v2.4
const V3_V4_FRAMES: &[FrameType] = &[
    ft("AENC", "Audio encryption", Data),
    ft("APIC", "Attached picture", Image),
    ft("COMM", "Comments", UnsynchText),
    ft("COMR", "Commercial frame", Data),
    ft("ENCR", "Encryption method registration", Data),
    ft("ETCO", "Event timing codes", Data),
    ft("GEOB", "General encapsulated object", Data),
    ft("GRID", "Group identification registration", Data),
    ft("LINK", "Linked information", Data),
    ft("MCDI", "Music CD identifier", Data),
    ft("MLLT", "MPEG location lookup table", Data),
    ft("OWNE", "Ownership frame", Data),
    ft("PRIV", "Private frame", Data),
    ft("PCNT", "Play counter", Data),
    ft("POPM", "Popularimeter", Data),
    ft("POSS", "Position synchronisation frame", Data),
    ft("RBUF", "Recommended buffer size", Data),
    ft("RVRB", "Reverb", Data),
    ft("SYLT", "Synchronized lyric/text", Data),
    ft("SYTC", "Synchronized tempo codes", Data),
    ft("TALB", "Album/Movie/Show title", Text),
    ft("TBPM", "BPM (beats per minute)", Text),
    ft("TCOM", "Composer", Text),
    ft("TCON", "Content type", Text),
    ft("TCOP", "Copyright message", Text),
    ft("TDLY", "Playlist delay", Text),
    ft("TENC", "Encoded by", Text),
    ft("TEXT", "Lyricist/Text writer", Text),
    ft("TFLT", "File type", Text),
    ft("TIT1", "Content group description", Text),
    ft("TIT2", "Title/songname/content description", Text),
    ft("TIT3", "Subtitle/Description refinement", Text),
    ft("TKEY", "Initial key", Text),
    ft("TLAN", "Language(s)", Text),
    ft("TLEN", "Length", Text),
    ft("TMED", "Media type", Text),
    ft("TOAL", "Original album/movie/show title", Text),
    ft("TOFN", "Original filename", Text),
    ft("TOLY", "Original lyricist(s)/text writer(s)", Text),
    ft("TOPE", "Original artist(s)/performer(s)", Text),
    ft("TOWN", "File owner/licensee", Text),
    ft("TPE1", "Lead performer(s)/Soloist(s)", Text),
    ft("TPE2", "Band/orchestra/accompaniment", Text),
    ft("TPE3", "Conductor/performer refinement", Text),
    ft("TPE4", "Interpreted, remixed, or otherwise modified by", Text),
    ft("TPOS", "Part of a set", Text),
    ft("TPUB", "Publisher", Text),
    ft("TRCK", "Track number/Position in set", Text),
    ft("TRSN", "Internet radio station name", Text),
    ft("TRSO", "Internet radio station owner", Text),
    ft("TSRC", "ISRC (international standard recording code)", Text),
    ft("TSSE", "Software/Hardware and settings used for encoding", Text),
    ft("TXXX", "User defined text information frame", DescText),
    ft("UFID", "Unique file identifier", Id),
    ft("USER", "Terms of use", Data),
    ft("USLT", "Unsychronized lyric/text transcription", UnsynchText),
    ft("WCOM", "Commercial information", Data),
    ft("WCOP", "Copyright/Legal information", Data),
    ft("WOAF", "Official audio file webpage", Data),
    ft("WOAR", "Official artist/performer webpage", Data),
    ft("WOAS", "Official audio source webpage", Data),
    ft("WORS", "Official internet radio station homepage", Data),
    ft("WPAY", "Payment", Data),
    ft("WPUB", "Publishers official webpage", Data),
    ft("WXXX", "User defined URL link frame", DescText),
];

// Dropped in ID3v2.4
const V23_FRAMES: &[FrameType] = &[
    ft("EQUA", "Equalization", Data),
    ft("IPLS", "Involved people list", Text),
    ft("RVAD", "Relative volume adjustment", Data),
    ft("TDAT", "Date", Text),
    ft("TIME", "Time", Text),
    ft("TORY", "Original release year", Text),
    ft("TRDA", "Recording dates", Text),
    ft("TSIZ", "Size", Text),
    ft("TYER", "Year", Text),
];

// Introduced in ID3v2.4
const V24_FRAMES: &[FrameType] = &[
    ft("ASPI", "Audio seek point index", Data),
    ft("EQU2", "Equalisation (2)", Data),
    ft("RVA2", "Relative volume adjustment (2)", Data),
    ft("SEEK", "Seek frame", Data),
    ft("SIGN", "Signature frame", Data),
    ft("TDEN", "Encoding time", Text),
    ft("TDOR", "Original release time", Text),
    ft("TDRC", "Recording time", Text),
    ft("TDRL", "Release time", Text),
    ft("TDTG", "Tagging time", Text),
    ft("TIPL", "Involved people list", Text),
    ft("TMCL", "Musician credits list", Text),
    ft("TMOO", "Mood", Text),
    ft("TPRO", "Produced notice", Text),
    ft("TSOA", "Album sort order", Text),
    ft("TSOP", "Performer sort order", Text),
    ft("TSOT", "Title sort order", Text),
    ft("TSST", "Set subtitle", Text),
];

/// Semantic fields bound to a version-specific frame identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonField {
    Title,
    Artist,
    Album,
    Year,
    Genre,
    Length,
    Comments,
}

impl CommonField {
    pub const ALL: [CommonField; 7] = [
        CommonField::Title,
        CommonField::Artist,
        CommonField::Album,
        CommonField::Year,
        CommonField::Genre,
        CommonField::Length,
        CommonField::Comments,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommonField::Title => "Title",
            CommonField::Artist => "Artist",
            CommonField::Album => "Album",
            CommonField::Year => "Year",
            CommonField::Genre => "Genre",
            CommonField::Length => "Length",
            CommonField::Comments => "Comments",
        }
    }
}

impl fmt::Display for CommonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type CommonMap = [(CommonField, &'static str); 7];

const V22_COMMON: CommonMap = [
    (CommonField::Title, "TT2"),
    (CommonField::Artist, "TP1"),
    (CommonField::Album, "TAL"),
    (CommonField::Year, "TYE"),
    (CommonField::Genre, "TCO"),
    (CommonField::Length, "TLE"),
    (CommonField::Comments, "COM"),
];

const V23_COMMON: CommonMap = [
    (CommonField::Title, "TIT2"),
    (CommonField::Artist, "TPE1"),
    (CommonField::Album, "TALB"),
    (CommonField::Year, "TYER"),
    (CommonField::Genre, "TCON"),
    (CommonField::Length, "TLEN"),
    (CommonField::Comments, "COMM"),
];

const V24_COMMON: CommonMap = [
    (CommonField::Title, "TIT2"),
    (CommonField::Artist, "TPE1"),
    (CommonField::Album, "TALB"),
    (CommonField::Year, "TDRC"),
    (CommonField::Genre, "TCON"),
    (CommonField::Length, "TLEN"),
    (CommonField::Comments, "COMM"),
];

/// Frame tables and frame header layout of one ID3v2 major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Major version this layout was requested for
    pub version: u8,
    pub id_len: usize,
    pub size_len: usize,
    /// Significant bits per byte of the frame size field
    pub size_bits: u8,
    /// v2.2 frame headers carry no flag bytes
    pub has_flags: bool,
    tables: &'static [&'static [FrameType]],
    common: &'static CommonMap,
}

impl FrameLayout {
    pub const V22: FrameLayout = FrameLayout {
        version: 2,
        id_len: 3,
        size_len: 3,
        size_bits: BitPaddedInt::NORMAL_BITS,
        has_flags: false,
        tables: &[V22_FRAMES],
        common: &V22_COMMON,
    };

    pub const V23: FrameLayout = FrameLayout {
        version: 3,
        id_len: 4,
        size_len: 4,
        size_bits: BitPaddedInt::NORMAL_BITS,
        has_flags: true,
        tables: &[V3_V4_FRAMES, V23_FRAMES],
        common: &V23_COMMON,
    };

    pub const V24: FrameLayout = FrameLayout {
        version: 4,
        id_len: 4,
        size_len: 4,
        size_bits: BitPaddedInt::SYNCHSAFE_BITS,
        has_flags: true,
        tables: &[V3_V4_FRAMES, V24_FRAMES],
        common: &V24_COMMON,
    };

    /// Layout for a major version. Unknown versions borrow the ID3v2.3 layout
    /// but keep their version number, see [`FrameLayout::is_supported`].
    pub fn for_version(version: u8) -> Self {
        match version {
            2 => Self::V22,
            3 => Self::V23,
            4 => Self::V24,
            _ => FrameLayout {
                version,
                ..Self::V23
            },
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self.version, 2..=4)
    }

    /// Size of a frame header (id + size + flags).
    pub fn frame_header_size(&self) -> usize {
        self.id_len + self.size_len + if self.has_flags { 2 } else { 0 }
    }

    /// Largest payload the frame size field can express.
    pub fn max_frame_size(&self) -> u64 {
        BitPaddedInt::max_value(self.size_bits, self.size_len)
    }

    /// Registered frame type for an identifier.
    pub fn frame_type(&self, id: &str) -> Option<&'static FrameType> {
        self.tables
            .iter()
            .copied()
            .flat_map(|table| table.iter())
            .find(|ft| ft.id == id)
    }

    /// Registered frame type, or [`FrameType::UNKNOWN`].
    pub fn frame_type_or_unknown(&self, id: &str) -> &'static FrameType {
        self.frame_type(id).unwrap_or(&FrameType::UNKNOWN)
    }

    /// Frame identifier bound to a semantic field.
    pub fn common_id(&self, field: CommonField) -> &'static str {
        self.common
            .iter()
            .find(|(f, _)| *f == field)
            .map_or("", |(_, id)| id)
    }

    /// Frame type bound to a semantic field.
    pub fn common_type(&self, field: CommonField) -> &'static FrameType {
        self.frame_type_or_unknown(self.common_id(field))
    }

    /// All frame types known to this version.
    pub fn frame_types(&self) -> impl Iterator<Item = &'static FrameType> {
        self.tables.iter().copied().flat_map(|table| table.iter())
    }
}
