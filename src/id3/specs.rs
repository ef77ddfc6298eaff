use std::borrow::Cow;

use crate::common::error::{Id3Error, Result};

/// Text encoding types used in ID3v2 frames, indexed by the encoding byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Encoding {
    Latin1 = 0,
    /// UTF-16 with a byte order mark
    Utf16 = 1,
    /// UTF-16 big endian, no byte order mark
    Utf16Be = 2,
    Utf8 = 3,
}

struct EncodingSpec {
    name: &'static str,
    null_len: usize,
}

const ENCODINGS: [EncodingSpec; 4] = [
    EncodingSpec { name: "ISO-8859-1", null_len: 1 },
    EncodingSpec { name: "UTF-16", null_len: 2 },
    EncodingSpec { name: "UTF-16BE", null_len: 2 },
    EncodingSpec { name: "UTF-8", null_len: 1 },
];

impl Encoding {
    pub const ALL: [Encoding; 4] = [
        Encoding::Latin1,
        Encoding::Utf16,
        Encoding::Utf16Be,
        Encoding::Utf8,
    ];

    /// Strict lookup, `None` for bytes outside 0..=3.
    pub fn try_from_byte(b: u8) -> Option<Self> {
        Self::ALL.get(usize::from(b)).copied()
    }

    /// Lenient lookup, out of range bytes map to ISO-8859-1.
    pub fn from_index(b: u8) -> Self {
        Self::try_from_byte(b).unwrap_or(Encoding::Latin1)
    }

    /// Lookup by name (case insensitive), unknown names map to ISO-8859-1.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
            .unwrap_or(Encoding::Latin1)
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        ENCODINGS[self as usize].name
    }

    /// Size of the null terminator for this encoding.
    pub fn terminator_len(self) -> usize {
        ENCODINGS[self as usize].null_len
    }

    /// Decode text from bytes.
    pub fn decode(self, data: &[u8]) -> Result<String> {
        match self {
            Encoding::Latin1 => Ok(data.iter().map(|&b| char::from(b)).collect()),
            Encoding::Utf16 => {
                if data.is_empty() {
                    return Ok(String::new());
                }
                // Check BOM, big endian when absent
                let (decoder, start) = match data {
                    [0xFF, 0xFE, ..] => (encoding_rs::UTF_16LE, 2),
                    [0xFE, 0xFF, ..] => (encoding_rs::UTF_16BE, 2),
                    _ => (encoding_rs::UTF_16BE, 0),
                };
                decode_utf16(decoder, &data[start..], self)
            }
            Encoding::Utf16Be => decode_utf16(encoding_rs::UTF_16BE, data, self),
            Encoding::Utf8 => std::str::from_utf8(data)
                .map(str::to_owned)
                .map_err(|e| Id3Error::encoding(self.name(), e.to_string())),
        }
    }

    /// Encode text to bytes.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        Id3Error::encoding(self.name(), format!("character {:?} is not representable", c))
                    })
                })
                .collect(),
            Encoding::Utf16 => {
                if text.is_empty() {
                    return Ok(Vec::new());
                }
                let mut result = Vec::with_capacity(2 + text.len() * 2);
                result.extend_from_slice(&[0xFF, 0xFE]); // BOM (LE)
                for c in text.encode_utf16() {
                    result.extend_from_slice(&c.to_le_bytes());
                }
                Ok(result)
            }
            Encoding::Utf16Be => {
                let mut result = Vec::with_capacity(text.len() * 2);
                for c in text.encode_utf16() {
                    result.extend_from_slice(&c.to_be_bytes());
                }
                Ok(result)
            }
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        }
    }
}

fn decode_utf16(
    decoder: &'static encoding_rs::Encoding,
    data: &[u8],
    encoding: Encoding,
) -> Result<String> {
    decoder
        .decode_without_bom_handling_and_without_replacement(data)
        .map(Cow::into_owned)
        .ok_or_else(|| Id3Error::encoding(encoding.name(), "malformed UTF-16 data"))
}

/// Name of the encoding for an encoding byte, ISO-8859-1 when out of range.
pub fn name_for_index(b: u8) -> &'static str {
    Encoding::from_index(b).name()
}

/// Encoding byte for a name, 0 when unknown.
pub fn index_for_name(name: &str) -> u8 {
    Encoding::from_name(name).index()
}

/// Find the first null terminator for the given encoding.
///
/// The data is scanned in strides of the terminator length, so a two byte
/// terminator only matches on an even offset. Returns the offset of the
/// terminator and the offset just past it.
pub fn find_terminator(data: &[u8], encoding: Encoding) -> Option<(usize, usize)> {
    match encoding.terminator_len() {
        1 => memchr::memchr(0, data).map(|pos| (pos, pos + 1)),
        len => data
            .chunks_exact(len)
            .position(|chunk| chunk.iter().all(|&b| b == 0))
            .map(|i| (i * len, i * len + len)),
    }
}

/// Signed difference in encoded byte length between a new and an old string.
pub fn encoded_diff(
    new_encoding: Encoding,
    new_text: &str,
    old_encoding: Encoding,
    old_text: &str,
) -> Result<isize> {
    let new_len = new_encoding.encode(new_text)?.len();
    let old_len = old_encoding.encode(old_text)?.len();
    Ok(new_len as isize - old_len as isize)
}

/// ID3v1 genre list (index → genre name).
pub const GENRES: &[&str] = &[
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge",
    "Hip-Hop", "Jazz", "Metal", "New Age", "Oldies", "Other", "Pop", "R&B",
    "Rap", "Reggae", "Rock", "Techno", "Industrial", "Alternative", "Ska",
    "Death Metal", "Pranks", "Soundtrack", "Euro-Techno", "Ambient",
    "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance", "Classical",
    "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise",
    "AlternRock", "Bass", "Soul", "Punk", "Space", "Meditative",
    "Instrumental Pop", "Instrumental Rock", "Ethnic", "Gothic", "Darkwave",
    "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance", "Dream",
    "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap",
    "Pop/Funk", "Jungle", "Native American", "Cabaret", "New Wave",
    "Psychedelic", "Rave", "Showtunes", "Trailer", "Lo-Fi", "Tribal",
    "Acid Punk", "Acid Jazz", "Polka", "Retro", "Musical", "Rock & Roll",
    "Hard Rock", "Folk", "Folk-Rock", "National Folk", "Swing", "Fast Fusion",
    "Bebop", "Latin", "Revival", "Celtic", "Bluegrass", "Avantgarde",
    "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock",
    "Slow Rock", "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour",
    "Speech", "Chanson", "Opera", "Chamber Music", "Sonata", "Symphony",
    "Booty Bass", "Primus", "Porn Groove", "Satire", "Slow Jam", "Club",
    "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul",
    "Freestyle", "Duet", "Punk Rock", "Drum Solo", "A capella", "Euro-House",
    "Dance Hall", "Goa", "Drum & Bass", "Club-House", "Hardcore Techno",
    "Terror", "Indie", "BritPop", "Negerpunk", "Polsk Punk", "Beat",
    "Christian Gangsta Rap", "Heavy Metal", "Black Metal", "Crossover",
    "Contemporary Christian", "Christian Rock", "Merengue", "Salsa",
    "Thrash Metal", "Anime", "Jpop", "Synthpop", "Abstract", "Art Rock",
    "Baroque", "Bhangra", "Big Beat", "Breakbeat", "Chillout", "Downtempo",
    "Dub", "EBM", "Eclectic", "Electro", "Electroclash", "Emo", "Experimental",
    "Garage", "Global", "IDM", "Illbient", "Industro-Goth", "Jam Band",
    "Krautrock", "Leftfield", "Lounge", "Math Rock", "New Romantic",
    "Nu-Breakz", "Post-Punk", "Post-Rock", "Psytrance", "Shoegaze",
    "Space Rock", "Trop Rock", "World Music", "Neoclassical", "Audiobook",
    "Audio Theatre", "Neue Deutsche Welle", "Podcast", "Indie Rock",
    "G-Funk", "Dubstep", "Garage Rock", "Psybient",
];

/// Resolve a genre string to its ID3v1 index.
/// Accepts a plain name ("Rock"), a bare number ("17") or a reference ("(17)").
pub fn genre_index(text: &str) -> Option<u8> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .map_or(trimmed, |(num, _)| num);

    if let Ok(num) = inner.parse::<usize>() {
        return (num < GENRES.len()).then_some(num as u8);
    }

    GENRES
        .iter()
        .position(|g| g.eq_ignore_ascii_case(trimmed))
        .map(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn indexes() {
        let names = ["ISO-8859-1", "UTF-16", "UTF-16BE", "UTF-8"];
        for (i, name) in names.iter().enumerate() {
            assert_eq!(index_for_name(name), i as u8);
            assert_eq!(name_for_index(i as u8), *name);
            assert_eq!(index_for_name(name_for_index(i as u8)), i as u8);
        }
    }

    #[test_log::test]
    fn unknown_defaults_to_latin1() {
        assert_eq!(index_for_name("KOI8-R"), 0);
        assert_eq!(name_for_index(4), "ISO-8859-1");
        assert_eq!(name_for_index(255), "ISO-8859-1");
        assert_eq!(Encoding::try_from_byte(4), None);
    }

    #[test_log::test]
    fn latin1_round_trip() {
        // hêllo wørld
        let sample = [0x68, 0xea, 0x6c, 0x6c, 0x6f, 0x20, 0x77, 0xf8, 0x72, 0x6c, 0x64];
        let decoded = Encoding::Latin1.decode(&sample).unwrap();
        assert_eq!(decoded, "hêllo wørld");
        assert_eq!(Encoding::Latin1.encode(&decoded).unwrap(), sample);

        let all: Vec<u8> = (0..=255).collect();
        let decoded = Encoding::Latin1.decode(&all).unwrap();
        assert_eq!(Encoding::Latin1.encode(&decoded).unwrap(), all);
    }

    #[test_log::test]
    fn latin1_rejects_wide_chars() {
        assert!(matches!(
            Encoding::Latin1.encode("日本"),
            Err(Id3Error::Encoding { encoding: "ISO-8859-1", .. })
        ));
    }

    #[test_log::test]
    fn utf16_bom_handling() {
        assert_eq!(Encoding::Utf16.decode(&[0xFF, 0xFE, b'h', 0, b'i', 0]).unwrap(), "hi");
        assert_eq!(Encoding::Utf16.decode(&[0xFE, 0xFF, 0, b'h', 0, b'i']).unwrap(), "hi");
        assert_eq!(Encoding::Utf16.decode(&[0, b'h', 0, b'i']).unwrap(), "hi");
        assert_eq!(Encoding::Utf16.encode("hi").unwrap(), [0xFF, 0xFE, b'h', 0, b'i', 0]);
        assert!(Encoding::Utf16.encode("").unwrap().is_empty());
    }

    #[test_log::test]
    fn utf16be() {
        let encoded = Encoding::Utf16Be.encode("hé").unwrap();
        assert_eq!(encoded, [0, b'h', 0, 0xE9]);
        assert_eq!(Encoding::Utf16Be.decode(&encoded).unwrap(), "hé");
    }

    #[test_log::test]
    fn malformed_input() {
        assert!(Encoding::Utf8.decode(&[0xC3]).is_err());
        assert!(Encoding::Utf16Be.decode(&[0x00, 0x41, 0x00]).is_err());
        // Lone high surrogate
        assert!(Encoding::Utf16Be.decode(&[0xD8, 0x00]).is_err());
    }

    #[test_log::test]
    fn terminators() {
        assert_eq!(find_terminator(b"abc\0def", Encoding::Latin1), Some((3, 4)));
        assert_eq!(find_terminator(b"abc", Encoding::Utf8), None);

        // An odd-aligned pair of zeros is not a terminator
        let data = [b'a', 0, 0, b'b', 0, 0, b'c', 0];
        assert_eq!(find_terminator(&data, Encoding::Utf16Be), Some((4, 6)));
        assert_eq!(find_terminator(&[0, b'a', 0, b'b'], Encoding::Utf16), None);
    }

    #[test_log::test]
    fn diff() {
        assert_eq!(encoded_diff(Encoding::Utf8, "Hello", Encoding::Utf8, "A").unwrap(), 4);
        assert_eq!(encoded_diff(Encoding::Utf16, "ab", Encoding::Latin1, "ab").unwrap(), 4);
        assert_eq!(encoded_diff(Encoding::Latin1, "", Encoding::Utf8, "é").unwrap(), -2);
        assert!(encoded_diff(Encoding::Latin1, "€", Encoding::Utf8, "").is_err());
    }

    #[test_log::test]
    fn genres() {
        assert_eq!(genre_index("Rock"), Some(17));
        assert_eq!(genre_index("rock"), Some(17));
        assert_eq!(genre_index("(17)"), Some(17));
        assert_eq!(genre_index("(17)Rock"), Some(17));
        assert_eq!(genre_index("8"), Some(8));
        assert_eq!(genre_index("999"), None);
        assert_eq!(genre_index("Not a genre"), None);
    }
}
