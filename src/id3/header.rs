use std::fmt;

use crate::common::error::{Id3Error, Result};

/// Length of the ID3v2 header (and of the optional v2.4 footer).
pub const HEADER_SIZE: usize = 10;

/// Number of bytes an encoded integer occupies.
pub const BYTES_PER_INT: usize = 4;

/// Bit-padded integer codec used for ID3v2 size fields.
///
/// Synch-safe integers use 7 significant bits per byte (MSB is always 0),
/// normal integers use all 8 bits.
pub struct BitPaddedInt;

impl BitPaddedInt {
    pub const SYNCHSAFE_BITS: u8 = 7;
    pub const NORMAL_BITS: u8 = 8;

    /// Decode an integer from at most 4 bytes, most significant chunk first.
    /// `bits` is the number of significant bits per byte.
    pub fn decode(data: &[u8], bits: u8) -> Result<u32> {
        if data.len() > BYTES_PER_INT {
            return Err(Id3Error::InvalidLength(data.len()));
        }

        let mut result: u32 = 0;
        for &b in data {
            if bits < Self::NORMAL_BITS && u32::from(b) >= (1u32 << bits) {
                return Err(Id3Error::BitOverflow { byte: b, bits });
            }
            result = (result << bits) | u32::from(b);
        }
        Ok(result)
    }

    /// Decode standard synch-safe (7 bits per byte).
    pub fn syncsafe(data: &[u8]) -> Result<u32> {
        Self::decode(data, Self::SYNCHSAFE_BITS)
    }

    /// Decode as normal big-endian integer (8 bits per byte).
    pub fn normal(data: &[u8]) -> Result<u32> {
        Self::decode(data, Self::NORMAL_BITS)
    }

    /// Encode an integer into exactly 4 bytes, `bits` significant bits per byte.
    /// Bits that do not fit are discarded.
    pub fn encode(value: u32, bits: u8) -> [u8; BYTES_PER_INT] {
        let mask = ((1u64 << bits) - 1) as u32;
        let mut result = [0u8; BYTES_PER_INT];
        let mut val = value;
        for byte in result.iter_mut().rev() {
            *byte = (val & mask) as u8;
            val = val.checked_shr(u32::from(bits)).unwrap_or(0);
        }
        result
    }

    pub fn syncsafe_bytes(value: u32) -> [u8; BYTES_PER_INT] {
        Self::encode(value, Self::SYNCHSAFE_BITS)
    }

    pub fn normal_bytes(value: u32) -> [u8; BYTES_PER_INT] {
        Self::encode(value, Self::NORMAL_BITS)
    }

    /// Largest value representable with `bits` significant bits in `width` bytes.
    pub fn max_value(bits: u8, width: usize) -> u64 {
        (1u64 << (u32::from(bits) * width as u32)) - 1
    }
}

/// ID3v2 header flags, interpreted per major version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ID3Flags {
    pub unsynchronisation: bool,
    /// ID3v2.2 only
    pub compression: bool,
    /// ID3v2.3 and ID3v2.4
    pub extended: bool,
    /// ID3v2.3 and ID3v2.4
    pub experimental: bool,
    /// ID3v2.4 only
    pub footer: bool,
}

impl ID3Flags {
    pub fn from_byte(flags: u8, major: u8) -> Self {
        let unsynchronisation = flags & 0x80 != 0;
        match major {
            2 => ID3Flags {
                unsynchronisation,
                compression: flags & 0x40 != 0,
                ..ID3Flags::default()
            },
            _ => ID3Flags {
                unsynchronisation,
                extended: flags & 0x40 != 0,
                experimental: flags & 0x20 != 0,
                footer: major == 4 && flags & 0x10 != 0,
                ..ID3Flags::default()
            },
        }
    }
}

/// Parsed ID3v2 header (10 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ID3Header {
    pub version: (u8, u8), // (major, revision) e.g. (4, 0) for ID3v2.4
    pub flags_byte: u8,
    pub flags: ID3Flags,
    pub size: u32, // Tag size excluding header, including padding
}

impl ID3Header {
    /// A blank header for a fresh tag.
    pub fn new(major: u8) -> Self {
        ID3Header {
            version: (major, 0),
            flags_byte: 0,
            flags: ID3Flags::default(),
            size: 0,
        }
    }

    /// Parse an ID3v2 header from the first 10 bytes.
    ///
    /// Returns `Ok(None)` if the data does not start with an ID3v2 header.
    /// A size field that is not synch-safe is reported as an error.
    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        if data.len() < HEADER_SIZE || &data[0..3] != b"ID3" {
            return Ok(None);
        }

        let major = data[3];
        let revision = data[4];
        let flags_byte = data[5];

        // Size is always synch-safe in the header
        let size = BitPaddedInt::syncsafe(&data[6..10])?;

        Ok(Some(ID3Header {
            version: (major, revision),
            flags_byte,
            flags: ID3Flags::from_byte(flags_byte, major),
            size,
        }))
    }

    pub fn major(&self) -> u8 {
        self.version.0
    }

    /// Serialize the header with its current size.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        self.render(b"ID3")
    }

    /// Serialize the matching v2.4 footer.
    pub fn footer_bytes(&self) -> [u8; HEADER_SIZE] {
        self.render(b"3DI")
    }

    fn render(&self, magic: &[u8; 3]) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..3].copy_from_slice(magic);
        out[3] = self.version.0;
        out[4] = self.version.1;
        out[5] = self.flags_byte;
        out[6..10].copy_from_slice(&BitPaddedInt::syncsafe_bytes(self.size));
        out
    }

    /// Full tag size including 10-byte header (and optional 10-byte footer).
    pub fn full_size(&self) -> u64 {
        let mut s = u64::from(self.size) + HEADER_SIZE as u64;
        if self.flags.footer {
            s += HEADER_SIZE as u64;
        }
        s
    }
}

impl fmt::Display for ID3Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "2.{}.{}", self.version.0, self.version.1)
    }
}
