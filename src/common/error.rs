use thiserror::Error;

#[derive(Error, Debug)]
pub enum Id3Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("byte integer: invalid length {0}, at most 4 bytes are allowed")]
    InvalidLength(usize),

    #[error("byte integer: byte {byte:#04x} exceeds {bits} significant bits")]
    BitOverflow { byte: u8, bits: u8 },

    #[error("{encoding} error: {message}")]
    Encoding {
        encoding: &'static str,
        message: String,
    },

    #[error("ID3 unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("ID3 tag too large: {0} bytes")]
    TagTooLarge(u64),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Id3Error {
    pub(crate) fn encoding(encoding: &'static str, message: impl Into<String>) -> Self {
        Id3Error::Encoding {
            encoding,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Id3Error>;
