//! Read and edit ID3v1 and ID3v2.2/2.3/2.4 tags in place.
//!
//! ```rust,no_run
//! use id3_rs::TaggedFile;
//!
//! # fn main() -> id3_rs::Result<()> {
//! let mut file = TaggedFile::open("song.mp3")?;
//! println!("{} - {}", file.tag().artist(), file.tag().title());
//!
//! file.tag_mut().set_title("Hello World")?;
//! file.close()?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod id3;

pub use crate::common::error::{Id3Error, Result};
pub use crate::config::{ParseOptions, WriteOptions};
pub use crate::id3::file::{TaggedBytes, TaggedFile};
pub use crate::id3::frame_types::{CommonField, FrameKind, FrameLayout, FrameType};
pub use crate::id3::frames::Frame;
pub use crate::id3::id3v1::Id3v1Tag;
pub use crate::id3::specs::Encoding;
pub use crate::id3::tags::{FrameMut, Id3v2Tag};
pub use crate::id3::{parse_tagger, Tagger};
