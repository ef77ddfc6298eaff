use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use crate::common::error::Result;
use crate::common::util;
use crate::config::{ParseOptions, WriteOptions};
use crate::id3::writer;
use crate::id3::{parse_tagger, Tagger};

/// A tag bound to a seekable stream, usually a file opened for read/write.
pub struct TaggedFile<F = File> {
    tagger: Tagger,
    file: F,
    write_options: WriteOptions,
}

impl TaggedFile<File> {
    /// Open a file for read/write access and parse its tag.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(util::open_rw(path)?, ParseOptions::new())
    }
}

impl<F: Read + Write + Seek> TaggedFile<F> {
    pub fn parse(mut file: F, options: ParseOptions) -> Result<Self> {
        let tagger = parse_tagger(&mut file, options)?;
        Ok(TaggedFile {
            tagger,
            file,
            write_options: WriteOptions::new(),
        })
    }

    pub fn with_write_options(mut self, write_options: WriteOptions) -> Self {
        self.write_options = write_options;
        self
    }

    pub fn tag(&self) -> &Tagger {
        &self.tagger
    }

    pub fn tag_mut(&mut self) -> &mut Tagger {
        &mut self.tagger
    }

    /// Write pending edits. Does nothing when the tag is clean.
    ///
    /// Not atomic: on error the stream may be left partially rewritten.
    pub fn commit(&mut self) -> Result<()> {
        if !self.tagger.dirty() {
            return Ok(());
        }
        writer::write_tag_to_file(&mut self.file, &mut self.tagger, self.write_options)
    }

    /// Commit pending edits and release the stream, whether or not the commit succeeded.
    pub fn close(mut self) -> Result<()> {
        self.commit()
    }

    pub fn into_inner(self) -> F {
        self.file
    }
}

/// A tag bound to an in-memory copy of a file.
#[derive(Debug, Clone)]
pub struct TaggedBytes {
    tagger: Tagger,
    blob: Vec<u8>,
}

impl TaggedBytes {
    pub fn new(blob: Vec<u8>, options: ParseOptions) -> Result<Self> {
        let tagger = parse_tagger(&mut Cursor::new(&blob), options)?;
        Ok(TaggedBytes { tagger, blob })
    }

    pub fn tag(&self) -> &Tagger {
        &self.tagger
    }

    pub fn tag_mut(&mut self) -> &mut Tagger {
        &mut self.tagger
    }

    /// Apply pending edits to the buffer and return it.
    pub fn update_edits_into_bytes(&mut self) -> Result<&[u8]> {
        if self.tagger.dirty() {
            self.blob = writer::write_tag_to_bytes(&self.blob, &mut self.tagger)?;
        }
        Ok(&self.blob)
    }

    /// The buffer as last updated, without applying pending edits.
    pub fn into_bytes(self) -> Vec<u8> {
        self.blob
    }
}
