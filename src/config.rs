/// Options to control how tags are located and parsed
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
    pub(crate) read_id3v1: bool,
    pub(crate) new_tag_version: u8,
    pub(crate) max_tag_size: u32,
}

impl Default for ParseOptions {
    /// The defaults are as follows:
    ///
    /// ```rust,ignore
    /// ParseOptions {
    ///     read_id3v1: true,
    ///     new_tag_version: 3,
    ///     max_tag_size: 0x0FFF_FFFF,
    /// }
    /// ```
    fn default() -> Self {
        Self::new()
    }
}

impl ParseOptions {
    /// Version of the tag created for untagged storage
    pub const DEFAULT_NEW_TAG_VERSION: u8 = 3;

    /// Largest size representable in the 28-bit synch-safe header field
    pub const DEFAULT_MAX_TAG_SIZE: u32 = 0x0FFF_FFFF;

    /// Creates a new `ParseOptions`, alias for `Default` implementation
    ///
    /// ```rust
    /// use id3_rs::config::ParseOptions;
    ///
    /// let parse_options = ParseOptions::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            read_id3v1: true,
            new_tag_version: Self::DEFAULT_NEW_TAG_VERSION,
            max_tag_size: Self::DEFAULT_MAX_TAG_SIZE,
        }
    }

    /// Whether to fall back to an ID3v1 trailer when no ID3v2 tag is present
    ///
    /// ```rust
    /// use id3_rs::config::ParseOptions;
    ///
    /// // Untagged files without an ID3v2 tag get a fresh ID3v2 tag, even if they carry ID3v1.
    /// let parse_options = ParseOptions::new().read_id3v1(false);
    /// ```
    pub fn read_id3v1(&mut self, read_id3v1: bool) -> Self {
        self.read_id3v1 = read_id3v1;
        *self
    }

    /// Major version (2, 3 or 4) of the tag created when no tag is found
    pub fn new_tag_version(&mut self, new_tag_version: u8) -> Self {
        self.new_tag_version = new_tag_version;
        *self
    }

    /// Tags declaring a larger size than this are treated as absent
    pub fn max_tag_size(&mut self, max_tag_size: u32) -> Self {
        self.max_tag_size = max_tag_size;
        *self
    }
}

/// Options to control how edits are committed to storage
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
    pub(crate) chunk_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteOptions {
    /// Default size of the buffer used to relocate trailing data in files
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// Creates a new `WriteOptions`, alias for `Default` implementation
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Size of each read/write when shifting trailing file data
    ///
    /// ```rust
    /// use id3_rs::config::WriteOptions;
    ///
    /// let write_options = WriteOptions::new().chunk_size(4096);
    /// ```
    pub fn chunk_size(&mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        *self
    }
}
