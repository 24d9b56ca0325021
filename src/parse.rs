use crate::pct_enc::{self, table::*, Table};
use core::{
    fmt,
    num::NonZeroUsize,
    ops::{Deref, DerefMut},
};

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected character or end of input.
    ///
    /// The error index points to the first byte of the character or the end of input.
    UnexpectedCharOrEnd,
    /// Invalid percent-encoded octet that is either non-hexadecimal or incomplete.
    ///
    /// The error index points to the percent character `"%"` of the octet.
    InvalidOctet,
}

/// An error occurred when parsing a URI reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the index at which the error occurred.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseErrorKind::UnexpectedCharOrEnd => "unexpected character or end of input",
            ParseErrorKind::InvalidOctet => "invalid percent-encoded octet",
        };
        write!(f, "{msg} at index {}", self.index)
    }
}

#[cfg(feature = "impl-error")]
impl crate::Error for ParseError {}

type Result<T> = core::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
        })
    };
}

/// Component bounds of a URI reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Meta {
    // The index of the trailing colon.
    pub scheme_end: Option<NonZeroUsize>,
    pub auth_bounds: Option<(usize, usize)>,
    pub path_bounds: (usize, usize),
    // One byte past the last byte of query.
    pub query_end: Option<NonZeroUsize>,
}

impl Meta {
    pub fn query_or_path_end(&self) -> usize {
        self.query_end.map_or(self.path_bounds.1, |i| i.get())
    }
}

pub(crate) fn parse(bytes: &[u8]) -> Result<Meta> {
    let mut parser = Parser {
        reader: Reader::new(bytes),
        out: Meta::default(),
    };
    parser.parse_from_scheme()?;
    Ok(parser.out)
}

/// URI reference parser.
///
/// # Invariants
///
/// `pos <= len` and `pos` is non-decreasing.
///
/// # Guarantees
///
/// When parsing succeeds, all output indexes are within bounds and correctly
/// ordered, and all components they define are validated.
struct Parser<'a> {
    reader: Reader<'a>,
    out: Meta,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Deref for Parser<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PathKind {
    General,
    AbEmpty,
    ContinuedNoScheme,
}

/// `pchar` without `":"`, for the first segment of a relative path.
const SEGMENT_NZ_NC: Table = PCHAR.sub(Table::new(b":"));

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    /// Reads as many bytes as the table allows, returning whether any was read.
    fn read(&mut self, table: Table) -> Result<bool> {
        let start = self.pos;
        let mut i = self.pos;

        while i < self.len() {
            let x = self.bytes[i];
            if x == b'%' && table.allows_pct_encoded() {
                match self.bytes[i + 1..] {
                    [hi, lo, ..] if pct_enc::is_hexdig_pair(hi, lo) => i += 3,
                    _ => err!(i, InvalidOctet),
                }
            } else if table.allows_ascii(x) {
                i += 1;
            } else {
                break;
            }
        }

        self.pos = i;
        Ok(self.pos > start)
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.skip(s.len());
            true
        } else {
            false
        }
    }
}

impl Parser<'_> {
    fn parse_from_scheme(&mut self) -> Result<()> {
        self.read(SCHEME)?;

        if self.peek(0) == Some(b':') {
            // Scheme starts with a letter.
            if self.pos > 0 && self.bytes[0].is_ascii_alphabetic() {
                self.out.scheme_end = NonZeroUsize::new(self.pos);
            } else {
                err!(0, UnexpectedCharOrEnd);
            }

            self.skip(1);
            return if self.read_str("//") {
                self.parse_from_authority()
            } else {
                self.parse_from_path(PathKind::General)
            };
        } else if self.pos == 0 && self.read_str("//") {
            return self.parse_from_authority();
        }
        // Scheme chars are valid for path.
        self.parse_from_path(PathKind::ContinuedNoScheme)
    }

    fn parse_from_authority(&mut self) -> Result<()> {
        let start = self.pos;
        self.read(AUTHORITY)?;
        self.out.auth_bounds = Some((start, self.pos));
        self.parse_from_path(PathKind::AbEmpty)
    }

    fn parse_from_path(&mut self, kind: PathKind) -> Result<()> {
        let path_start = match kind {
            PathKind::General | PathKind::AbEmpty => self.pos,
            PathKind::ContinuedNoScheme => {
                self.read(SEGMENT_NZ_NC)?;
                if self.peek(0) == Some(b':') {
                    // In a relative reference, the first path
                    // segment cannot contain a colon character.
                    err!(self.pos, UnexpectedCharOrEnd);
                }
                0
            }
        };

        if self.read(PATH)? && kind == PathKind::AbEmpty && self.bytes[path_start] != b'/' {
            err!(path_start, UnexpectedCharOrEnd);
        }

        self.out.path_bounds = (path_start, self.pos);

        if self.read_str("?") {
            self.read(QUERY)?;
            self.out.query_end = NonZeroUsize::new(self.pos);
        }

        if self.read_str("#") {
            self.read(FRAGMENT)?;
        }

        if self.has_remaining() {
            err!(self.pos, UnexpectedCharOrEnd);
        }
        Ok(())
    }
}
