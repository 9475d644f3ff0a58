//! Parsing for `file:hunks` selectors.
//!
//! A selector names one file and the hunks of interest within it, so a
//! caller can look up the group each selected hunk was placed in.
//!
//! # Syntax
//!
//! `FILE:REFS` where `FILE` is a path (split at the last colon) and `REFS` is
//! a comma-separated list of:
//!
//! - `N` - the N-th hunk of the file, counting from 1
//! - `N..M` - hunks N through M (inclusive)
//!
//! # Examples
//!
//! ```
//! use git_churn::parse::{parse_hunk_refs, HunkRef};
//! use std::num::NonZeroU32;
//!
//! let refs = parse_hunk_refs("src/lib.rs:2,4..5").unwrap();
//! assert_eq!(refs.file, "src/lib.rs");
//! assert_eq!(refs.refs, vec![
//!     HunkRef::Single(NonZeroU32::new(2).unwrap()),
//!     HunkRef::Range(NonZeroU32::new(4).unwrap(), NonZeroU32::new(5).unwrap()),
//! ]);
//! assert!(refs.selects(1));
//! assert!(!refs.selects(2));
//! ```

use error_set::error_set;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res},
    multi::separated_list1,
    sequence::{delimited, separated_pair},
};
use std::num::NonZeroU32;

error_set! {
    /// Errors from parsing file:hunks selectors
    ParseError := {
        /// Input string does not contain a colon separator
        #[display("Invalid format '{input}': expected 'file:hunks'")]
        InvalidFormat { input: String },
        /// File name portion before the colon is empty or whitespace
        #[display("Invalid format '{input}': file name cannot be empty")]
        EmptyFileName { input: String },
        /// No hunk references provided after the colon
        #[display("No hunk references provided")]
        EmptyRefs,
        /// Hunk references are not a comma-separated list of numbers or ranges
        #[display("Invalid hunk references '{value}'")]
        InvalidHunkRefs { value: String },
        /// Range has start greater than end
        #[display("Invalid range {start}..{end}: start must be <= end")]
        InvalidRange { start: u32, end: u32 },
    }
}

/// A reference to hunks of a file, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub enum HunkRef {
    Single(NonZeroU32),
    /// Inclusive start and end
    Range(NonZeroU32, NonZeroU32),
}

impl HunkRef {
    /// Whether the zero-based `hunk_index` is referenced.
    pub fn selects(&self, hunk_index: usize) -> bool {
        let number = hunk_index as u64 + 1;
        match self {
            HunkRef::Single(n) => u64::from(n.get()) == number,
            HunkRef::Range(start, end) => {
                u64::from(start.get()) <= number && number <= u64::from(end.get())
            }
        }
    }
}

/// Parsed file reference with hunk selections.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHunkRefs {
    pub file: String,
    pub refs: Vec<HunkRef>,
}

impl FileHunkRefs {
    /// Whether any reference selects the zero-based `hunk_index`.
    pub fn selects(&self, hunk_index: usize) -> bool {
        self.refs.iter().any(|r| r.selects(hunk_index))
    }
}

/// Parse a `file:hunks` selector.
///
/// # Errors
///
/// Returns [`ParseError`] if:
/// - Input doesn't contain `:` separator
/// - File name is empty or whitespace
/// - No hunk references provided
/// - References are malformed, zero, or an inverted range
pub fn parse_hunk_refs(input: &str) -> Result<FileHunkRefs, ParseError> {
    let Some((file, refs)) = input.rsplit_once(':') else {
        return Err(ParseError::InvalidFormat {
            input: input.to_string(),
        });
    };

    let file = file.trim();
    if file.is_empty() {
        return Err(ParseError::EmptyFileName {
            input: input.to_string(),
        });
    }

    let refs = refs.trim();
    if refs.is_empty() {
        return Err(ParseError::EmptyRefs);
    }

    let (_, parsed) = all_consuming(hunk_refs)
        .parse(refs)
        .map_err(|_| ParseError::InvalidHunkRefs {
            value: refs.to_string(),
        })?;

    for r in &parsed {
        match r {
            HunkRef::Range(start, end) if start > end => {
                return Err(ParseError::InvalidRange {
                    start: start.get(),
                    end: end.get(),
                });
            }
            _ => {}
        }
    }

    Ok(FileHunkRefs {
        file: file.to_string(),
        refs: parsed,
    })
}

fn hunk_refs(input: &str) -> IResult<&str, Vec<HunkRef>> {
    separated_list1(delimited(space0, char(','), space0), hunk_ref).parse(input)
}

fn hunk_ref(input: &str) -> IResult<&str, HunkRef> {
    alt((
        map(
            separated_pair(hunk_number, tag(".."), hunk_number),
            |(start, end)| HunkRef::Range(start, end),
        ),
        map(hunk_number, HunkRef::Single),
    ))
    .parse(input)
}

fn hunk_number(input: &str) -> IResult<&str, NonZeroU32> {
    map_res(digit1, str::parse::<NonZeroU32>).parse(input)
}
