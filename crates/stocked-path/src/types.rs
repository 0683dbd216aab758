//! Type definitions for value paths.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::parse::{is_valid_index, parse_pxth};
use crate::PxthError;

/// A single step of a [`Pxth`].
///
/// Keys that spell a canonical array index (`"0"`, `"17"`, but not `"01"`)
/// are normalized to [`Segment::Index`] by every constructor in this crate,
/// so `arr.0` and `arr[0]` name the same location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawSegment")]
pub enum Segment {
    /// Object property.
    Key(String),
    /// Array slot (or a decimal object key).
    Index(usize),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSegment {
    Index(usize),
    Key(String),
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        match raw {
            RawSegment::Index(index) => Segment::Index(index),
            RawSegment::Key(key) => Segment::from(key),
        }
    }
}

impl Segment {
    /// Returns the segment as an object key.
    pub fn as_key(&self) -> String {
        match self {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }

    /// Turns a key spelling a canonical index into [`Segment::Index`].
    pub fn normalize(self) -> Segment {
        match self {
            Segment::Key(key) => Segment::from(key),
            index => index,
        }
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        if is_valid_index(&key) {
            if let Ok(index) = key.parse() {
                return Segment::Index(index);
            }
        }
        Segment::Key(key)
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::from(key.to_string())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Segment::Key(key) => serializer.serialize_str(key),
            Segment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

/// Immutable path into a value tree.
///
/// Paths compare and hash by content. The empty path is the root: it is an
/// ancestor of every other path and never a descendant of anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Vec<Segment>", try_from = "RawPxth")]
pub struct Pxth {
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPxth {
    Segments(Vec<Segment>),
    Text(String),
}

impl TryFrom<RawPxth> for Pxth {
    type Error = PxthError;

    fn try_from(raw: RawPxth) -> Result<Self, Self::Error> {
        match raw {
            RawPxth::Segments(segments) => Ok(Pxth { segments }),
            RawPxth::Text(text) => parse_pxth(&text),
        }
    }
}

impl From<Pxth> for Vec<Segment> {
    fn from(path: Pxth) -> Self {
        path.segments
    }
}

impl Pxth {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        Pxth {
            segments: segments
                .into_iter()
                .map(|segment| Into::<Segment>::into(segment).normalize())
                .collect(),
        }
    }

    /// The empty path.
    pub fn root() -> Self {
        Pxth::default()
    }

    /// Parses dotted/bracket notation (`a.b[0]["c.d"]`).
    pub fn parse(text: &str) -> Result<Self, PxthError> {
        parse_pxth(text)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the parent path.
    ///
    /// # Errors
    ///
    /// Returns [`PxthError::NoParent`] for the root path.
    pub fn parent(&self) -> Result<Pxth, PxthError> {
        match self.segments.split_last() {
            Some((_, parent)) => Ok(Pxth {
                segments: parent.to_vec(),
            }),
            None => Err(PxthError::NoParent),
        }
    }

    /// Concatenates `other` after `self`.
    pub fn join(&self, other: &Pxth) -> Pxth {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Pxth { segments }
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        let segment: Segment = segment.into();
        self.segments.push(segment.normalize());
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<Segment>) -> Pxth {
        let mut out = self.clone();
        out.push(segment);
        out
    }

    /// `true` when `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Pxth) -> bool {
        self.len() < other.len() && other.segments.starts_with(&self.segments)
    }

    /// `true` when `self` is an ancestor of `other` or equal to it.
    pub fn is_ancestor_or_same(&self, other: &Pxth) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// `true` when one path contains the other (in either direction).
    pub fn is_related(&self, other: &Pxth) -> bool {
        self.is_ancestor_or_same(other) || other.is_ancestor_or_same(self)
    }

    /// Strips `base` from the front of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`PxthError::NotSubPath`] when `base` is neither an ancestor
    /// of `self` nor equal to it.
    pub fn relative_to(&self, base: &Pxth) -> Result<Pxth, PxthError> {
        match self.segments.strip_prefix(base.segments.as_slice()) {
            Some(rest) => Ok(Pxth {
                segments: rest.to_vec(),
            }),
            None => Err(PxthError::NotSubPath {
                base: base.clone(),
                path: self.clone(),
            }),
        }
    }
}

impl<S: Into<Segment>> FromIterator<S> for Pxth {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Pxth::new(iter)
    }
}

impl fmt::Display for Pxth {
    /// Normalized dotted form, e.g. `array.0.value`. The root renders empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{index}")?;
                }
                Segment::Key(key) if needs_brackets(key) => {
                    f.write_str("[\"")?;
                    for ch in key.chars() {
                        if ch == '"' || ch == '\\' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{ch}")?;
                    }
                    f.write_str("\"]")?;
                }
                Segment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
            }
        }
        Ok(())
    }
}

fn needs_brackets(key: &str) -> bool {
    key.is_empty()
        || key.trim() != key
        || key.bytes().all(|b| b.is_ascii_digit())
        || key.contains(['.', '[', ']', '"', '\''])
}
