//! Hierarchical value paths.
//!
//! A [`Pxth`] is an ordered list of [`Segment`]s addressing a position inside
//! a `serde_json::Value` tree. This crate provides the path type itself, the
//! ancestor/descendant relations used to decide which subscribers a write
//! touches, and persistent (copy-on-write) accessors for reading and writing
//! at a path.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use stocked_path::{deep_get, deep_set, is_inner_path, Pxth};
//!
//! let parent = Pxth::parse("user").unwrap();
//! let name = Pxth::parse("user.name").unwrap();
//! assert!(is_inner_path(&parent, &name));
//!
//! let doc = json!({"user": {"name": "Ann"}});
//! let next = deep_set(&doc, &name, json!("Bob"));
//! assert_eq!(deep_get(&next, &name), Some(&json!("Bob")));
//! assert_eq!(deep_get(&doc, &name), Some(&json!("Ann")));
//! ```

use thiserror::Error;

pub mod parse;
pub mod tree;
pub mod types;

pub use parse::{
    escape_component, format_pointer, is_valid_index, parse_pointer, parse_pxth,
    unescape_component,
};
pub use tree::{deep_get, deep_get_mut, deep_set, deep_set_in_place, deep_unset, MAX_ARRAY_GAP};
pub use types::{Pxth, Segment};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PxthError {
    #[error("\"{path}\" is not sub path of \"{base}\"")]
    NotSubPath { base: Pxth, path: Pxth },
    #[error("root path has no parent")]
    NoParent,
    #[error("unterminated bracket or quote in path \"{text}\"")]
    Unterminated { text: String },
    #[error("JSON pointer \"{pointer}\" must start with '/'")]
    PointerInvalid { pointer: String },
}

/// Check if `path` lies strictly inside `base`.
///
/// # Example
///
/// ```
/// use stocked_path::{is_inner_path, Pxth};
///
/// let p = |s: &str| Pxth::parse(s).unwrap();
/// assert!(is_inner_path(&p("parent"), &p("parent.child")));
/// assert!(!is_inner_path(&p("hello"), &p("helloa")));
/// assert!(!is_inner_path(&p("parent"), &p("parent")));
/// ```
pub fn is_inner_path(base: &Pxth, path: &Pxth) -> bool {
    base.is_ancestor_of(path)
}

/// Check if `path` is `base` itself or lies inside it.
pub fn is_inner_or_same_path(base: &Pxth, path: &Pxth) -> bool {
    base.is_ancestor_or_same(path)
}

/// Check if two paths are equal.
pub fn same_pxth(a: &Pxth, b: &Pxth) -> bool {
    a == b
}

/// Returns `sub` relative to `base`.
///
/// # Errors
///
/// Returns [`PxthError::NotSubPath`] if `sub` is not inside (or equal to)
/// `base`.
pub fn relative_path(base: &Pxth, sub: &Pxth) -> Result<Pxth, PxthError> {
    sub.relative_to(base)
}

/// Finds the longest path that is an ancestor-or-equal of all `paths`.
///
/// Returns the root for an empty input or when nothing is shared.
///
/// # Example
///
/// ```
/// use stocked_path::{longest_common_path, Pxth};
///
/// let p = |s: &str| Pxth::parse(s).unwrap();
/// let paths = [p("hello.world"), p("hello.world.yes"), p("hello.world.bye.asdf")];
/// assert_eq!(longest_common_path(&paths), p("hello.world"));
/// assert!(longest_common_path(&[p("a"), p("b")]).is_root());
/// ```
pub fn longest_common_path<'a, I>(paths: I) -> Pxth
where
    I: IntoIterator<Item = &'a Pxth>,
{
    let mut iter = paths.into_iter();
    let Some(first) = iter.next() else {
        return Pxth::root();
    };
    let mut common = first.segments().len();
    for path in iter {
        common = first
            .segments()
            .iter()
            .zip(path.segments())
            .take(common)
            .take_while(|(a, b)| a == b)
            .count();
    }
    Pxth::new(first.segments()[..common].iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> Pxth {
        Pxth::parse(text).unwrap()
    }

    #[test]
    fn test_is_inner_path() {
        assert!(!is_inner_path(&p("hello"), &p("b")));
        assert!(!is_inner_path(&p("hello"), &p("chello")));
        assert!(!is_inner_path(&p("hello.asdf"), &p("hello.a")));
        assert!(is_inner_path(&p("hello"), &p("hello.asdf.asdf")));
        assert!(is_inner_path(&p("hello[0].bsdf"), &p("hello.0.bsdf.lol.k.w")));
        assert!(is_inner_path(&Pxth::root(), &p("a")));
        assert!(!is_inner_path(&p("a"), &Pxth::root()));
        assert!(is_inner_or_same_path(&p("a"), &p("a")));
        assert!(!is_inner_or_same_path(&p("a.b"), &p("a")));
    }

    #[test]
    fn test_longest_common_path() {
        assert!(longest_common_path(&[] as &[Pxth]).is_root());
        assert!(longest_common_path(&[Pxth::root()]).is_root());
        assert_eq!(longest_common_path(&[p("asdf")]), p("asdf"));
        assert_eq!(
            longest_common_path(&[p("asdf"), p("asdf.hello"), p("asdf.bye"), p("asdf.hello.bye")]),
            p("asdf")
        );
        assert_eq!(
            longest_common_path(&[
                p("hello.this.is.world"),
                p("hello.this.is.bye"),
                p("hello.this.is"),
            ]),
            p("hello.this.is")
        );
        assert!(longest_common_path(&[p("asdf.hello"), p("asdf.bye"), p("b")]).is_root());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(&p("hello.world"), &p("hello.world.asdf")).unwrap(), p("asdf"));
        assert_eq!(relative_path(&p("a.b.c"), &p("a.b.c.d.e")).unwrap(), p("d.e"));
        assert!(relative_path(&p("a"), &p("b")).is_err());
        assert!(relative_path(&Pxth::root(), &Pxth::root()).unwrap().is_root());
    }
}
