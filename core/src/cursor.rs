//! Forward-only cursor over input tokens.

use crate::error::ValueError;

/// A forward-only view over a run of input tokens.
///
/// A cursor is either *multi*, holding the remaining raw argument list, or
/// *aligned*, holding exactly one value already isolated from its option, as with
/// `--name=value` or one element split out of a composite token. Decoders
/// consult [`is_aligned`](Cursor::is_aligned): booleans only read a literal
/// from an aligned cursor, and sequences only split aligned tokens.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Cursor;
///
/// let args = vec!["-v".to_string(), "run".to_string()];
/// let mut cursor = Cursor::multi(&args);
/// assert!(!cursor.is_aligned());
/// assert_eq!(cursor.next(), Some("-v"));
/// assert_eq!(cursor.next(), Some("run"));
/// assert!(cursor.at_end());
///
/// let mut value = Cursor::aligned("1,2,3");
/// assert!(value.is_aligned());
/// assert_eq!(value.next(), Some("1,2,3"));
/// ```
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    aligned: bool,
}

impl<'a> Cursor<'a> {
    /// Wraps a raw argument list.
    pub fn multi<S: AsRef<str>>(args: &'a [S]) -> Self {
        Self {
            tokens: args.iter().map(|s| AsRef::<str>::as_ref(s)).collect(),
            pos: 0,
            aligned: false,
        }
    }

    /// Wraps a single isolated value.
    pub fn aligned(token: &'a str) -> Self {
        Self {
            tokens: vec![token],
            pos: 0,
            aligned: true,
        }
    }

    /// Wraps a single token without marking it aligned.
    ///
    /// Used where one token stands for one whole occurrence of a repeatable
    /// option rather than a pre-split value.
    pub(crate) fn single(token: &'a str) -> Self {
        Self {
            tokens: vec![token],
            pos: 0,
            aligned: false,
        }
    }

    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Returns the token under the cursor and advances past it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.pos).copied()?;
        self.pos += 1;
        Some(token)
    }

    /// Like [`next`](Cursor::next) but reports exhaustion as
    /// [`ValueError::NoInputValue`].
    pub fn value(&mut self) -> Result<&'a str, ValueError> {
        self.next().ok_or(ValueError::NoInputValue)
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }
}
