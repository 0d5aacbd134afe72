use std::borrow::Cow;
use std::ops::Range;

use memchr::memmem::{self, Finder};

/// Replace every occurrence of `current` in `data` with `new`.
///
/// Unlike [`crate::binary_replace`], the output may be shorter or longer than the input. Returns
/// the input unchanged (and borrowed) if `current` does not occur.
pub fn text_replace<'a>(data: &'a [u8], current: &str, new: &str) -> Cow<'a, [u8]> {
    if current.is_empty() {
        return Cow::Borrowed(data);
    }
    Replacer::new(current.as_bytes(), new.as_bytes()).replace(data, 0..data.len())
}

/// Replaces the occurrences of one prefix with another.
///
/// When `new` contains `current` (e.g., `/opt/app` to `/opt/app-v2`), an occurrence of `current`
/// that is part of an occurrence of `new` has already been relocated and is left alone, so that
/// relocating the same data twice yields the same bytes.
pub(crate) struct Replacer<'a> {
    finder: Finder<'a>,
    new: &'a [u8],
    /// The offsets at which `current` occurs within `new`.
    offsets: Vec<usize>,
}

impl<'a> Replacer<'a> {
    pub(crate) fn new(current: &'a [u8], new: &'a [u8]) -> Self {
        let finder = Finder::new(current);
        let offsets = memmem::find_iter(new, current).collect();
        Self {
            finder,
            new,
            offsets,
        }
    }

    /// Returns `true` if the occurrence of `current` at `position` lies within an occurrence of
    /// `new`.
    fn is_relocated(&self, haystack: &[u8], position: usize) -> bool {
        self.offsets.iter().any(|&offset| {
            position
                .checked_sub(offset)
                .is_some_and(|start| haystack[start..].starts_with(self.new))
        })
    }

    /// Iterate over the positions of the non-overlapping occurrences of `current` in
    /// `haystack[range]` that still need to be replaced.
    ///
    /// Positions are relative to `haystack`, which is also the context used to detect prior
    /// relocations.
    pub(crate) fn find_iter<'h>(
        &self,
        haystack: &'h [u8],
        range: Range<usize>,
    ) -> impl Iterator<Item = usize> {
        let offset = range.start;
        self.finder
            .find_iter(&haystack[range])
            .map(move |position| offset + position)
            .filter(move |&position| !self.is_relocated(haystack, position))
    }

    /// Replace the occurrences of `current` in `haystack[range]`, returning the replaced range.
    ///
    /// Borrows the range if nothing needs to be replaced.
    pub(crate) fn replace<'h>(&self, haystack: &'h [u8], range: Range<usize>) -> Cow<'h, [u8]> {
        let mut matches = self.find_iter(haystack, range.clone()).peekable();
        if matches.peek().is_none() {
            return Cow::Borrowed(&haystack[range]);
        }

        let needle = self.finder.needle().len();
        let mut output = Vec::with_capacity(range.len());
        let mut last = range.start;
        for start in matches {
            output.extend_from_slice(&haystack[last..start]);
            output.extend_from_slice(self.new);
            last = start + needle;
        }
        output.extend_from_slice(&haystack[last..range.end]);
        Cow::Owned(output)
    }
}
