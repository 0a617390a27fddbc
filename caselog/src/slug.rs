// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of arbitrary identifiers into filesystem-safe slugs.
//!
//! A slug consists only of lowercase ASCII letters, digits and single `-`
//! separators, and never starts or ends with a separator. For example,
//! `tests/test_sample.py::test_one[Ünïcode-1]` becomes
//! `tests-test-sample-py-test-one-unicode-1`, and `test_Привет` becomes
//! `test-privet`.

use deunicode::deunicode_char;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use xxhash_rust::xxh3::xxh3_64;

/// The slug used when an input contains no usable characters at all.
pub const EMPTY_SLUG: &str = "unnamed";

/// The maximum length of a slug in bytes.
///
/// Slugs become file and directory names, and most filesystems cap a single
/// component at 255 bytes.
pub const MAX_SLUG_LEN: usize = 128;

/// Length of the hash suffix appended to truncated slugs.
const HASH_SUFFIX_LEN: usize = 8;

/// Converts `input` into a slug, returning [`EMPTY_SLUG`] if nothing is left.
///
/// This never fails: unsafe characters are substituted or dropped rather than
/// rejected.
pub fn slugify(input: &str) -> String {
    try_slugify(input).unwrap_or_else(|| EMPTY_SLUG.to_owned())
}

/// Converts `input` into a slug, returning `None` if the input contains no
/// ASCII letters or digits after transliteration.
///
/// The algorithm:
///
/// 1. normalize the input (NFKC), drop stray combining marks, and
///    transliterate every other non-ASCII character to ASCII, so `ß` becomes
///    `ss` and `中` becomes `zhong`;
/// 2. lowercase ASCII letters;
/// 3. replace every run of other characters with a single `-`;
/// 4. trim separators from both ends;
/// 5. if the result is longer than [`MAX_SLUG_LEN`], truncate it and append a
///    hash of the full slug so distinct long inputs stay distinct.
pub fn try_slugify(input: &str) -> Option<String> {
    let mut builder = SlugBuilder::with_capacity(input.len());

    for ch in input.nfkc() {
        if ch.is_ascii() {
            builder.push(ch);
        } else if is_combining_mark(ch) {
            continue;
        } else {
            match deunicode_char(ch) {
                Some(ascii) => ascii.chars().for_each(|ch| builder.push(ch)),
                // Characters without a transliteration act as separators.
                None => builder.separate(),
            }
        }
    }

    builder.finish()
}

struct SlugBuilder {
    slug: String,
    pending_separator: bool,
}

impl SlugBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slug: String::with_capacity(capacity),
            pending_separator: false,
        }
    }

    fn push(&mut self, ch: char) {
        if ch.is_ascii_alphanumeric() {
            if self.pending_separator && !self.slug.is_empty() {
                self.slug.push('-');
            }
            self.pending_separator = false;
            self.slug.push(ch.to_ascii_lowercase());
        } else {
            self.separate();
        }
    }

    fn separate(&mut self) {
        self.pending_separator = true;
    }

    fn finish(self) -> Option<String> {
        if self.slug.is_empty() {
            None
        } else {
            Some(truncate_with_hash(self.slug))
        }
    }
}

fn truncate_with_hash(slug: String) -> String {
    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }

    let hash = xxh3_64(slug.as_bytes());
    // Slugs are pure ASCII, so any byte index is a char boundary.
    let prefix = slug[..MAX_SLUG_LEN - HASH_SUFFIX_LEN - 1].trim_end_matches('-');
    format!("{prefix}-{:08x}", hash & 0xFFFF_FFFF)
}
