//! Substitution engine.
//!
//! Variables are applied one at a time, in list order, over a single working
//! buffer. Each pass sees the output of the previous one, so a value that
//! contains `{{other}}` is rewritten if `other` comes later in the list.

use std::collections::HashMap;

use crate::template::scanner::{is_token_space, CLOSE, OPEN};

/// Variable name to replacement value.
pub type ValueMap = HashMap<String, String>;

pub const PAD_CHAR: char = '_';

/// Pads `value` with underscores to the width of `name`.
///
/// Lengths are counted in chars. A value at least as long as the name is
/// returned unchanged. Otherwise the deficit is split with the odd underscore
/// on the left: name `name`, value `B` gives `__B_`.
pub fn pad_value(name: &str, value: &str) -> String {
    let name_len = name.chars().count();
    let value_len = value.chars().count();
    if value_len >= name_len {
        return value.to_string();
    }

    let deficit = name_len - value_len;
    let right = deficit / 2;
    let left = right + deficit % 2;

    let mut padded = String::with_capacity(value.len() + deficit);
    padded.extend(std::iter::repeat(PAD_CHAR).take(left));
    padded.push_str(value);
    padded.extend(std::iter::repeat(PAD_CHAR).take(right));
    padded
}

/// Replaces every `{{ name }}` in `text` with `replacement`.
///
/// Whitespace inside the braces is ignored and `name` is compared literally.
/// The replacement is inserted as-is.
pub fn replace_token(text: &str, name: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(OPEN) {
        let start = cursor + offset;
        match match_named_token(text, start, name) {
            Some(end) => {
                out.push_str(&text[copied..start]);
                out.push_str(replacement);
                copied = end;
                cursor = end;
            }
            None => cursor = start + 1,
        }
    }

    out.push_str(&text[copied..]);
    out
}

/// Matches `{{`, optional whitespace, `name`, optional whitespace, `}}` at
/// `start`. Returns the offset just past the closing delimiter.
fn match_named_token(text: &str, start: usize, name: &str) -> Option<usize> {
    let rest = text[start..].strip_prefix(OPEN)?;
    let rest = rest.trim_start_matches(is_token_space).strip_prefix(name)?;
    let rest = rest.trim_start_matches(is_token_space).strip_prefix(CLOSE)?;
    Some(text.len() - rest.len())
}

/// Applies `values` to every variable in `variables`, in order.
///
/// Missing values are treated as empty strings and padded like any other
/// short value. Names with no matching token leave the text untouched.
pub fn substitute<S: AsRef<str>>(text: &str, variables: &[S], values: &ValueMap) -> String {
    let mut working = text.to_string();
    for name in variables {
        let name = name.as_ref();
        let value = values.get(name).map(String::as_str).unwrap_or_default();
        let replacement = pad_value(name, value);
        working = replace_token(&working, name, &replacement);
    }
    working
}
