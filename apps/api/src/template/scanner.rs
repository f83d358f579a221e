//! Placeholder token scanner.
//!
//! A token is `{{` + one or more characters that are not `}` + `}}`. The inner
//! text is trimmed to obtain the variable name. Capture always stops at the
//! first `}` after the opening delimiter, so `{{a{{b}}}}` yields the name
//! `a{{b` and leaves the trailing `}}` as plain text.

pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// Whitespace allowed around a name inside the braces. The byte order mark
/// counts, matching how browsers trim form input.
pub fn is_token_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Left-to-right iterator over the names of non-overlapping tokens in `text`.
/// Names are trimmed and may be empty; repeats are yielded every time.
pub struct TokenScanner<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> TokenScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }

    /// Byte offset of the next `{{` at or after `from`.
    fn find_token_start(&self, from: usize) -> Option<usize> {
        self.text[from..].find(OPEN).map(|offset| from + offset)
    }

    /// Given the offset of an opening `{{`, returns the byte offset just past
    /// the closing `}}`, or `None` if no token starts here.
    fn find_token_end(&self, start: usize) -> Option<usize> {
        let inner_start = start + OPEN.len();
        let first_close = self.text[inner_start..].find('}')? + inner_start;
        if first_close == inner_start {
            return None;
        }
        self.text[first_close..]
            .starts_with(CLOSE)
            .then_some(first_close + CLOSE.len())
    }

    /// Inner text between the delimiters of the token at `start..end`, trimmed.
    fn inner_name(&self, start: usize, end: usize) -> &'a str {
        self.text[start + OPEN.len()..end - CLOSE.len()].trim_matches(is_token_space)
    }
}

impl<'a> Iterator for TokenScanner<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.text.len() {
            let start = self.find_token_start(self.cursor)?;
            match self.find_token_end(start) {
                Some(end) => {
                    self.cursor = end;
                    return Some(self.inner_name(start, end));
                }
                // `{` is one byte, so start + 1 is always a char boundary.
                None => self.cursor = start + 1,
            }
        }
        None
    }
}

/// Returns the distinct variable names in `text`, in first-occurrence order.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut variables: Vec<String> = Vec::new();
    for name in TokenScanner::new(text) {
        if !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tokens_yields_empty() {
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("plain text with { single } braces").is_empty());
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        assert_eq!(extract_variables("{{a}}{{b}}{{a}}"), vec!["a", "b"]);
        assert_eq!(
            extract_variables("Dear {{name}}, your {{item}} ships to {{name}}."),
            vec!["name", "item"]
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(extract_variables("{{ name }}"), vec!["name"]);
        assert_eq!(extract_variables("{{\tname\n}} and {{name}}"), vec!["name"]);
    }

    #[test]
    fn test_names_are_case_and_inner_space_sensitive() {
        assert_eq!(
            extract_variables("{{Name}} {{name}} {{first name}}"),
            vec!["Name", "name", "first name"]
        );
    }

    #[test]
    fn test_whitespace_only_token_is_empty_name() {
        assert_eq!(extract_variables("{{   }} and {{ }}"), vec![""]);
    }

    #[test]
    fn test_nested_braces_stop_at_first_close() {
        assert_eq!(extract_variables("{{a{{b}}}}"), vec!["a{{b"]);
    }

    #[test]
    fn test_empty_and_broken_tokens_are_skipped() {
        assert!(extract_variables("{{}}").is_empty());
        assert!(extract_variables("{{a}b}}").is_empty());
        assert!(extract_variables("{{unterminated").is_empty());
        assert_eq!(extract_variables("{{ a } {{b}}"), vec!["b"]);
    }

    #[test]
    fn test_extra_open_brace_is_captured() {
        assert_eq!(extract_variables("{{{a}}"), vec!["{a"]);
    }

    #[test]
    fn test_scanner_yields_every_occurrence() {
        let names: Vec<_> = TokenScanner::new("x {{ a }} y {{b}} z {{a}}").collect();
        assert_eq!(names, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_byte_order_mark_is_trimmed() {
        assert_eq!(extract_variables("{{\u{feff}name\u{feff} }}"), vec!["name"]);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            extract_variables("Grüße {{ név }} — {{日付}}"),
            vec!["név", "日付"]
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "{{x}} {{y}} {{x}} {{ z }}";
        assert_eq!(extract_variables(text), extract_variables(text));
    }
}
