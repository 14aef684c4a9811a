//! Chapter number codec
//!
//! Locates the rightmost numeric token in a URL or file name and rebuilds the
//! text around a substituted number. Both the prober and the bump tool go
//! through here so they agree on which number is "the chapter".

use crate::{UrlError, UrlResult};

/// A piece of text split around its rightmost numeric token
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterSplit<'a> {
    /// Everything before the token
    pub prefix: &'a str,

    /// The token as it appeared in the text (e.g. `"012"`, `"1.5"`)
    pub token: &'a str,

    /// The token's numeric value
    pub number: f64,

    /// Everything after the token
    pub suffix: &'a str,
}

impl<'a> ChapterSplit<'a> {
    /// Returns true if the chapter number is a whole number
    pub fn is_whole(&self) -> bool {
        is_whole(self.number)
    }

    /// Reassembles the original text unchanged
    pub fn restore(&self) -> String {
        format!("{}{}{}", self.prefix, self.token, self.suffix)
    }

    /// Rebuilds the text with `number` in place of the token
    pub fn with_number(&self, number: f64) -> String {
        format!("{}{}{}", self.prefix, render_number(number), self.suffix)
    }

    /// Every spelling of `number` worth probing, in probe order
    ///
    /// Whole numbers have a single spelling. Fractional numbers are tried as
    /// `12.5` first and then as `12-5`, since some sites put dashes in their
    /// chapter slugs.
    pub fn candidates(&self, number: f64) -> Vec<String> {
        if is_whole(number) {
            return vec![self.with_number(number)];
        }
        let rendered = render_number(number);
        vec![
            format!("{}{}{}", self.prefix, rendered, self.suffix),
            format!("{}{}{}", self.prefix, rendered.replace('.', "-"), self.suffix),
        ]
    }
}

/// Splits `text` on its rightmost positive number
///
/// See [`split_on_number_with`].
pub fn split_on_number(text: &str) -> UrlResult<ChapterSplit<'_>> {
    split_on_number_with(text, true)
}

/// Splits `text` on its rightmost number
///
/// A numeric token is a maximal run of ASCII digits with at most one internal
/// decimal point; it always starts and ends with a digit, so `".5"` yields `5`.
/// When `only_positive` is false a `-` directly before the token is absorbed
/// into it.
///
/// # Errors
///
/// Returns `UrlError::NoNumberFound` if `text` has no digits at all.
///
/// # Examples
///
/// ```
/// use chapter_scout::url::split_on_number;
///
/// let split = split_on_number("foo1.5-bar").unwrap();
/// assert_eq!(split.prefix, "foo");
/// assert_eq!(split.number, 1.5);
/// assert_eq!(split.suffix, "-bar");
/// ```
pub fn split_on_number_with(text: &str, only_positive: bool) -> UrlResult<ChapterSplit<'_>> {
    let bytes = text.as_bytes();
    let end = match bytes.iter().rposition(u8::is_ascii_digit) {
        Some(last) => last + 1,
        None => return Err(UrlError::NoNumberFound(text.to_string())),
    };

    let mut start = skip_digits_back(bytes, end);
    if start >= 2 && bytes[start - 1] == b'.' && bytes[start - 2].is_ascii_digit() {
        start = skip_digits_back(bytes, start - 1);
    }
    if !only_positive && start > 0 && bytes[start - 1] == b'-' {
        start -= 1;
    }

    // Digits, '.' and '-' are ASCII, so both indices sit on char boundaries
    let token = &text[start..end];
    let number = token
        .parse::<f64>()
        .map_err(|_| UrlError::NoNumberFound(text.to_string()))?;

    Ok(ChapterSplit {
        prefix: &text[..start],
        token,
        number,
        suffix: &text[end..],
    })
}

/// Renders a chapter number the way it is spelled in URLs
///
/// Whole numbers are written without a fractional part (`12`, not `12.0`);
/// everything else uses the shortest round-tripping float form (`12.5`).
pub fn render_number(number: f64) -> String {
    if is_whole(number) {
        format!("{:.0}", number)
    } else {
        number.to_string()
    }
}

fn is_whole(number: f64) -> bool {
    number.is_finite() && number.fract() == 0.0
}

fn skip_digits_back(bytes: &[u8], mut index: usize) -> usize {
    while index > 0 && bytes[index - 1].is_ascii_digit() {
        index -= 1;
    }
    index
}
