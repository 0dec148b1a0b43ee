//! Color string parsing for record render fields
//!
//! Render fields carry compact color strings: a foreground code with an
//! optional `&` prefix and an optional `^`-separated background code,
//! e.g. `&y`, `&w^k`, `c`, or `^b`.

use thiserror::Error;

/// Error type for color string parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// A component was not a single color code character
    #[error("malformed color string '{0}'")]
    Malformed(String),
}

/// Foreground/background code pair parsed from a color string.
///
/// Either side may be absent (`^b` has no foreground; `&y` has no
/// background). Codes are not validated against the palette here -
/// unknown codes surface as `None` at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSpec {
    pub foreground: Option<char>,
    pub background: Option<char>,
}

impl ColorSpec {
    /// Parse a color string like `&w^k`.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        let (fg_part, bg_part) = match s.split_once('^') {
            Some((fg, bg)) => (fg, Some(bg)),
            None => (s, None),
        };
        let foreground = parse_component(fg_part, s)?;
        let background = match bg_part {
            Some(bg) => {
                let code = parse_component(bg, s)?;
                if code.is_none() {
                    // a trailing '^' with nothing after it is malformed
                    return Err(ColorError::Malformed(s.to_string()));
                }
                code
            }
            None => None,
        };
        Ok(Self {
            foreground,
            background,
        })
    }

    /// The foreground code, or `default` when the string had none.
    pub fn foreground_or(&self, default: char) -> char {
        self.foreground.unwrap_or(default)
    }
}

/// One side of a color string: empty, or a single code with an optional
/// `&` prefix.
fn parse_component(part: &str, whole: &str) -> Result<Option<char>, ColorError> {
    let code = part.strip_prefix('&').unwrap_or(part);
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (None, _) if part.is_empty() => Ok(None),
        (None, _) => Err(ColorError::Malformed(whole.to_string())), // bare '&'
        (Some(c), None) => Ok(Some(c)),
        (Some(_), Some(_)) => Err(ColorError::Malformed(whole.to_string())),
    }
}
