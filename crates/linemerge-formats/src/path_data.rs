//! SVG path-data and `points` attribute tokenizer.
//!
//! Only straight pieces become geometry. Curve and arc commands are
//! consumed for their end point (so relative commands after them stay
//! correct) but contribute no segments.
//!
//! The `svg` crate's own path parser yields `f32` parameters; this
//! tokenizer keeps full `f64` precision so coordinates survive the
//! rounding step unchanged.

use std::sync::LazyLock;

use linemerge_pipeline::Segment;
use regex::Regex;

use crate::error::FormatError;

/// A command letter or a number.
#[allow(clippy::expect_used)] // literal pattern
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[MmLlHhVvZzCcSsQqTtAa]|[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?")
        .expect("path-data token pattern")
});

/// A number, for `points` lists.
#[allow(clippy::expect_used)] // literal pattern
static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number pattern")
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(data: &str) -> Result<Vec<Token>, FormatError> {
    TOKEN
        .find_iter(data)
        .map(|m| {
            let text = m.as_str();
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => Ok(Token::Command(c)),
                _ => parse_number(text, "path data").map(Token::Number),
            }
        })
        .collect()
}

fn parse_number(text: &str, context: &str) -> Result<f64, FormatError> {
    text.parse().map_err(|_| FormatError::InvalidNumber {
        value: text.to_owned(),
        context: context.to_owned(),
    })
}

/// Number of parameters one repetition of `command` consumes.
const fn arity(command: char) -> usize {
    match command.to_ascii_uppercase() {
        'M' | 'L' | 'T' => 2,
        'H' | 'V' => 1,
        'S' | 'Q' => 4,
        'C' => 6,
        'A' => 7,
        _ => 0,
    }
}

/// Pen state while walking path data.
#[derive(Debug, Default)]
struct Pen {
    chains: Vec<Vec<(f64, f64)>>,
    current: (f64, f64),
    subpath_start: (f64, f64),
    drawing: bool,
    curves_skipped: usize,
}

impl Pen {
    fn resolve(&self, relative: bool, x: f64, y: f64) -> (f64, f64) {
        if relative {
            (self.current.0 + x, self.current.1 + y)
        } else {
            (x, y)
        }
    }

    fn move_to(&mut self, to: (f64, f64)) {
        self.current = to;
        self.subpath_start = to;
        self.drawing = false;
    }

    /// Move without drawing (end point of a skipped curve).
    fn jump_to(&mut self, to: (f64, f64)) {
        self.current = to;
        self.drawing = false;
        self.curves_skipped += 1;
    }

    fn line_to(&mut self, to: (f64, f64)) {
        if to == self.current {
            return;
        }
        if !self.drawing {
            self.chains.push(vec![self.current]);
            self.drawing = true;
        }
        if let Some(chain) = self.chains.last_mut() {
            chain.push(to);
        }
        self.current = to;
    }

    fn close(&mut self) {
        self.line_to(self.subpath_start);
        self.current = self.subpath_start;
    }

    fn apply(&mut self, command: char, args: &[f64]) {
        let relative = command.is_ascii_lowercase();
        match command.to_ascii_uppercase() {
            'M' => self.move_to(self.resolve(relative, args[0], args[1])),
            'L' => self.line_to(self.resolve(relative, args[0], args[1])),
            'H' => {
                let x = if relative {
                    self.current.0 + args[0]
                } else {
                    args[0]
                };
                self.line_to((x, self.current.1));
            }
            'V' => {
                let y = if relative {
                    self.current.1 + args[0]
                } else {
                    args[0]
                };
                self.line_to((self.current.0, y));
            }
            'C' | 'S' | 'Q' | 'T' | 'A' => {
                let n = args.len();
                self.jump_to(self.resolve(relative, args[n - 2], args[n - 1]));
            }
            _ => {}
        }
    }
}

/// Parse path data into chains of connected straight pieces.
///
/// Each chain has at least two points. A `Z` closes back to the
/// subpath start, so a closed rectangle yields one five-point chain.
///
/// # Errors
///
/// Returns [`FormatError::InvalidNumber`] if a numeric token cannot be
/// parsed.
///
/// # Examples
///
/// ```
/// use linemerge_formats::path_data::parse_path;
///
/// let chains = parse_path("M0,0 h10 v10 H0 z")?;
/// assert_eq!(
///     chains,
///     vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]]
/// );
/// # Ok::<(), linemerge_formats::FormatError>(())
/// ```
pub fn parse_path(data: &str) -> Result<Vec<Vec<(f64, f64)>>, FormatError> {
    let mut pen = Pen::default();
    let mut command: Option<char> = None;
    let mut args: Vec<f64> = Vec::with_capacity(7);

    for token in tokenize(data)? {
        match token {
            Token::Command(c) if c.eq_ignore_ascii_case(&'z') => {
                args.clear();
                pen.close();
                command = None;
            }
            Token::Command(c) => {
                args.clear();
                command = Some(c);
            }
            Token::Number(n) => {
                let Some(c) = command else {
                    continue;
                };
                args.push(n);
                if args.len() == arity(c) {
                    pen.apply(c, &args);
                    args.clear();
                    // Coordinate pairs after a move are implicit lines.
                    command = match c {
                        'M' => Some('L'),
                        'm' => Some('l'),
                        other => Some(other),
                    };
                }
            }
        }
    }

    if pen.curves_skipped > 0 {
        tracing::warn!(
            count = pen.curves_skipped,
            "skipped curve commands in path data (only straight segments are kept)",
        );
    }

    Ok(pen.chains)
}

/// Parse path data into raw segments, one per straight piece.
///
/// # Errors
///
/// Same as [`parse_path`].
pub fn path_segments(data: &str) -> Result<Vec<Segment>, FormatError> {
    Ok(parse_path(data)?
        .iter()
        .flat_map(|chain| chain.windows(2).map(|w| Segment::new(w[0], w[1])))
        .collect())
}

/// Parse a `points` attribute (`<polyline>`, `<polygon>`) into
/// coordinate pairs. A trailing unpaired number is ignored.
///
/// # Errors
///
/// Returns [`FormatError::InvalidNumber`] if a number cannot be parsed.
pub fn parse_points(points: &str) -> Result<Vec<(f64, f64)>, FormatError> {
    let numbers = NUMBER
        .find_iter(points)
        .map(|m| parse_number(m.as_str(), "points"))
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(numbers.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}
