use std::fmt::{self, Display};

use termion::color::{Color as Colour, Fg};
use termion::style::{Bold, Faint, Italic, NoBold, NoFaint, NoItalic};

/// A run of styled text
///
/// Example:
///
/// ```
/// use portfolio_comments_cli::text::Span;
///
/// let span = Span::new("Ada").fg(Box::new(termion::color::Red)).bold();
/// assert_eq!(span.cols(), 3);
/// ```
pub struct Span {
    text: String,
    fg: Option<Box<dyn Colour>>,
    bold: bool,
    italic: bool,
    faint: bool,
}

pub type Line = Vec<Span>;

impl Span {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Span {
            text: text.into(),
            fg: None,
            bold: false,
            italic: false,
            faint: false,
        }
    }

    pub fn fg(mut self, colour: Box<dyn Colour>) -> Self {
        self.fg = Some(colour);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn faint(mut self) -> Self {
        self.faint = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of terminal columns the text occupies
    pub fn cols(&self) -> usize {
        cols(&self.text)
    }
}

/// Terminal columns taken by `text`, control characters count as nothing
pub fn cols(text: &str) -> usize {
    text.chars()
        .map(|c| wcwidth::char_width(c).map(usize::from).unwrap_or(0))
        .sum()
}

/// Break `text` into lines of at most `width` columns, on whitespace where possible
///
/// A word wider than `width` gets a line of its own rather than being split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_cols = 0;

        for word in paragraph.split_whitespace() {
            let word_cols = cols(word);
            if line_cols > 0 && line_cols + 1 + word_cols > width {
                lines.push(std::mem::replace(&mut line, String::new()));
                line_cols = 0;
            }
            if line_cols > 0 {
                line.push(' ');
                line_cols += 1;
            }
            line.push_str(word);
            line_cols += word_cols;
        }

        lines.push(line);
    }

    lines
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(colour) = &self.fg {
            write!(f, "{}", Fg(colour.as_ref()))?;
        }
        if self.bold {
            write!(f, "{}", Bold)?;
        }
        if self.faint {
            write!(f, "{}", Faint)?;
        }
        if self.italic {
            write!(f, "{}", Italic)?;
        }

        write!(f, "{}", self.text)?;

        if self.italic {
            write!(f, "{}", NoItalic)?;
        }
        if self.faint {
            write!(f, "{}", NoFaint)?;
        }
        if self.bold {
            write!(f, "{}", NoBold)?;
        }
        if self.fg.is_some() {
            write!(f, "{}", Fg(termion::color::Reset))?;
        }

        Ok(())
    }
}
