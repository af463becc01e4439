use std::io::Write;

use portfolio_comments::render::{CommentItem, PageView, DELETE_GLYPH};

use crate::{
    error::Error,
    text::{self, Line, Span},
    theme::Palette,
    util,
};

/// Columns comment text is indented by, under the author line
const INDENT: usize = 3;

pub fn render_view(view: &PageView, theme: &dyn Palette, width: usize) -> Vec<Line> {
    let mut lines = render_status(view, theme);
    lines.push(Line::new());

    if view.comments.is_empty() {
        lines.push(vec![Span::new("There are no comments to show.").italic()]);
        return lines;
    }

    for (i, item) in view.comments.iter().enumerate() {
        if i != 0 {
            lines.push(Line::new());
        }
        lines.extend(render_comment(item, theme, width));
    }

    lines
}

fn render_status(view: &PageView, theme: &dyn Palette) -> Vec<Line> {
    let mut lines = Vec::new();

    if view.logout_visible {
        let mut line = vec![Span::new("Logged in").fg(theme.status()).bold()];
        if let Some(url) = &view.logout_url {
            line.push(Span::new(" | log out: "));
            line.push(Span::new(url.as_str()).fg(theme.link()).italic());
        }
        lines.push(line);
    } else if view.login_visible {
        let mut line = vec![Span::new("Not logged in").fg(theme.status()).bold()];
        if let Some(url) = &view.login_url {
            line.push(Span::new(" | log in: "));
            line.push(Span::new(url.as_str()).fg(theme.link()).italic());
        }
        lines.push(line);
    }

    if view.form_visible {
        let action = view
            .form_action
            .as_ref()
            .map(String::as_str)
            .unwrap_or("the page default");
        lines.push(vec![
            Span::new("New comments post to "),
            Span::new(action).fg(theme.link()).italic(),
        ]);
    }

    lines
}

fn render_comment(item: &CommentItem, theme: &dyn Palette, width: usize) -> Vec<Line> {
    let mut lines = Vec::new();

    let mut header = vec![
        Span::new(format!("{} ", item.glyph)),
        Span::new(item.author.as_str()).fg(theme.author()).bold(),
    ];
    if let Some(contact) = &item.contact {
        header.push(Span::new(format!(" {}", contact)).fg(theme.contact()).italic());
    }
    if let Some(control) = &item.delete {
        let label = match &control.target {
            Some(id) => format!(" [{} {}]", DELETE_GLYPH, id),
            None => format!(" [{}]", DELETE_GLYPH),
        };
        header.push(Span::new(label).fg(theme.delete()));
    }
    lines.push(header);

    let when = format!(
        "{:indent$}{} ({})",
        "",
        item.date,
        util::humanize_date(&item.posted),
        indent = INDENT
    );
    lines.push(vec![Span::new(when).fg(theme.date()).faint()]);

    let text_width = width.saturating_sub(INDENT).max(1);
    for row in text::wrap(&item.text, text_width) {
        lines.push(vec![Span::new(format!("{:indent$}{}", "", row, indent = INDENT)).fg(theme.text())]);
    }

    if let Some(url) = &item.image_url {
        lines.push(vec![
            Span::new(format!("{:indent$}image: ", "", indent = INDENT)),
            Span::new(url.as_str()).fg(theme.image()).italic(),
        ]);
    }

    lines
}

/// Write `lines` to `out`, without any escape sequences when `plain`
pub fn write_lines<W: Write>(lines: &[Line], out: &mut W, plain: bool) -> Result<(), Error> {
    for line in lines {
        for span in line {
            if plain {
                write!(out, "{}", span.text())?;
            } else {
                write!(out, "{}", span)?;
            }
        }
        writeln!(out)?;
    }

    out.flush().map_err(Error::from)
}
