//! Pure rendering of comments and page state
//!
//! Nothing here touches the network. The controller fetches, then swaps the output of these
//! functions into its `PageView`.

use chrono::Datelike;
use maud::{html, Markup};

use crate::models::{Comment, CommentId, Emotion, LoginState, PageControls, Timestamp};

/// Glyph on a rendered delete control
pub const DELETE_GLYPH: &str = "\u{2715}";

const EMOTIONS: [Emotion; 4] = [
    Emotion::Happy,
    Emotion::Laughing,
    Emotion::Surprised,
    Emotion::Sad,
];

/// One rendered entry of the comment list
#[derive(Debug, Clone, PartialEq)]
pub struct CommentItem {
    pub glyph: &'static str,
    pub author: String,
    pub contact: Option<String>,
    /// `posted` as shown on the page
    pub date: String,
    pub posted: Timestamp,
    pub text: String,
    /// Present only when the viewer may delete the comment
    pub delete: Option<DeleteControl>,
    pub image_url: Option<String>,
}

/// A delete button and the comment it removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteControl {
    /// `None` when the backend listed a deletable comment without an identifier
    pub target: Option<CommentId>,
}

/// State of the page regions the comment view owns
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub comments: Vec<CommentItem>,
    pub form_visible: bool,
    pub login_visible: bool,
    pub logout_visible: bool,
    pub login_url: Option<String>,
    pub logout_url: Option<String>,
    /// Where the submission form posts to, `None` leaves the page default
    pub form_action: Option<String>,
}

impl Emotion {
    pub fn glyph(self) -> &'static str {
        match self {
            Emotion::Happy => "\u{1F60A}",
            Emotion::Laughing => "\u{1F604}",
            Emotion::Surprised => "\u{1F632}",
            Emotion::Sad => "\u{1F614}",
        }
    }
}

/// `month/day/year` with the calendar month, no padding
pub fn format_date(timestamp: &Timestamp) -> String {
    let date = timestamp.naive().date();
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

pub fn render_comment(comment: &Comment) -> CommentItem {
    let delete = if comment.can_delete {
        Some(DeleteControl {
            target: comment.id.clone(),
        })
    } else {
        None
    };

    CommentItem {
        glyph: comment.emotion.glyph(),
        author: comment.author.clone(),
        contact: comment.contact.clone(),
        date: format_date(&comment.date),
        posted: comment.date,
        text: comment.text.clone(),
        delete,
        image_url: comment.image_url.clone().filter(|url| !url.is_empty()),
    }
}

/// Render every comment, keeping the server's order
pub fn render_comments(comments: &[Comment]) -> Vec<CommentItem> {
    comments.iter().map(render_comment).collect()
}

impl Default for PageView {
    /// The page as its markup ships: form and logout hidden, login prompt shown
    fn default() -> Self {
        PageView {
            comments: Vec::new(),
            form_visible: false,
            login_visible: true,
            logout_visible: false,
            login_url: None,
            logout_url: None,
            form_action: None,
        }
    }
}

impl PageView {
    /// Discard the rendered list and put `items` in its place
    pub fn replace_comments(&mut self, items: Vec<CommentItem>) {
        self.comments = items;
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
    }

    pub fn apply_login(&mut self, state: &LoginState) {
        match state {
            LoginState::LoggedIn { logout_url } => {
                self.form_visible = true;
                self.login_visible = false;
                self.logout_visible = true;
                self.logout_url = logout_url.clone();
            }
            // The page starts out in the logged out layout, only the target is new
            LoginState::LoggedOut { login_url } => {
                self.login_url = login_url.clone();
            }
        }
    }

    pub fn set_form_action(&mut self, action: String) {
        self.form_action = Some(action);
    }
}

fn display(visible: bool) -> &'static str {
    if visible {
        "display: block"
    } else {
        "display: none"
    }
}

fn comment_markup(item: &CommentItem) -> Markup {
    html! {
        li {
            div.comment-container {
                div {
                    (item.glyph) " "
                    b { (item.author) " " }
                    @if let Some(contact) = &item.contact {
                        i { (contact) }
                    }
                    @if let Some(control) = &item.delete {
                        button.delete-button type="button" data-id=[control.target.as_ref().map(|id| &id.0)] {
                            (DELETE_GLYPH)
                        }
                    }
                }
                i.date { (item.date) }
            }
            (item.text)
            @if let Some(url) = &item.image_url {
                img src=(url);
            }
        }
    }
}

/// HTML for the regions of the page the comment view owns
pub fn page_markup(view: &PageView, controls: &PageControls) -> Markup {
    html! {
        div id="user-login" style=(display(view.login_visible)) {
            @if let Some(url) = &view.login_url {
                a id="login-button" href=(url) { "Log in to comment" }
            } @else {
                "Log in to comment"
            }
        }
        div id="user-logout" style=(display(view.logout_visible)) {
            a id="logout-button" href=[view.logout_url.as_ref()] { "Log out" }
        }
        div id="comments-form" style=(display(view.form_visible)) {
            form id="form" method="POST" enctype="multipart/form-data" action=[view.form_action.as_ref()] {
                input type="hidden" name="page" value=(controls.page);
                input type="text" name="author" placeholder="Name";
                textarea name="text" {}
                select name="emotion" {
                    @for emotion in EMOTIONS.iter() {
                        option value=(emotion.as_str()) { (emotion.glyph()) " " (emotion.as_str()) }
                    }
                }
                input type="file" name="image";
                input type="submit";
            }
        }
        ul id="comments-container" {
            @for item in &view.comments {
                (comment_markup(item))
            }
        }
    }
}
