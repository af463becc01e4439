//! The comment view controller
//!
//! Every operation goes through a `Backend` and writes its result into a shared `PageView`.
//! Requests are independent of each other; whichever finishes last wins its own region of the
//! view.

use std::fmt;
use std::sync::{Arc, Mutex};

use futures::future::{self, Either};
use futures::Future;
use log::{debug, warn};

use crate::backend::Backend;
use crate::error::Error;
use crate::models::{CommentId, LoginState, NewComment, PageControls};
use crate::render::{self, DeleteControl, PageView};

pub struct Controller<B> {
    backend: Arc<B>,
    controls: PageControls,
    view: Arc<Mutex<PageView>>,
}

/// The requests issued when the page loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Login,
    Comments,
    UploadTarget,
}

/// Outcome of each startup request
#[derive(Debug)]
pub struct Startup {
    pub login: Result<LoginState, Error>,
    /// Number of comments rendered
    pub comments: Result<usize, Error>,
    pub upload_target: Result<String, Error>,
}

#[derive(Debug)]
pub enum DeleteOutcome {
    /// Every comment of the page was removed from the view
    Cleared,
    /// A single comment was deleted and the page loaded again
    Reloaded(Startup),
}

impl<B> Clone for Controller<B> {
    fn clone(&self) -> Self {
        Controller {
            backend: self.backend.clone(),
            controls: self.controls.clone(),
            view: self.view.clone(),
        }
    }
}

impl<B: Backend> Controller<B> {
    pub fn new(backend: B, controls: PageControls) -> Self {
        Controller {
            backend: Arc::new(backend),
            controls,
            view: Arc::new(Mutex::new(PageView::default())),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn controls(&self) -> &PageControls {
        &self.controls
    }

    /// A snapshot of the page as rendered so far
    pub fn view(&self) -> PageView {
        self.view.lock().unwrap().clone()
    }

    /// Fetch the comment list and replace the rendered list with it
    ///
    /// Resolves to the number of comments rendered. On failure the previous list stays.
    pub fn load_comments(&self) -> impl Future<Item = usize, Error = Error> {
        let view = self.view.clone();

        self.backend.comments(&self.controls).map(move |comments| {
            let items = render::render_comments(&comments);
            let count = items.len();
            debug!("rendering {} comments", count);
            view.lock().unwrap().replace_comments(items);
            count
        })
    }

    /// Fetch the login state and show the form and logout control when logged in
    pub fn resolve_login(&self) -> impl Future<Item = LoginState, Error = Error> {
        let view = self.view.clone();

        self.backend
            .login_state(&self.controls.path)
            .map(move |state| {
                debug!("login state: {:?}", state);
                view.lock().unwrap().apply_login(&state);
                state
            })
    }

    /// Fetch a fresh upload URL and make it the form's destination
    pub fn resolve_upload_target(&self) -> impl Future<Item = String, Error = Error> {
        let view = self.view.clone();

        self.backend.upload_url().map(move |url| {
            debug!("form action: {}", url);
            view.lock().unwrap().set_form_action(url.clone());
            url
        })
    }

    /// The URL to send the viewer to for logging in, `None` when already logged in
    pub fn login_redirect(&self) -> impl Future<Item = Option<String>, Error = Error> {
        self.backend
            .login_state(&self.controls.path)
            .map(|state| match state {
                LoginState::LoggedOut { login_url } => login_url,
                LoginState::LoggedIn { .. } => None,
            })
    }

    /// Everything the page does when it loads
    ///
    /// The three requests run concurrently and none waits on another. A failure is recorded in
    /// the returned `Startup` and does not stop the other two.
    pub fn start(&self) -> impl Future<Item = Startup, Error = ()> {
        let login = self.resolve_login().then(Ok::<_, ()>);
        let comments = self.load_comments().then(Ok::<_, ()>);
        let upload_target = self.resolve_upload_target().then(Ok::<_, ()>);

        login
            .join3(comments, upload_target)
            .map(|(login, comments, upload_target)| {
                let startup = Startup {
                    login,
                    comments,
                    upload_target,
                };
                for (request, err) in startup.failures() {
                    warn!("{} request failed: {}", request, err);
                }
                startup
            })
    }

    /// Reset the view to the page's initial state and start again
    pub fn reload(&self) -> impl Future<Item = Startup, Error = ()> {
        let controller = self.clone();

        future::lazy(move || {
            *controller.view.lock().unwrap() = PageView::default();
            controller.start()
        })
    }

    /// Delete one comment, or every comment of the page when `id` is `None`
    ///
    /// The delete request is spawned and never awaited; its failure is only logged. Deleting
    /// everything clears the rendered list straight away, deleting one comment reloads the
    /// page. Must be polled from within a tokio executor.
    pub fn delete(&self, id: Option<CommentId>) -> impl Future<Item = DeleteOutcome, Error = ()> {
        let request = self
            .backend
            .delete(&self.controls.page, id.as_ref())
            .map_err(|err| warn!("delete request failed: {}", err));
        let controller = self.clone();

        future::lazy(move || {
            tokio::spawn(request);

            match id {
                None => {
                    controller.view.lock().unwrap().clear_comments();
                    Either::A(future::ok::<_, ()>(DeleteOutcome::Cleared))
                }
                Some(_) => Either::B(controller.reload().map(DeleteOutcome::Reloaded)),
            }
        })
    }

    /// Act on a rendered delete control
    ///
    /// A control without a target is refused instead of being taken as "delete all".
    pub fn delete_item(
        &self,
        control: &DeleteControl,
    ) -> Result<impl Future<Item = DeleteOutcome, Error = ()>, Error> {
        match &control.target {
            Some(id) => Ok(self.delete(Some(id.clone()))),
            None => Err(Error::MissingCommentId),
        }
    }

    /// Submit a new comment to the form's current destination
    pub fn submit(&self, comment: NewComment) -> impl Future<Item = (), Error = Error> {
        let action = self.view.lock().unwrap().form_action.clone();
        self.backend.submit(action.as_ref().map(String::as_str), comment)
    }
}

impl Startup {
    /// The startup requests that failed, in a fixed order
    pub fn failures(&self) -> impl Iterator<Item = (Request, &Error)> {
        let login = self.login.as_ref().err().map(|err| (Request::Login, err));
        let comments = self.comments.as_ref().err().map(|err| (Request::Comments, err));
        let upload_target = self
            .upload_target
            .as_ref()
            .err()
            .map(|err| (Request::UploadTarget, err));

        login.into_iter().chain(comments).chain(upload_target)
    }

    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Request::Login => "login state",
            Request::Comments => "comment list",
            Request::UploadTarget => "upload target",
        };
        f.write_str(name)
    }
}
