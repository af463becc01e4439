//! The seam between the controller and the network

use futures::Future;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Comment, CommentId, LoginState, NewComment, PageControls};

/// A request in flight against the backend
pub type BackendFuture<T> = Box<dyn Future<Item = T, Error = Error> + Send>;

/// The endpoints the comment view depends on
///
/// `Client` is the real implementation; anything that can answer these calls can drive a
/// `Controller`.
pub trait Backend: Send + Sync + 'static {
    /// `GET /data`
    fn comments(&self, controls: &PageControls) -> BackendFuture<Vec<Comment>>;

    /// `POST /delete-data`
    fn delete(&self, page: &str, id: Option<&CommentId>) -> BackendFuture<()>;

    /// `GET /user`
    fn login_state(&self, path: &str) -> BackendFuture<LoginState>;

    /// `GET /blobstore-upload-url`
    fn upload_url(&self) -> BackendFuture<String>;

    /// Submit the comment form to `action`
    fn submit(&self, action: Option<&str>, comment: NewComment) -> BackendFuture<()>;
}

impl Backend for Client {
    fn comments(&self, controls: &PageControls) -> BackendFuture<Vec<Comment>> {
        Box::new(Client::comments(self, controls))
    }

    fn delete(&self, page: &str, id: Option<&CommentId>) -> BackendFuture<()> {
        Box::new(Client::delete(self, page, id))
    }

    fn login_state(&self, path: &str) -> BackendFuture<LoginState> {
        Box::new(Client::login_state(self, path))
    }

    fn upload_url(&self) -> BackendFuture<String> {
        Box::new(Client::upload_url(self))
    }

    fn submit(&self, action: Option<&str>, comment: NewComment) -> BackendFuture<()> {
        Box::new(Client::submit(self, action, comment))
    }
}
