//! Asynchronous HTTP client for the comments backend

mod http_client;

use std::fs::{self, DirBuilder, File};
use std::io;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cookie_store::CookieStore;
use directories::ProjectDirs;
use futures::future::{self, Either};
use futures::{Future, IntoFuture, Stream};
use reqwest::header::LOCATION;
use reqwest::r#async::multipart::{Form, Part};
use reqwest::r#async::{ClientBuilder, Response};
use reqwest::RedirectPolicy;
use url::Url;

use crate::error::Error;
use crate::models::{Comment, CommentId, LoginState, NewComment, PageControls, UserStatus};

use self::http_client::{HttpClient, Query};

/// Path comments are listed from and posted to when no upload target is known
pub const DATA_PATH: &str = "/data";
const DELETE_PATH: &str = "/delete-data";
const USER_PATH: &str = "/user";
const UPLOAD_URL_PATH: &str = "/blobstore-upload-url";

/// Client for the comments section of a portfolio site
pub struct Client {
    http: HttpClient,
}

fn config_path() -> Result<PathBuf, Error> {
    ProjectDirs::from("rs", "portfolio", env!("CARGO_PKG_NAME"))
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::HomeNotFound)
}

fn cookie_store_path() -> Result<PathBuf, Error> {
    let mut cookie_store_path = config_path()?;
    cookie_store_path.push("cookies.json");
    Ok(cookie_store_path)
}

impl Client {
    /// Create a new client
    ///
    /// Will attempt to load the cookie store if it exists, so a session established earlier
    /// is reused.
    pub fn new(base_url: Url) -> Result<Self, Error> {
        let cookie_store_path = cookie_store_path()?;

        let cookies = if cookie_store_path.exists() {
            let cookie_file = BufReader::new(File::open(cookie_store_path)?);
            CookieStore::load_json(cookie_file).map_err(|_err| Error::CookieStore)?
        } else {
            CookieStore::default()
        };

        Self::with_cookies(base_url, cookies)
    }

    /// Create a client with the given cookie store instead of the saved one
    pub fn with_cookies(base_url: Url, cookies: CookieStore) -> Result<Self, Error> {
        // Redirects are observed rather than followed: `/user` redirects anonymous visitors to
        // the login page and a comment submission redirects back to the page
        let client = ClientBuilder::new()
            .redirect(RedirectPolicy::none())
            .use_rustls_tls()
            .build()?;
        let http = HttpClient::new(base_url, client, Arc::new(Mutex::new(cookies)));

        Ok(Client { http })
    }

    /// Save the cookie store so that the session survives to the next run
    pub fn save_cookies(&self) -> Result<(), Error> {
        let cookie_store_path = cookie_store_path()?;
        let cookie_store_tmp_path = cookie_store_path.with_extension("tmp");

        // Ensure the directory the cookie file is stored in exists
        let config_dir = cookie_store_path.parent().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "unable to find parent dir of cookie file",
            ))
        })?;

        if !config_dir.exists() {
            DirBuilder::new().recursive(true).create(config_dir)?;
        }

        {
            // Write out the file entirely
            let mut tmp_file = File::create(&cookie_store_tmp_path)?;
            self.http.save_cookies(&mut tmp_file)?;
        }

        // Move into place atomically
        fs::rename(cookie_store_tmp_path, cookie_store_path).map_err(Error::from)
    }

    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    /// Retrieve the comments of a page, in the order the server lists them
    pub fn comments(
        &self,
        controls: &PageControls,
    ) -> impl Future<Item = Vec<Comment>, Error = Error> {
        let query: Query = vec![
            ("comments-number", controls.comments_number.clone()),
            ("page", controls.page.clone()),
        ];

        self.http
            .get_json(DATA_PATH, query)
            .and_then(|res| res.error_for_status().map_err(Error::from))
            .and_then(|mut res| res.json::<Vec<Comment>>().map_err(Error::from))
    }

    /// Delete one comment, or every comment of the page when `id` is `None`
    pub fn delete(&self, page: &str, id: Option<&CommentId>) -> impl Future<Item = (), Error = Error> {
        let mut query: Query = vec![("page", page.to_string())];
        if let Some(id) = id {
            query.push(("id", id.0.clone()));
        }

        self.http
            .post(DELETE_PATH, query, None)
            .and_then(|res| res.error_for_status().map_err(Error::from))
            .map(|_res| ())
    }

    /// Ask the backend whether the viewer is logged in
    pub fn login_state(&self, path: &str) -> impl Future<Item = LoginState, Error = Error> {
        let query: Query = vec![("page", path.to_string())];

        self.http.get_json(USER_PATH, query).and_then(|res| {
            if res.status().is_redirection() {
                // Anonymous visitors are sent straight to the login page
                let login_url = res
                    .headers()
                    .get(LOCATION)
                    .and_then(|header| header.to_str().ok())
                    .map(|s| s.to_string());
                Either::A(future::ok::<_, Error>(LoginState::LoggedOut { login_url }))
            } else {
                Either::B(
                    res.error_for_status()
                        .map_err(Error::from)
                        .into_future()
                        .and_then(|mut res| res.json::<UserStatus>().map_err(Error::from))
                        .map(UserStatus::into_login_state),
                )
            }
        })
    }

    /// Request a one-time URL that comment submissions with an image are posted to
    pub fn upload_url(&self) -> impl Future<Item = String, Error = Error> {
        self.http
            .get(UPLOAD_URL_PATH, Query::new())
            .and_then(|res| res.error_for_status().map_err(Error::from))
            .and_then(Self::body_text)
            .map(|text| text.trim().to_string())
    }

    /// Post a new comment to `action`, or to the listing endpoint when there is none
    ///
    /// The upload endpoint only takes `multipart/form-data`, so that is what is sent either way.
    pub fn submit(
        &self,
        action: Option<&str>,
        comment: NewComment,
    ) -> impl Future<Item = (), Error = Error> {
        self.http
            .post(action.unwrap_or(DATA_PATH), Query::new(), Some(Self::comment_form(comment)))
            .and_then(|res| {
                // The backend answers a successful submission with a redirect to the page
                if res.status().is_redirection() {
                    Ok(())
                } else {
                    res.error_for_status().map(|_res| ()).map_err(Error::from)
                }
            })
    }

    fn comment_form(comment: NewComment) -> Form {
        let form = comment
            .fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        match comment.image {
            Some(image) => form.part("image", Part::bytes(image.bytes).file_name(image.file_name)),
            None => form,
        }
    }

    fn body_text(res: Response) -> impl Future<Item = String, Error = Error> {
        res.into_body()
            .concat2()
            .map_err(Error::from)
            .and_then(|body| {
                std::str::from_utf8(&body)
                    .map(|text| text.to_string())
                    .map_err(|_err| Error::InvalidStr)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;

    use tokio::runtime::current_thread::Runtime;

    use crate::models::{Attachment, Emotion};

    /// Answer one request with `response` and hand back the raw request
    fn serve_once(response: &'static str) -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _addr) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(request).unwrap();
        });

        (base_url, rx)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        let mut buf = [0; 4096];

        while !request_complete(&request) {
            let read = stream.read(&mut buf).unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
        }

        String::from_utf8_lossy(&request).into_owned()
    }

    fn request_complete(request: &[u8]) -> bool {
        let head_end = match request.windows(4).position(|w| w == b"\r\n\r\n") {
            Some(pos) => pos + 4,
            None => return false,
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();

        if head.contains("transfer-encoding: chunked") {
            return request.ends_with(b"0\r\n\r\n");
        }

        let length = head
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(2, ':');
                match (parts.next(), parts.next()) {
                    (Some("content-length"), Some(value)) => value.trim().parse::<usize>().ok(),
                    _ => None,
                }
            })
            .next()
            .unwrap_or(0);

        request.len() - head_end >= length
    }

    fn client(base_url: Url) -> Client {
        Client::with_cookies(base_url, CookieStore::default()).unwrap()
    }

    fn run<F: Future>(future: F) -> Result<F::Item, F::Error> {
        Runtime::new().unwrap().block_on(future)
    }

    fn controls() -> PageControls {
        PageControls {
            comments_number: "5".to_string(),
            page: "career".to_string(),
            path: "/career.html".to_string(),
        }
    }

    fn new_comment(image: Option<Attachment>) -> NewComment {
        NewComment {
            author: "Ada".to_string(),
            text: "hi".to_string(),
            emotion: Emotion::Sad,
            page: "career".to_string(),
            image,
        }
    }

    #[test]
    fn test_comments_query() {
        let (base_url, request) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 135\r\nConnection: close\r\n\r\n\
             [{\"content\":\"one\",\"userName\":\"Ada\",\"date\":\"2020-06-10T15:04:05Z\"},\
             {\"content\":\"two\",\"userName\":\"Bob\",\"date\":\"Jun 10, 2020, 3:04:05 PM\"}]",
        );

        let comments = run(client(base_url).comments(&controls())).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "one");
        assert_eq!(comments[1].author, "Bob");

        let request = request.recv().unwrap();
        assert!(request.starts_with("GET /data?comments-number=5&page=career HTTP/1.1"));
    }

    #[test]
    fn test_comments_server_error() {
        let (base_url, _request) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        match run(client(base_url).comments(&controls())) {
            Err(Error::Http(_)) => {}
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_one() {
        let (base_url, request) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        let id = CommentId("abc".to_string());
        run(client(base_url).delete("career", Some(&id))).unwrap();

        let request = request.recv().unwrap();
        assert!(request.starts_with("POST /delete-data?page=career&id=abc HTTP/1.1"));
    }

    #[test]
    fn test_delete_all() {
        let (base_url, request) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        run(client(base_url).delete("career", None)).unwrap();

        let request = request.recv().unwrap();
        assert!(request.starts_with("POST /delete-data?page=career HTTP/1.1"));
    }

    #[test]
    fn test_login_redirect_is_logged_out() {
        let (base_url, request) = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: /_ah/login?continue=x\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let state = run(client(base_url).login_state("/career.html")).unwrap();
        assert_eq!(
            state,
            LoginState::LoggedOut {
                login_url: Some("/_ah/login?continue=x".to_string())
            }
        );

        let request = request.recv().unwrap();
        assert!(request.starts_with("GET /user?page=%2Fcareer.html HTTP/1.1"));
    }

    #[test]
    fn test_login_json() {
        let (base_url, _request) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 38\r\nConnection: close\r\n\r\n\
             {\"loggedin\":\"true\",\"logoutUrl\":\"/out\"}",
        );

        let state = run(client(base_url).login_state("/career.html")).unwrap();
        assert_eq!(
            state,
            LoginState::LoggedIn {
                logout_url: Some("/out".to_string())
            }
        );
    }

    #[test]
    fn test_upload_url_is_trimmed() {
        let (base_url, request) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 33\r\nConnection: close\r\n\r\n\
             \n  http://up.example.com/_ah/x  \n",
        );

        let url = run(client(base_url).upload_url()).unwrap();
        assert_eq!(url, "http://up.example.com/_ah/x");

        let request = request.recv().unwrap();
        assert!(request.starts_with("GET /blobstore-upload-url HTTP/1.1"));
    }

    #[test]
    fn test_submit_multipart_with_image() {
        let (base_url, request) = serve_once(
            "HTTP/1.1 302 Found\r\nLocation: /career.html\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let action = base_url.join("/_ah/upload/AMmfu6abc").unwrap();
        let image = Attachment {
            file_name: "cat.png".to_string(),
            bytes: b"meow".to_vec(),
        };

        let client = client(base_url);
        run(client.submit(Some(action.as_str()), new_comment(Some(image)))).unwrap();

        let request = request.recv().unwrap();
        assert!(request.starts_with("POST /_ah/upload/AMmfu6abc HTTP/1.1"));
        assert!(request
            .to_lowercase()
            .contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains("name=\"author\""));
        assert!(request.contains("Ada"));
        assert!(request.contains("name=\"emotion\""));
        assert!(request.contains("name=\"image\"; filename=\"cat.png\""));
        assert!(request.contains("meow"));
    }

    #[test]
    fn test_submit_without_action_posts_to_data() {
        let (base_url, request) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        run(client(base_url).submit(None, new_comment(None))).unwrap();

        let request = request.recv().unwrap();
        assert!(request.starts_with("POST /data HTTP/1.1"));
        assert!(!request.contains("name=\"image\""));
    }

    #[test]
    fn test_submit_rejected() {
        let (base_url, _request) =
            serve_once("HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");

        assert!(run(client(base_url).submit(None, new_comment(None))).is_err());
    }
}
