use std::fs::File;
use std::sync::{Arc, Mutex};

use cookie_store::CookieStore;
use futures::{Future, IntoFuture};
use log::info;
use reqwest::header::{HeaderMap, ACCEPT, COOKIE, SET_COOKIE};
use reqwest::r#async::multipart::Form;
use reqwest::r#async::{Client as ReqwestClient, Response};
use url::Url;

use crate::error::Error;

/// Query parameters, forwarded as given
pub(super) type Query = Vec<(&'static str, String)>;

#[derive(Clone)]
pub(super) struct HttpClient {
    base_url: Url,
    reqwest: ReqwestClient,
    cookies: Arc<Mutex<CookieStore>>,
}

impl HttpClient {
    pub(super) fn new(
        base_url: Url,
        reqwest: ReqwestClient,
        cookies: Arc<Mutex<CookieStore>>,
    ) -> Self {
        HttpClient {
            base_url,
            reqwest,
            cookies,
        }
    }

    /// POST to `target`, which may be a path on the site or an absolute URL
    pub(super) fn post(
        &self,
        target: &str,
        query: Query,
        form: Option<Form>,
    ) -> impl Future<Item = Response, Error = Error> {
        let request_url = self.base_url.join(target);
        let client = self.reqwest.clone();

        let cookie_set: Arc<Mutex<_>> = self.cookies.clone();
        let cookie_get: Arc<Mutex<_>> = self.cookies.clone();
        request_url
            .map_err(Error::from)
            .into_future()
            .and_then(move |url| {
                info!("POST {}", url.as_str());

                let request = client
                    .post(url.as_str())
                    .query(&query)
                    .headers(Self::cookie_headers(cookie_get, &url));
                let request = match form {
                    Some(form) => request.multipart(form),
                    None => request,
                };

                request.send().map_err(Error::from)
            })
            .map(move |res| Self::store_cookies(res, cookie_set))
    }

    pub(super) fn get(&self, path: &str, query: Query) -> impl Future<Item = Response, Error = Error> {
        let request_url = self.base_url.join(path);
        let client = self.reqwest.clone();

        let cookie_get: Arc<Mutex<_>> = self.cookies.clone();
        let cookie_set: Arc<Mutex<_>> = self.cookies.clone();
        request_url
            .map_err(Error::from)
            .into_future()
            .and_then(move |url| {
                info!("GET {}", url.as_str());

                client
                    .get(url.as_str())
                    .query(&query)
                    .headers(Self::cookie_headers(cookie_get, &url))
                    .send()
                    .map_err(Error::from)
            })
            .map(move |res| Self::store_cookies(res, cookie_set))
    }

    pub(super) fn get_json(
        &self,
        path: &str,
        query: Query,
    ) -> impl Future<Item = Response, Error = Error> {
        let request_url = self.base_url.join(path);
        let client = self.reqwest.clone();

        let cookie_get: Arc<Mutex<_>> = self.cookies.clone();
        let cookie_set: Arc<Mutex<_>> = self.cookies.clone();
        request_url
            .map_err(Error::from)
            .into_future()
            .and_then(move |url| {
                info!("GET {} (json)", url.as_str());

                client
                    .get(url.as_str())
                    .query(&query)
                    .header(ACCEPT, "application/json")
                    .headers(Self::cookie_headers(cookie_get, &url))
                    .send()
                    .map_err(Error::from)
            })
            .map(move |res| Self::store_cookies(res, cookie_set))
    }

    pub(super) fn save_cookies(&self, file: &mut File) -> Result<(), Error> {
        self.cookies
            .lock()
            .unwrap()
            .save_json(file)
            .map_err(|_err| Error::CookieStore)
    }

    pub(super) fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn cookie_headers(cookies: Arc<Mutex<CookieStore>>, url: &Url) -> HeaderMap {
        let store = cookies.lock().unwrap();

        // Cookies that were accepted into the store are valid header values, anything else is
        // skipped rather than sent malformed
        store
            .matches(url)
            .iter()
            .filter_map(|cookie| cookie.encoded().to_string().parse().ok())
            .fold(HeaderMap::new(), |mut headers, value| {
                headers.append(COOKIE, value);
                headers
            })
    }

    fn store_cookies(res: Response, cookies: Arc<Mutex<CookieStore>>) -> Response {
        res.headers().get_all(SET_COOKIE).iter().for_each(|cookie| {
            cookie
                .to_str()
                .ok()
                .and_then(|cookie| cookies.lock().unwrap().parse(cookie, res.url()).ok());
        });

        res
    }
}
