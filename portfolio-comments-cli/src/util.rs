use chrono::{TimeZone, Utc};
use chrono_humanize::HumanTime;
use portfolio_comments::models::Timestamp;
use portfolio_comments::url::{self, Url};

/// Width used when the output is not a terminal
const FALLBACK_WIDTH: usize = 80;

pub fn parse_url(src: &str) -> Result<Url, url::ParseError> {
    src.parse()
}

/// Width of the terminal in columns
pub fn terminal_width() -> usize {
    termion::terminal_size()
        .map(|(width, _height)| usize::from(width))
        .unwrap_or(FALLBACK_WIDTH)
}

/// Resolve a URL handed out by the backend, which may be relative to the site
pub fn resolve_url(base_url: &Url, target: &str) -> Result<Url, url::ParseError> {
    base_url.join(target)
}

/// How long ago `posted` was, e.g. "3 months ago"
pub fn humanize_date(posted: &Timestamp) -> String {
    HumanTime::from(Utc.from_utc_datetime(&posted.naive())).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_resolve_url() {
        let base = parse_url("https://portfolio.example.com/career.html").unwrap();

        assert_eq!(
            resolve_url(&base, "/_ah/login?continue=%2Fcareer.html")
                .unwrap()
                .as_str(),
            "https://portfolio.example.com/_ah/login?continue=%2Fcareer.html"
        );
        assert_eq!(
            resolve_url(&base, "https://accounts.example.com/logout")
                .unwrap()
                .as_str(),
            "https://accounts.example.com/logout"
        );
    }

    #[test]
    fn test_humanize_date() {
        let old: Timestamp = "2020-06-10T15:04:05Z".parse().unwrap();
        assert!(humanize_date(&old).ends_with("ago"));

        let hours_ago = Timestamp::new((Utc::now() - Duration::hours(3)).naive_utc());
        assert!(humanize_date(&hours_ago).ends_with("hours ago"));
    }
}
