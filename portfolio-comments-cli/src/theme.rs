use std::fmt;
use std::str::FromStr;

use termion::color::{AnsiValue, Color, Reset, Rgb};

/// Colours for each part of the rendered page
pub struct Theme<C>
where
    C: Color + Copy,
{
    pub author: C,
    pub contact: C,
    pub date: C,
    pub text: C,
    pub delete: C,
    pub image: C,
    pub status: C,
    pub link: C,
}

/// A theme whose colour type has been erased so themes can be picked at runtime
pub trait Palette {
    fn author(&self) -> Box<dyn Color>;
    fn contact(&self) -> Box<dyn Color>;
    fn date(&self) -> Box<dyn Color>;
    fn text(&self) -> Box<dyn Color>;
    fn delete(&self) -> Box<dyn Color>;
    fn image(&self) -> Box<dyn Color>;
    fn status(&self) -> Box<dyn Color>;
    fn link(&self) -> Box<dyn Color>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTheme {
    Grey,
    Color256,
    Mono,
    TrueColor,
}

#[derive(Debug)]
pub struct ParseThemeError(pub String);

pub static THEME_256: Theme<AnsiValue> = Theme {
    author: AnsiValue(33),
    contact: AnsiValue(245),
    date: AnsiValue(248),
    text: AnsiValue(252),
    delete: AnsiValue(160),
    image: AnsiValue(37),
    status: AnsiValue(229),
    link: AnsiValue(75),
};

pub static THEME_TRUE: Theme<Rgb> = Theme {
    author: Rgb(0x2b, 0x7b, 0xd6),
    contact: Rgb(0x8a, 0x8a, 0x8a),
    date: Rgb(0xa8, 0xa8, 0xa8),
    text: Rgb(0xe0, 0xe0, 0xe0),
    delete: Rgb(0xd7, 0x26, 0x26),
    image: Rgb(0x20, 0xa3, 0x9e),
    status: Rgb(0xf5, 0xe0, 0x9b),
    link: Rgb(0x5f, 0xaf, 0xff),
};

pub static THEME_GREY: Theme<AnsiValue> = Theme {
    author: AnsiValue(255),
    contact: AnsiValue(244),
    date: AnsiValue(246),
    text: AnsiValue(252),
    delete: AnsiValue(250),
    image: AnsiValue(248),
    status: AnsiValue(254),
    link: AnsiValue(250),
};

pub static THEME_MONO: Theme<Reset> = Theme {
    author: Reset,
    contact: Reset,
    date: Reset,
    text: Reset,
    delete: Reset,
    image: Reset,
    status: Reset,
    link: Reset,
};

macro_rules! get {
    ($field:ident) => {
        fn $field(&self) -> Box<dyn Color> {
            Box::new(self.$field)
        }
    };
}

impl<C> Palette for Theme<C>
where
    C: Color + Copy + 'static,
{
    get!(author);
    get!(contact);
    get!(date);
    get!(text);
    get!(delete);
    get!(image);
    get!(status);
    get!(link);
}

impl UiTheme {
    pub fn palette(self) -> &'static (dyn Palette + Sync) {
        match self {
            UiTheme::Color256 => &THEME_256,
            UiTheme::TrueColor => &THEME_TRUE,
            UiTheme::Mono => &THEME_MONO,
            UiTheme::Grey => &THEME_GREY,
        }
    }
}

impl FromStr for UiTheme {
    type Err = ParseThemeError;

    fn from_str(theme: &str) -> Result<Self, Self::Err> {
        match theme {
            "true" => Ok(UiTheme::TrueColor),
            "256" => Ok(UiTheme::Color256),
            "mono" => Ok(UiTheme::Mono),
            "grey" | "gray" => Ok(UiTheme::Grey),
            _ => Err(ParseThemeError(theme.to_string())),
        }
    }
}

impl Default for UiTheme {
    fn default() -> Self {
        UiTheme::Color256
    }
}

impl fmt::Display for ParseThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid theme. Options are: true, 256, mono, grey or gray",
            self.0
        )
    }
}
