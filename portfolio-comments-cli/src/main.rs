use std::fmt::Display;
use std::io::stdout;
use std::path::PathBuf;

use futures::future::Future;
use log::info;
use structopt::StructOpt;
use tokio::runtime::Runtime;

use portfolio_comments::controller::{DeleteOutcome, Startup};
use portfolio_comments::models::{
    Attachment, CommentId, Emotion, LoginState, NewComment, PageControls,
};
use portfolio_comments::url::Url;
use portfolio_comments::{render as markup, Client, Controller};

use portfolio_comments_cli::{error::Error, render, theme::UiTheme, util};

#[derive(Debug, StructOpt)]
enum Command {
    /// Show the comments of the page (this is the default)
    #[structopt(name = "show")]
    Show(Show),
    /// Print the comment section as HTML
    #[structopt(name = "html")]
    Html(Html),
    /// Delete one comment, or every comment of the page when no id is given
    #[structopt(name = "delete")]
    Delete(Delete),
    /// Open the login page in the browser
    #[structopt(name = "login")]
    Login(Login),
    /// Open the logout page in the browser
    #[structopt(name = "logout")]
    Logout(Logout),
    /// Post a new comment
    #[structopt(name = "post")]
    Post(Post),
}

#[derive(Debug, Default, StructOpt)]
struct Show {}

#[derive(Debug, StructOpt)]
struct Html {}

#[derive(Debug, StructOpt)]
struct Delete {
    /// Identifier of the comment to delete
    #[structopt(long = "id")]
    id: Option<String>,
}

#[derive(Debug, StructOpt)]
struct Login {}

#[derive(Debug, StructOpt)]
struct Logout {}

#[derive(Debug, StructOpt)]
struct Post {
    /// Name to show next to the comment
    #[structopt(short = "a", long = "author")]
    author: String,

    /// The comment itself
    #[structopt(long = "text")]
    text: String,

    /// One of happy, laughing, surprised or sad
    #[structopt(short = "e", long = "emotion", default_value = "happy")]
    emotion: Emotion,

    /// Image to attach to the comment
    #[structopt(short = "i", long = "image", parse(from_os_str))]
    image: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
struct App {
    /// Base URL of the portfolio site
    #[structopt(
        short = "b",
        long = "base-url",
        env = "PORTFOLIO_URL",
        raw(default_value = "portfolio_comments_cli::DEV_SERVER_URL"),
        parse(try_from_str = "util::parse_url")
    )]
    base_url: Url,

    /// Page whose comments to work with
    #[structopt(short = "p", long = "page", env = "PORTFOLIO_PAGE", default_value = "career")]
    page: String,

    /// Number of comments to show
    #[structopt(
        short = "n",
        long = "comments-number",
        env = "PORTFOLIO_COMMENTS_NUMBER",
        default_value = "5"
    )]
    comments_number: String,

    /// Path of the page, sent when asking for the login state
    #[structopt(long = "path", env = "PORTFOLIO_PATH", default_value = "/career.html")]
    path: String,

    /// Theme to use. Options: true, 256, grey or gray, mono
    #[structopt(
        short = "t",
        long = "theme",
        default_value = "256",
        parse(try_from_str)
    )]
    theme: UiTheme,

    #[structopt(subcommand)]
    command: Option<Command>,
}

type CommandResult = Result<(), Error>;

#[derive(Debug, Clone, Copy)]
struct Output {
    theme: UiTheme,
    plain: bool,
}

fn main() {
    env_logger::init();
    let app = App::from_args();

    let result = run(app);
    if let Err(err) = &result {
        report("Error", err);
        std::process::exit(1);
    }
}

fn run(app: App) -> CommandResult {
    let mut rt = Runtime::new()?;
    let client = Client::new(app.base_url)?;
    let controls = PageControls {
        comments_number: app.comments_number,
        page: app.page,
        path: app.path,
    };
    let controller = Controller::new(client, controls);

    // Plain text when piped somewhere
    let output = Output {
        theme: app.theme,
        plain: !termion::is_tty(&stdout()),
    };

    let result = match app.command.unwrap_or_default() {
        Command::Show(_options) => show(&mut rt, &controller, output),
        Command::Html(_options) => html(&mut rt, &controller),
        Command::Delete(options) => delete(&mut rt, &controller, output, options),
        Command::Login(_options) => login(&mut rt, &controller),
        Command::Logout(_options) => logout(&mut rt, &controller),
        Command::Post(options) => post(&mut rt, &controller, options),
    };

    // Deletes are fire-and-forget, let them finish before exiting
    rt.shutdown_on_idle()
        .wait()
        .map_err(|()| Error::Aborted)?;
    controller.backend().save_cookies()?;

    result
}

fn show(rt: &mut Runtime, controller: &Controller<Client>, output: Output) -> CommandResult {
    let startup = rt.block_on(controller.start()).map_err(|()| Error::Aborted)?;
    print_view(controller, output)?;
    check_startup(&startup)
}

fn html(rt: &mut Runtime, controller: &Controller<Client>) -> CommandResult {
    let startup = rt.block_on(controller.start()).map_err(|()| Error::Aborted)?;
    let page = markup::page_markup(&controller.view(), controller.controls());
    println!("{}", page.into_string());
    check_startup(&startup)
}

fn delete(
    rt: &mut Runtime,
    controller: &Controller<Client>,
    output: Output,
    options: Delete,
) -> CommandResult {
    let id = options.id.map(CommentId);
    match &id {
        Some(id) => info!("deleting comment {}", id),
        None => info!("deleting every comment of {}", controller.controls().page),
    }

    let outcome = rt
        .block_on(controller.delete(id))
        .map_err(|()| Error::Aborted)?;
    print_view(controller, output)?;

    match outcome {
        DeleteOutcome::Cleared => Ok(()),
        DeleteOutcome::Reloaded(startup) => check_startup(&startup),
    }
}

fn login(rt: &mut Runtime, controller: &Controller<Client>) -> CommandResult {
    match rt.block_on(controller.login_redirect())? {
        Some(target) => open(controller, &target),
        None => {
            println!("Already logged in.");
            Ok(())
        }
    }
}

fn logout(rt: &mut Runtime, controller: &Controller<Client>) -> CommandResult {
    match rt.block_on(controller.resolve_login())? {
        LoginState::LoggedIn {
            logout_url: Some(target),
        } => open(controller, &target),
        LoginState::LoggedIn { logout_url: None } => {
            println!("Logged in, but the site offered no way to log out.");
            Ok(())
        }
        LoginState::LoggedOut { .. } => {
            println!("Not logged in.");
            Ok(())
        }
    }
}

fn post(rt: &mut Runtime, controller: &Controller<Client>, options: Post) -> CommandResult {
    let image = match &options.image {
        Some(path) => Some(Attachment::read(path)?),
        None => None,
    };

    // Without an upload target the comment still goes to the default destination
    if let Err(err) = rt.block_on(controller.resolve_upload_target()) {
        report("Unable to resolve upload target", &err);
    }

    let comment = NewComment {
        author: options.author,
        text: options.text,
        emotion: options.emotion,
        page: controller.controls().page.clone(),
        image,
    };
    rt.block_on(controller.submit(comment))?;
    println!("Comment posted.");

    Ok(())
}

fn open(controller: &Controller<Client>, target: &str) -> CommandResult {
    let url = util::resolve_url(controller.backend().base_url(), target)?;
    info!("opening {}", url);
    opener::open(url.as_str()).map_err(Error::from)
}

fn print_view(controller: &Controller<Client>, output: Output) -> CommandResult {
    let lines = render::render_view(
        &controller.view(),
        output.theme.palette(),
        util::terminal_width(),
    );
    render::write_lines(&lines, &mut stdout(), output.plain)
}

/// Report every failed startup request, failing the command when there were any
fn check_startup(startup: &Startup) -> CommandResult {
    let mut failed = 0;
    for (request, err) in startup.failures() {
        report(&format!("Unable to load {}", request), err);
        failed += 1;
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(Error::Failed(failed))
    }
}

/// The one place errors are shown to the user
fn report<E: Display + ?Sized>(context: &str, err: &E) {
    eprintln!("{}: {}", context, err);
}

impl Default for Command {
    fn default() -> Self {
        Command::Show(Show::default())
    }
}
