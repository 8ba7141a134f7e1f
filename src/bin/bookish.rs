//! The bookish executable sends catalog requests against a sled-backed store.
//!
//! `bookish [--data-dir DIR] [--latency-ms MS] [-v] get <PATH>`
//!
//!     Send a GET request, e.g. `bookish get "/api/books?q=дюна"`, and print the response body.
//!
//! `bookish post <PATH> <BODY>` / `bookish put <PATH> <BODY>` / `bookish rm <PATH>`
//!
//!     Send a POST or PUT request with a JSON body, or a DELETE request.
//!
//! `bookish login <USERNAME> [PASSWORD]`, `bookish register <USERNAME>`
//!
//!     Authenticate or create a reader account and print it.
//!
//! `bookish book <ID>`, `bookish newest [COUNT]`
//!
//!     Print a book with its author, publisher and reviews, or the most recently published books.
//!
//! `bookish profile <USER_ID>`, `bookish recommend <USER_ID>`
//!
//!     Print a reader's books, or recommendations based on their reading history.
//!     Recommendations use the key in GEMINI_API_KEY (or API_KEY) when it is set.
//!
//! The options go before the subcommand. A non-2xx response is printed and reported with a non-zero exit code.

use std::env::current_dir;
use std::path::PathBuf;
use std::time::Duration;

use bookish::model::{Account, Book};
use bookish::recommend::{GeminiConfig, GeminiRecommender, Recommender};
use bookish::{
    BookishClient, BookishError, BookishServer, ClientConfig, Method, Request, Result,
    Session, SledStorage, DEFAULT_LATENCY, NEWEST_BOOKS,
};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use serde::Serialize;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// ['Opt'] holds parsed and validated options from the command line
#[derive(Debug)]
struct Opt {
    data_dir: PathBuf,
    latency: Duration,
    cmd: Cmd,
}

/// the action requested on the command line
#[derive(Debug)]
enum Cmd {
    Send(Request),
    Login { username: String, password: String },
    Register { username: String },
    Book { id: String },
    Newest { count: usize },
    Profile { user_id: String },
    Recommend { user_id: String },
}

fn main() -> Result<()> {
    let matches = App::new("bookish")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a book catalog with a routed request/response api")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommands(vec![
            SubCommand::with_name("get")
                .about("Send a GET request and print the response")
                .arg(Arg::with_name("PATH").required(true).index(1)),
            SubCommand::with_name("post")
                .about("Send a POST request with a JSON body")
                .arg(Arg::with_name("PATH").required(true).index(1))
                .arg(Arg::with_name("BODY").required(true).index(2)),
            SubCommand::with_name("put")
                .about("Send a PUT request with a JSON body")
                .arg(Arg::with_name("PATH").required(true).index(1))
                .arg(Arg::with_name("BODY").required(true).index(2)),
            SubCommand::with_name("rm")
                .about("Send a DELETE request")
                .arg(Arg::with_name("PATH").required(true).index(1)),
            SubCommand::with_name("login")
                .about("Log in and print the account")
                .arg(Arg::with_name("USERNAME").required(true).index(1))
                .arg(Arg::with_name("PASSWORD").index(2)),
            SubCommand::with_name("register")
                .about("Register a reader account")
                .arg(Arg::with_name("USERNAME").required(true).index(1)),
            SubCommand::with_name("book")
                .about("Print a book with its author, publisher and reviews")
                .arg(Arg::with_name("ID").required(true).index(1)),
            SubCommand::with_name("newest")
                .about("Print the most recently published books")
                .arg(Arg::with_name("COUNT").index(1)),
            SubCommand::with_name("profile")
                .about("Print the books a reader has read and wants to read")
                .arg(Arg::with_name("USER_ID").required(true).index(1)),
            SubCommand::with_name("recommend")
                .about("Recommend books based on a reader's history")
                .arg(Arg::with_name("USER_ID").required(true).index(1)),
        ])
        .arg(Arg::with_name("data-dir")
            .long("data-dir")
            .value_name("DIR")
            .help("sets the directory holding the catalog database, defaults to the current directory"))
        .arg(Arg::with_name("latency-ms")
            .long("latency-ms")
            .value_name("MS")
            .help("sets the simulated round-trip latency in milliseconds"))
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("log everything, down to TRACE"))
        .get_matches();

    subscriber_config(matches.is_present("verbose"));

    let opt = parse_options(&matches)?;
    debug!(?opt);
    run(opt)
}

/// runs the requested command against a server opened over the data directory
fn run(opt: Opt) -> Result<()> {
    let server = BookishServer::open(SledStorage::open(&opt.data_dir)?);
    let client = BookishClient::with_config(server, ClientConfig { latency: opt.latency });

    match opt.cmd {
        Cmd::Send(req) => {
            let resp = client.send(req);
            print_json(&resp.body)?;
            if !resp.is_success() {
                let message = resp
                    .error_message()
                    .map(String::from)
                    .unwrap_or_else(|| format!("HTTP error! status: {}", resp.status));
                return Err(BookishError::Remote {
                    status: resp.status,
                    message,
                });
            }
        }
        Cmd::Login { username, password } => print_json(&client.login(&username, &password)?)?,
        Cmd::Register { username } => print_json(&client.register(&username, "")?)?,
        Cmd::Book { id } => print_json(&client.fetch_book_details(&id)?)?,
        Cmd::Newest { count } => print_json(&client.fetch_newest_books(count)?)?,
        Cmd::Profile { user_id } => {
            let mut session = Session::resume(client, user_id);
            print_json(&session.reading_profile()?)?;
        }
        Cmd::Recommend { user_id } => {
            let read: Vec<Book> = match client.fetch_user_by_id(&user_id)? {
                Account::Regular(user) => client.fetch_books_by_ids(&user.reading_history)?,
                Account::Admin(_) => vec![],
            };
            let recommender = GeminiRecommender::new(GeminiConfig::from_env())?;
            print_json(&recommender.recommend(&read))?;
        }
    }
    Ok(())
}

/// parses the matches from the command line into an [`Opt`] struct
fn parse_options(matches: &ArgMatches) -> Result<Opt> {
    let data_dir = match matches.value_of("data-dir") {
        Some(dir) => PathBuf::from(dir),
        None => current_dir()?,
    };
    let latency = match matches.value_of("latency-ms") {
        Some(ms) => Duration::from_millis(ms.parse().map_err(|_| {
            BookishError::BadRequest(format!("could not parse {} into milliseconds", ms))
        })?),
        None => DEFAULT_LATENCY,
    };

    let cmd = match matches.subcommand() {
        ("get", Some(args)) => Cmd::Send(Request::get(required(args, "PATH")?)),
        ("post", Some(args)) => Cmd::Send(
            Request::new(Method::Post, required(args, "PATH")?).with_body(required(args, "BODY")?),
        ),
        ("put", Some(args)) => Cmd::Send(
            Request::new(Method::Put, required(args, "PATH")?).with_body(required(args, "BODY")?),
        ),
        ("rm", Some(args)) => Cmd::Send(Request::delete(required(args, "PATH")?)),
        ("login", Some(args)) => Cmd::Login {
            username: required(args, "USERNAME")?.to_string(),
            password: args.value_of("PASSWORD").unwrap_or_default().to_string(),
        },
        ("register", Some(args)) => Cmd::Register {
            username: required(args, "USERNAME")?.to_string(),
        },
        ("book", Some(args)) => Cmd::Book {
            id: required(args, "ID")?.to_string(),
        },
        ("newest", Some(args)) => Cmd::Newest {
            count: match args.value_of("COUNT") {
                Some(count) => count.parse().map_err(|_| {
                    BookishError::BadRequest(format!("could not parse {} into a count", count))
                })?,
                None => NEWEST_BOOKS,
            },
        },
        ("profile", Some(args)) => Cmd::Profile {
            user_id: required(args, "USER_ID")?.to_string(),
        },
        ("recommend", Some(args)) => Cmd::Recommend {
            user_id: required(args, "USER_ID")?.to_string(),
        },
        (other, _) => {
            return Err(BookishError::BadRequest(format!("unknown command {}", other)))
        }
    };

    Ok(Opt {
        data_dir,
        latency,
        cmd,
    })
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.value_of(name)
        .ok_or_else(|| BookishError::BadRequest(format!("missing argument {}", name)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(verbose: bool) {
    let level = if verbose { Level::TRACE } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        // log to stderr instead of stdout, stdout carries the response bodies
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
