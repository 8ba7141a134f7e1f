//! The route table and the query logic behind each route.
//!
//! Routes are matched in table order against the request method and the path segments. A
//! pattern segment starting with `:` binds the request segment under that name. Handlers only
//! touch the [`EntityStore`]; they report whether they mutated it, and the server decides when
//! to commit.
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::{Method, Request, Response};
use crate::model::{Account, Book, BookPatch, Genre, NewBook, User};
use crate::store::EntityStore;
use crate::{BookishError, Result};

/// the only password checked at login, and only for admin accounts
pub const ADMIN_SECRET: &str = "sheri2001";

/// Substituted for an empty cover url whenever a book is read.
///
/// A short static path rather than an inline `data:` image, so responses and the persisted
/// catalog stay small. Any fixed value works, clients only compare against this constant.
pub const DEFAULT_COVER_URL: &str = "/static/images/default-cover.jpg";

/// The result of running a handler
#[derive(Debug)]
pub struct Outcome {
    /// the envelope to return
    pub response: Response,
    /// true if the handler changed the store and a commit is due
    pub mutated: bool,
}

impl Outcome {
    fn read(response: Response) -> Self {
        Outcome {
            response,
            mutated: false,
        }
    }

    fn write(response: Response) -> Self {
        Outcome {
            response,
            mutated: true,
        }
    }
}

/// Path parameters bound while matching a route pattern
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RouteParams(Vec<(&'static str, String)>);

impl RouteParams {
    /// the value bound to `name`
    pub fn get(&self, name: &str) -> Result<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| BookishError::BadRequest(format!("missing path parameter {}", name)))
    }
}

type Handler = fn(&mut EntityStore, &RouteParams, &Request) -> Result<Outcome>;

/// A (method, path pattern) pair and the handler serving it
pub struct Route {
    /// the method this route answers to
    pub method: Method,
    /// the path pattern, e.g. `/api/books/:id`
    pub pattern: &'static str,
    handler: Handler,
}

impl Route {
    /// matches `method` and `path` against this route, binding its parameters
    pub fn matches(&self, method: Method, path: &str) -> Option<RouteParams> {
        if self.method != method {
            return None;
        }

        let mut pattern_segments = self.pattern.split('/');
        let mut path_segments = path.split('/');
        let mut params = RouteParams::default();
        loop {
            match (pattern_segments.next(), path_segments.next()) {
                (None, None) => return Some(params),
                (Some(pattern), Some(segment)) => {
                    if let Some(name) = pattern.strip_prefix(':') {
                        if segment.is_empty() {
                            return None;
                        }
                        params.0.push((name, segment.to_string()));
                    } else if pattern != segment {
                        return None;
                    }
                }
                _ => return None,
            }
        }
    }
}

/// the route table, in matching order
pub const ROUTES: &[Route] = &[
    Route { method: Method::Post, pattern: "/api/auth/login", handler: login },
    Route { method: Method::Post, pattern: "/api/auth/register", handler: register },
    Route { method: Method::Get, pattern: "/api/users/:id", handler: get_user },
    Route { method: Method::Get, pattern: "/api/books", handler: list_books },
    Route { method: Method::Post, pattern: "/api/books", handler: create_book },
    Route { method: Method::Get, pattern: "/api/books/:id", handler: get_book },
    Route { method: Method::Put, pattern: "/api/books/:id", handler: update_book },
    Route { method: Method::Delete, pattern: "/api/books/:id", handler: delete_book },
    Route { method: Method::Get, pattern: "/api/authors", handler: list_authors },
    Route { method: Method::Get, pattern: "/api/authors/:id", handler: get_author },
    Route { method: Method::Get, pattern: "/api/publishers", handler: list_publishers },
    Route { method: Method::Get, pattern: "/api/publishers/:id", handler: get_publisher },
    Route { method: Method::Get, pattern: "/api/reviews/book/:bookId", handler: reviews_for_book },
];

/// finds the first route matching `method` and `path`
pub fn resolve(method: Method, path: &str) -> Option<(&'static Route, RouteParams)> {
    ROUTES
        .iter()
        .find_map(|route| route.matches(method, path).map(|params| (route, params)))
}

/// runs `req` against `store`
///
/// # Errors
/// `BookishError::NotFound` if no route matches, otherwise whatever the handler returns
pub fn dispatch(store: &mut EntityStore, req: &Request) -> Result<Outcome> {
    let (route, params) = resolve(req.method, &req.path)
        .ok_or_else(|| BookishError::NotFound("Not Found".to_string()))?;
    debug!("{} {} matched {}", req.method, req.path, route.pattern);
    (route.handler)(store, &params, req)
}

/// The filters accepted by `GET /api/books`. Every filter present must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    /// case-insensitive substring of the title or of the author's name
    pub q: Option<String>,
    /// a genre name the book must be tagged with
    pub genre: Option<String>,
    /// an allow-list of book ids
    pub ids: Option<Vec<String>>,
}

impl BookQuery {
    /// reads `q`, `genre` and the comma separated `ids` from the request's query string
    pub fn from_request(req: &Request) -> Self {
        BookQuery {
            q: req.query_param("q"),
            genre: req.query_param("genre"),
            ids: req
                .query_param("ids")
                .map(|ids| ids.split(',').map(String::from).collect()),
        }
    }
}

/// Selects the books matching `query`, in collection order.
///
/// The text match is a single lower-cased substring test. There is no tokenizing and no
/// ranking. An unrecognized genre matches nothing.
pub fn search<'a>(store: &'a EntityStore, query: &BookQuery) -> Vec<&'a Book> {
    let needle = query.q.as_ref().map(|q| q.to_lowercase());
    let author_ids: Vec<&str> = match &needle {
        Some(needle) => store
            .authors()
            .iter()
            .filter(|a| a.name.to_lowercase().contains(needle.as_str()))
            .map(|a| a.id.as_str())
            .collect(),
        None => vec![],
    };
    let genre: Option<Option<Genre>> = query.genre.as_deref().map(|g| g.parse().ok());

    store
        .books()
        .iter()
        .filter(|book| match &query.ids {
            Some(ids) => ids.iter().any(|id| *id == book.id),
            None => true,
        })
        .filter(|book| match &needle {
            Some(needle) => {
                book.title.to_lowercase().contains(needle.as_str())
                    || author_ids.contains(&book.author_id.as_str())
            }
            None => true,
        })
        .filter(|book| match genre {
            Some(Some(genre)) => book.genres.contains(&genre),
            Some(None) => false,
            None => true,
        })
        .collect()
}

/// body of a login request
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// login name
    pub username: String,
    /// password, only checked for admin accounts
    #[serde(default)]
    pub password: String,
}

/// body of a register request. The password is accepted but not stored.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// requested login name
    pub username: String,
    /// ignored
    #[serde(default)]
    pub password: Option<String>,
}

fn login(store: &mut EntityStore, _: &RouteParams, req: &Request) -> Result<Outcome> {
    let LoginRequest { username, password } = req.json()?;
    let account = store
        .users()
        .iter()
        .find(|a| a.username() == username)
        .ok_or_else(|| BookishError::Unauthorized("User not found".to_string()))?;

    match account {
        Account::Admin(_) if password != ADMIN_SECRET => {
            Err(BookishError::Unauthorized("Invalid credentials".to_string()))
        }
        Account::Admin(_) | Account::Regular(_) => Ok(Outcome::read(Response::ok(account)?)),
    }
}

fn register(store: &mut EntityStore, _: &RouteParams, req: &Request) -> Result<Outcome> {
    let RegisterRequest { username, .. } = req.json()?;
    if store.users().iter().any(|a| a.username() == username) {
        return Err(BookishError::BadRequest("Username already exists".to_string()));
    }

    let user = User::new(time_id("user"), username);
    let response = Response::created(&user)?;
    store.push_user(user);
    Ok(Outcome::write(response))
}

fn get_user(store: &mut EntityStore, params: &RouteParams, _: &Request) -> Result<Outcome> {
    let id = params.get("id")?;
    let account = store
        .users()
        .iter()
        .find(|a| a.id() == id)
        .ok_or_else(|| BookishError::NotFound("User not found".to_string()))?;
    Ok(Outcome::read(Response::ok(account)?))
}

fn list_books(store: &mut EntityStore, _: &RouteParams, req: &Request) -> Result<Outcome> {
    let query = BookQuery::from_request(req);
    let books: Vec<Book> = search(store, &query)
        .into_iter()
        .map(|book| book.with_default_cover(DEFAULT_COVER_URL))
        .collect();
    Ok(Outcome::read(Response::ok(&books)?))
}

fn create_book(store: &mut EntityStore, _: &RouteParams, req: &Request) -> Result<Outcome> {
    let new_book: NewBook = req.json()?;
    let book = new_book.into_book(time_id("book"));
    let response = Response::created(&book)?;

    let mut books = store.books().to_vec();
    books.push(book);
    store.set_books(books);
    Ok(Outcome::write(response))
}

fn get_book(store: &mut EntityStore, params: &RouteParams, _: &Request) -> Result<Outcome> {
    let id = params.get("id")?;
    let book = store
        .books()
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(book_not_found)?;
    Ok(Outcome::read(Response::ok(&book.with_default_cover(DEFAULT_COVER_URL))?))
}

fn update_book(store: &mut EntityStore, params: &RouteParams, req: &Request) -> Result<Outcome> {
    let id = params.get("id")?;
    let index = book_index(store, id)?;
    let patch: BookPatch = req.json()?;

    let mut books = store.books().to_vec();
    books[index].apply(patch);
    let response = Response::ok(&books[index])?;
    store.set_books(books);
    Ok(Outcome::write(response))
}

fn delete_book(store: &mut EntityStore, params: &RouteParams, _: &Request) -> Result<Outcome> {
    let id = params.get("id")?;
    let index = book_index(store, id)?;

    let mut books = store.books().to_vec();
    let removed = books.remove(index);
    store.set_books(books);
    Ok(Outcome::write(Response::ok(&removed)?))
}

fn list_authors(store: &mut EntityStore, _: &RouteParams, _: &Request) -> Result<Outcome> {
    Ok(Outcome::read(Response::ok(&store.authors())?))
}

fn get_author(store: &mut EntityStore, params: &RouteParams, _: &Request) -> Result<Outcome> {
    let id = params.get("id")?;
    let author = store
        .authors()
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| BookishError::NotFound("Author not found".to_string()))?;
    Ok(Outcome::read(Response::ok(author)?))
}

fn list_publishers(store: &mut EntityStore, _: &RouteParams, _: &Request) -> Result<Outcome> {
    Ok(Outcome::read(Response::ok(&store.publishers())?))
}

fn get_publisher(store: &mut EntityStore, params: &RouteParams, _: &Request) -> Result<Outcome> {
    let id = params.get("id")?;
    let publisher = store
        .publishers()
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| BookishError::NotFound("Publisher not found".to_string()))?;
    Ok(Outcome::read(Response::ok(publisher)?))
}

fn reviews_for_book(store: &mut EntityStore, params: &RouteParams, _: &Request) -> Result<Outcome> {
    let book_id = params.get("bookId")?;
    let reviews: Vec<_> = store
        .reviews()
        .iter()
        .filter(|r| r.book_id == book_id)
        .collect();
    Ok(Outcome::read(Response::ok(&reviews)?))
}

fn book_index(store: &EntityStore, id: &str) -> Result<usize> {
    store
        .books()
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(book_not_found)
}

fn book_not_found() -> BookishError {
    BookishError::NotFound("Book not found".to_string())
}

/// Builds an id from the wall clock in milliseconds. Two ids minted within the same
/// millisecond collide.
fn time_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}-{}", prefix, millis)
}
