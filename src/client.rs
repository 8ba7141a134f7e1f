use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::form_urlencoded;

use crate::command::{Method, Request, Response};
use crate::engine::StorageEngine;
use crate::model::{Account, Author, Book, BookPatch, Genre, NewBook, Publisher, Review, User};
use crate::router::LoginRequest;
use crate::server::BookishServer;
use crate::{BookishError, Result};

const API_BASE_URL: &str = "/api";

/// default simulated round-trip time
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(200);

/// how many books [`BookishClient::fetch_newest_books`] returns by default
pub const NEWEST_BOOKS: usize = 5;

/// Name shown for a book whose author id does not resolve
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// A review together with the account that wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// the review itself
    pub review: Review,
    /// the reviewing account, `None` if it no longer exists
    pub reviewer: Option<Account>,
}

/// Everything shown alongside a single book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    /// the book, with the default cover substituted
    pub book: Book,
    /// the author's name, or [`UNKNOWN_AUTHOR`] for a dangling author id
    pub author_name: String,
    /// the publisher, `None` for a dangling publisher id
    pub publisher: Option<Publisher>,
    /// the book's reviews in store order
    pub reviews: Vec<ReviewEntry>,
}

/// Settings of a [`BookishClient`]
#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    /// fixed delay applied before every request reaches the server
    pub latency: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            latency: DEFAULT_LATENCY,
        }
    }
}

/// `BookishClient` contains one request builder per server route.
///
/// Each call serializes its arguments into the route's query string or body, waits out the
/// configured latency, hands the request to the [`BookishServer`] and decodes the envelope.
/// Any status outside 200..=299 becomes a [`BookishError::Remote`].
#[derive(Debug, Clone)]
pub struct BookishClient<E: StorageEngine> {
    server: BookishServer<E>,
    config: ClientConfig,
}

impl<E: StorageEngine> BookishClient<E> {
    /// creates a client of `server` with the default latency
    pub fn new(server: BookishServer<E>) -> Self {
        BookishClient::with_config(server, ClientConfig::default())
    }

    /// creates a client of `server` using `config`
    pub fn with_config(server: BookishServer<E>, config: ClientConfig) -> Self {
        BookishClient { server, config }
    }

    /// sends a raw request and returns the envelope as is
    pub fn send(&self, req: Request) -> Response {
        if !self.config.latency.is_zero() {
            thread::sleep(self.config.latency);
        }
        self.server.handle(&req)
    }

    /// logs in with `username` and `password`
    /// # Errors
    /// `BookishError::Remote` with status 401 if the user is unknown or an admin password is wrong
    pub fn login(&self, username: &str, password: &str) -> Result<Account> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let req = Request::new(Method::Post, &format!("{}/auth/login", API_BASE_URL))
            .with_json(&body)?;
        self.call(req)
    }

    /// registers a new reader account
    /// # Errors
    /// `BookishError::Remote` with status 400 if the username is taken
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        let req = Request::new(Method::Post, &format!("{}/auth/register", API_BASE_URL))
            .with_json(&json!({ "username": username, "password": password }))?;
        self.call(req)
    }

    /// fetches the account with `id`
    pub fn fetch_user_by_id(&self, id: &str) -> Result<Account> {
        self.call(Request::get(&format!("{}/users/{}", API_BASE_URL, id)))
    }

    /// searches the catalog. Either filter may be omitted.
    pub fn fetch_books(&self, query: Option<&str>, genre: Option<Genre>) -> Result<Vec<Book>> {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if let Some(query) = query {
            params.append_pair("q", query);
        }
        if let Some(genre) = genre {
            params.append_pair("genre", genre.name());
        }
        self.call(Request::get(&format!("{}/books?{}", API_BASE_URL, params.finish())))
    }

    /// fetches one book, with the default cover substituted
    pub fn fetch_book_by_id(&self, id: &str) -> Result<Book> {
        self.call(Request::get(&format!("{}/books/{}", API_BASE_URL, id)))
    }

    /// fetches the books with the given ids, in catalog order. An empty `ids` returns an empty
    /// list without sending a request.
    pub fn fetch_books_by_ids(&self, ids: &[String]) -> Result<Vec<Book>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let params = form_urlencoded::Serializer::new(String::new())
            .append_pair("ids", &ids.join(","))
            .finish();
        self.call(Request::get(&format!("{}/books?{}", API_BASE_URL, params)))
    }

    /// creates a book and returns it with its new id
    pub fn create_book(&self, book: &NewBook) -> Result<Book> {
        let req = Request::new(Method::Post, &format!("{}/books", API_BASE_URL)).with_json(book)?;
        self.call(req)
    }

    /// merges `patch` onto the book with `id` and returns the merged book
    pub fn update_book(&self, id: &str, patch: &BookPatch) -> Result<Book> {
        let req = Request::new(Method::Put, &format!("{}/books/{}", API_BASE_URL, id))
            .with_json(patch)?;
        self.call(req)
    }

    /// deletes the book with `id`, returning it
    pub fn delete_book(&self, id: &str) -> Result<Book> {
        self.call(Request::delete(&format!("{}/books/{}", API_BASE_URL, id)))
    }

    /// lists every author
    pub fn fetch_authors(&self) -> Result<Vec<Author>> {
        self.call(Request::get(&format!("{}/authors", API_BASE_URL)))
    }

    /// fetches one author
    pub fn fetch_author_by_id(&self, id: &str) -> Result<Author> {
        self.call(Request::get(&format!("{}/authors/{}", API_BASE_URL, id)))
    }

    /// lists every publisher
    pub fn fetch_publishers(&self) -> Result<Vec<Publisher>> {
        self.call(Request::get(&format!("{}/publishers", API_BASE_URL)))
    }

    /// fetches one publisher
    pub fn fetch_publisher_by_id(&self, id: &str) -> Result<Publisher> {
        self.call(Request::get(&format!("{}/publishers/{}", API_BASE_URL, id)))
    }

    /// lists the reviews of the book with `book_id`
    pub fn fetch_reviews_for_book(&self, book_id: &str) -> Result<Vec<Review>> {
        self.call(Request::get(&format!("{}/reviews/book/{}", API_BASE_URL, book_id)))
    }

    /// Fetches the book with `id` along with its author, publisher and reviews. Each reviewer
    /// account is fetched once, however many reviews it wrote.
    ///
    /// # Errors
    /// `BookishError::Remote` with status 404 if the book does not exist. Dangling author,
    /// publisher and reviewer ids are not errors.
    pub fn fetch_book_details(&self, id: &str) -> Result<BookDetails> {
        let book = self.fetch_book_by_id(id)?;
        let author_name = match not_found_as_none(self.fetch_author_by_id(&book.author_id))? {
            Some(author) => author.name,
            None => UNKNOWN_AUTHOR.to_string(),
        };
        let publisher = not_found_as_none(self.fetch_publisher_by_id(&book.publisher_id))?;

        let mut reviewers: HashMap<String, Option<Account>> = HashMap::new();
        let mut reviews = Vec::new();
        for review in self.fetch_reviews_for_book(id)? {
            let reviewer = match reviewers.get(&review.user_id) {
                Some(account) => account.clone(),
                None => {
                    let account = not_found_as_none(self.fetch_user_by_id(&review.user_id))?;
                    reviewers.insert(review.user_id.clone(), account.clone());
                    account
                }
            };
            reviews.push(ReviewEntry { review, reviewer });
        }

        Ok(BookDetails {
            book,
            author_name,
            publisher,
            reviews,
        })
    }

    /// the `limit` most recently published books, newest first. Books from the same year keep
    /// their catalog order.
    pub fn fetch_newest_books(&self, limit: usize) -> Result<Vec<Book>> {
        let mut books = self.fetch_books(None, None)?;
        books.sort_by(|a, b| b.publication_year.cmp(&a.publication_year));
        books.truncate(limit);
        Ok(books)
    }

    fn call<T: DeserializeOwned>(&self, req: Request) -> Result<T> {
        let resp = self.send(req);
        if resp.is_success() {
            Ok(serde_json::from_value(resp.body)?)
        } else {
            let message = resp
                .error_message()
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP error! status: {}", resp.status));
            Err(BookishError::Remote {
                status: resp.status,
                message,
            })
        }
    }
}

/// turns a 404 from the server into `None`
fn not_found_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(BookishError::Remote { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
