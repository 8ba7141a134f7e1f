#![deny(missing_docs)]
//! A book catalog data-access layer: users, authors, publishers, books and reviews held in
//! memory, persisted as one JSON document into a key/value storage, and served through a
//! routed request/response api.
//!
//! ## Request / Response
//! Every operation is a [`Request`] made of a [`Method`], a path, an optional query string and
//! an optional JSON body. The [`BookishServer`] matches it against a fixed route table and
//! answers with a [`Response`] envelope: the JSON result and a status code on success, or
//! `{"error": message}` and a non-2xx status on failure.
//!
//! | Route | Method | |
//! |---|---|---|
//! | `/api/auth/login` | POST | `{username, password}`; only admin passwords are checked |
//! | `/api/auth/register` | POST | `{username}`; 400 if the username is taken |
//! | `/api/users/:id` | GET | any account by id |
//! | `/api/books` | GET | `q`, `genre` and `ids` filters, all optional |
//! | `/api/books` | POST | a book without id; 201 |
//! | `/api/books/:id` | GET, PUT, DELETE | read, merge update, remove |
//! | `/api/authors[/:id]` | GET | |
//! | `/api/publishers[/:id]` | GET | |
//! | `/api/reviews/book/:bookId` | GET | reviews of one book |
//!
//! Anything else is a 404.
//!
//! ## Store lifecycle
//! When a server is opened it restores the [`EntityStore`] from its [`StorageEngine`] under the
//! key `bookish_db`. If nothing usable is stored, or the stored catalog has no books, a fixed
//! demo dataset is installed instead. Every successful mutation commits the whole store back to
//! storage. Storage failures are logged and never reach the caller; the in-memory store stays
//! authoritative.
//!
//! ## Storage engines
//! - [`SledStorage`] persists into a sled database directory
//! - [`MemoryStorage`] keeps everything in process
//!
//! ## Client
//! [`BookishClient`] has one method per route. It waits a fixed latency, sends the request
//! and decodes the envelope into a typed value. [`BookDetails`] gathers a book's author,
//! publisher and reviews from several of those calls, showing a dangling author as
//! [`UNKNOWN_AUTHOR`]. [`Session`] tracks the logged in account on top of a client.
//!
//! ## Recommendations
//! The [`recommend`] module asks a generative text service for books similar to a reader's
//! history, and falls back to a fixed list when it cannot.

pub use client::{
    BookDetails, BookishClient, ClientConfig, ReviewEntry, DEFAULT_LATENCY, NEWEST_BOOKS,
    UNKNOWN_AUTHOR,
};
pub use command::{Method, Request, Response};
pub use engine::{MemoryStorage, SledStorage, StorageEngine};
pub use error::{BookishError, Result};
pub use persist::{Persistence, DB_KEY};
pub use server::BookishServer;
pub use session::{ReadingProfile, Session};
pub use store::EntityStore;

mod client;
mod command;
mod engine;
mod error;
pub mod model;
mod persist;
pub mod recommend;
pub mod router;
pub mod seed;
mod server;
mod session;
mod store;
