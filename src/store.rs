use serde::{Deserialize, Serialize};

use crate::model::{Account, Author, Book, Publisher, Review, User};

/// The five in-memory collections that make up the catalog.
///
/// Serializes to the persisted document shape `{users, authors, publishers, books, reviews}`.
/// Only the book collection can be replaced, and users can only be appended; authors,
/// publishers and reviews are read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStore {
    users: Vec<Account>,
    authors: Vec<Author>,
    publishers: Vec<Publisher>,
    books: Vec<Book>,
    reviews: Vec<Review>,
}

impl EntityStore {
    /// builds a store from its collections
    pub fn new(
        users: Vec<Account>,
        authors: Vec<Author>,
        publishers: Vec<Publisher>,
        books: Vec<Book>,
        reviews: Vec<Review>,
    ) -> Self {
        EntityStore {
            users,
            authors,
            publishers,
            books,
            reviews,
        }
    }

    /// every account, regular and admin, in insertion order
    pub fn users(&self) -> &[Account] {
        &self.users
    }

    /// every author
    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    /// every publisher
    pub fn publishers(&self) -> &[Publisher] {
        &self.publishers
    }

    /// every book, in catalog order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// every review
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// replaces the whole book collection
    pub fn set_books(&mut self, books: Vec<Book>) {
        self.books = books;
    }

    /// appends a regular user
    pub fn push_user(&mut self, user: User) {
        self.users.push(Account::Regular(user));
    }
}
