//! The persisted entity types.
//!
//! Field names serialize in camelCase, which is also the shape of the persisted JSON document
//! and of every response body.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BookishError, Result};

/// A regular reader account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// unique id
    pub id: String,
    /// unique, case-sensitive username
    pub username: String,
    /// ids of books the user has read, duplicates allowed
    pub reading_history: Vec<String>,
    /// ids of books the user wants to read
    pub want_to_read: Vec<String>,
    /// ids of other users
    pub friends: Vec<String>,
}

impl User {
    /// a new user with empty reading lists
    pub fn new(id: String, username: String) -> Self {
        User {
            id,
            username,
            reading_history: vec![],
            want_to_read: vec![],
            friends: vec![],
        }
    }
}

/// The constant role tag carried by admin accounts
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// serialized as `"admin"`
    #[serde(rename = "admin")]
    Admin,
}

/// An administrator account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    /// unique id
    pub id: String,
    /// unique, case-sensitive username
    pub username: String,
    /// always [`Role::Admin`]
    pub role: Role,
}

/// An account is either a regular [`User`] or an [`AdminUser`], never both.
///
/// On the wire the two are told apart by the presence of the `role` tag, so the admin variant
/// is tried first when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Account {
    /// an administrator
    Admin(AdminUser),
    /// a reader
    Regular(User),
}

impl Account {
    /// the account id
    pub fn id(&self) -> &str {
        match self {
            Account::Admin(admin) => &admin.id,
            Account::Regular(user) => &user.id,
        }
    }

    /// the account username
    pub fn username(&self) -> &str {
        match self {
            Account::Admin(admin) => &admin.username,
            Account::Regular(user) => &user.username,
        }
    }

    /// true for admin accounts
    pub fn is_admin(&self) -> bool {
        match self {
            Account::Admin(_) => true,
            Account::Regular(_) => false,
        }
    }
}

/// A book author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// unique id
    pub id: String,
    /// display name
    pub name: String,
}

/// A book publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    /// unique id
    pub id: String,
    /// display name
    pub name: String,
}

/// The closed set of genres a book can be tagged with.
///
/// The serialized names are the display names used by the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    /// "Фэнтези"
    #[serde(rename = "Фэнтези")]
    Fantasy,
    /// "Научная фантастика"
    #[serde(rename = "Научная фантастика")]
    SciFi,
    /// "Детектив"
    #[serde(rename = "Детектив")]
    Mystery,
    /// "Роман"
    #[serde(rename = "Роман")]
    Romance,
    /// "Ужасы"
    #[serde(rename = "Ужасы")]
    Horror,
    /// "Триллер"
    #[serde(rename = "Триллер")]
    Thriller,
    /// "Нон-фикшн"
    #[serde(rename = "Нон-фикшн")]
    NonFiction,
}

impl Genre {
    /// every genre in declaration order
    pub const ALL: [Genre; 7] = [
        Genre::Fantasy,
        Genre::SciFi,
        Genre::Mystery,
        Genre::Romance,
        Genre::Horror,
        Genre::Thriller,
        Genre::NonFiction,
    ];

    /// the display (and wire) name of the genre
    pub fn name(&self) -> &'static str {
        match self {
            Genre::Fantasy => "Фэнтези",
            Genre::SciFi => "Научная фантастика",
            Genre::Mystery => "Детектив",
            Genre::Romance => "Роман",
            Genre::Horror => "Ужасы",
            Genre::Thriller => "Триллер",
            Genre::NonFiction => "Нон-фикшн",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Genre {
    type Err = BookishError;

    fn from_str(s: &str) -> Result<Self> {
        Genre::ALL
            .iter()
            .find(|genre| genre.name() == s)
            .copied()
            .ok_or_else(|| BookishError::BadRequest(format!("unknown genre {}", s)))
    }
}

/// The file format of a book's content
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookFormat {
    /// EPUB e-book
    #[serde(rename = "EPUB")]
    Epub,
    /// PDF document
    #[serde(rename = "PDF")]
    Pdf,
    /// FictionBook 2 document
    #[serde(rename = "FB2")]
    Fb2,
}

/// A catalog book.
///
/// `author_id` and `publisher_id` are advisory references; nothing checks that they resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// unique id, immutable once assigned
    pub id: String,
    /// title
    pub title: String,
    /// id of an [`Author`]
    pub author_id: String,
    /// id of a [`Publisher`]
    pub publisher_id: String,
    /// year of publication, any value accepted
    pub publication_year: i64,
    /// genre tags, may be empty
    pub genres: Vec<Genre>,
    /// cover image url; empty means "use the default placeholder"
    pub cover_url: String,
    /// free text summary
    pub summary: String,
    /// location of the book content
    pub content_url: String,
    /// content format
    pub format: BookFormat,
}

impl Book {
    /// returns a copy of this book whose empty cover url is replaced by `placeholder`
    pub fn with_default_cover(&self, placeholder: &str) -> Book {
        let mut book = self.clone();
        if book.cover_url.is_empty() {
            book.cover_url = placeholder.to_string();
        }
        book
    }

    /// merges every field present in `patch` onto this book. The id never changes.
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author_id) = patch.author_id {
            self.author_id = author_id;
        }
        if let Some(publisher_id) = patch.publisher_id {
            self.publisher_id = publisher_id;
        }
        if let Some(year) = patch.publication_year {
            self.publication_year = year;
        }
        if let Some(genres) = patch.genres {
            self.genres = genres;
        }
        if let Some(cover_url) = patch.cover_url {
            self.cover_url = cover_url;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(content_url) = patch.content_url {
            self.content_url = content_url;
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
    }
}

/// The body of a create-book request: a [`Book`] without its id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    /// title
    pub title: String,
    /// id of the book's [`Author`]
    pub author_id: String,
    /// id of the book's [`Publisher`]
    pub publisher_id: String,
    /// year of publication
    pub publication_year: i64,
    /// genre tags, empty when omitted
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// cover image url, empty when omitted
    #[serde(default)]
    pub cover_url: String,
    /// free text summary, empty when omitted
    #[serde(default)]
    pub summary: String,
    /// location of the book content, empty when omitted
    #[serde(default)]
    pub content_url: String,
    /// content format
    pub format: BookFormat,
}

impl NewBook {
    /// turns the request body into a book with the given `id`
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author_id: self.author_id,
            publisher_id: self.publisher_id,
            publication_year: self.publication_year,
            genres: self.genres,
            cover_url: self.cover_url,
            summary: self.summary,
            content_url: self.content_url,
            format: self.format,
        }
    }
}

/// A partial book used by update requests. Only the fields that are present get merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    /// new title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// new author id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// new publisher id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,
    /// new year of publication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    /// replacement genre tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
    /// new cover url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// new summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// new content location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    /// new content format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<BookFormat>,
}

/// A user's review of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// unique id
    pub id: String,
    /// id of the reviewed [`Book`]
    pub book_id: String,
    /// id of the reviewing [`User`]
    pub user_id: String,
    /// intended to be 1-5, not validated
    pub rating: i64,
    /// review text
    pub text: String,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}
