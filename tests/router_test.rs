use bookish::model::{Account, Book, Genre};
use bookish::router::{self, DEFAULT_COVER_URL};
use bookish::{BookishServer, MemoryStorage, Method, Request, Response};
use serde_json::{json, Value};

fn server() -> BookishServer<MemoryStorage> {
    BookishServer::open(MemoryStorage::new())
}

fn books(resp: &Response) -> Vec<Book> {
    assert_eq!(resp.status, 200, "unexpected envelope {:?}", resp.body);
    serde_json::from_value(resp.body.clone()).unwrap()
}

fn ids(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.id.as_str()).collect()
}

fn post(target: &str, body: Value) -> Request {
    Request::new(Method::Post, target).with_body(body.to_string())
}

fn put(target: &str, body: Value) -> Request {
    Request::new(Method::Put, target).with_body(body.to_string())
}

#[test]
fn query_matches_title_case_insensitively() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books?q=гарри")));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Гарри Поттер и философский камень");
}

#[test]
fn query_accepts_percent_encoding() {
    let server = server();
    // "дюна"
    let found = books(&server.handle(&Request::get(
        "/api/books?q=%D0%B4%D1%8E%D0%BD%D0%B0",
    )));
    assert_eq!(ids(&found), vec!["book-4"]);
}

#[test]
fn query_matches_author_name() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books?q=РОУЛИНГ")));
    assert_eq!(ids(&found), vec!["book-1", "book-6"]);
}

#[test]
fn genre_filter_is_exact_membership() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books?genre=Научная фантастика")));
    assert_eq!(ids(&found), vec!["book-4", "book-5"]);

    let found = books(&server.handle(&Request::get("/api/books?genre=Триллер")));
    assert_eq!(ids(&found), vec!["book-6"]);
}

#[test]
fn unknown_genre_matches_nothing() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books?genre=Poetry")));
    assert!(found.is_empty());
}

#[test]
fn ids_filter_keeps_collection_order() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books?ids=book-4,book-1")));
    assert_eq!(ids(&found), vec!["book-1", "book-4"]);
}

#[test]
fn filters_are_intersected() {
    let server = server();
    let found = books(&server.handle(&Request::get(
        "/api/books?ids=book-1,book-4,book-6&genre=Научная+фантастика",
    )));
    assert_eq!(ids(&found), vec!["book-4"]);

    let found = books(&server.handle(&Request::get("/api/books?q=роулинг&genre=Детектив")));
    assert_eq!(ids(&found), vec!["book-6"]);
}

#[test]
fn empty_filters_are_ignored() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books?q=&genre=&ids=")));
    assert_eq!(found.len(), 6);
}

#[test]
fn listing_substitutes_default_cover() {
    let server = server();
    let found = books(&server.handle(&Request::get("/api/books")));
    assert_eq!(
        ids(&found),
        vec!["book-1", "book-2", "book-3", "book-4", "book-5", "book-6"]
    );
    assert_eq!(found[5].cover_url, DEFAULT_COVER_URL);
    assert!(found[..5].iter().all(|b| b.cover_url != DEFAULT_COVER_URL));
}

#[test]
fn get_book_substitutes_default_cover_only_when_empty() {
    let server = server();
    let resp = server.handle(&Request::get("/api/books/book-6"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["coverUrl"], DEFAULT_COVER_URL);

    let resp = server.handle(&Request::get("/api/books/book-1"));
    let snapshot = server.snapshot();
    let stored = &snapshot.books()[0];
    assert_eq!(resp.body["coverUrl"], stored.cover_url.as_str());

    // the stored book keeps its empty cover
    assert_eq!(server.snapshot().books()[5].cover_url, "");
}

#[test]
fn get_missing_book_is_not_found() {
    let server = server();
    let resp = server.handle(&Request::get("/api/books/book-404"));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.error_message(), Some("Book not found"));
}

#[test]
fn update_merges_fields() {
    let server = server();
    let before = server.snapshot().books()[1].clone();

    let resp = server.handle(&put("/api/books/book-2", json!({ "title": "X" })));
    assert_eq!(resp.status, 200);
    let merged: Book = serde_json::from_value(resp.body).unwrap();

    assert_eq!(merged.title, "X");
    assert_eq!(merged.id, before.id);
    assert_eq!(merged.author_id, before.author_id);
    assert_eq!(merged.publisher_id, before.publisher_id);
    assert_eq!(merged.genres, before.genres);
    assert_eq!(merged.publication_year, before.publication_year);
    assert_eq!(merged.summary, before.summary);
    assert_eq!(server.snapshot().books()[1], merged);
}

#[test]
fn update_never_changes_the_id() {
    let server = server();
    let resp = server.handle(&put(
        "/api/books/book-3",
        json!({ "id": "book-999", "genres": ["Ужасы"] }),
    ));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["id"], "book-3");
    assert_eq!(server.snapshot().books()[2].genres, vec![Genre::Horror]);
}

#[test]
fn update_missing_book_is_not_found() {
    let server = server();
    let resp = server.handle(&put("/api/books/nope", json!({ "title": "X" })));
    assert_eq!(resp.status, 404);
}

#[test]
fn update_with_bad_body_is_rejected() {
    let server = server();
    let resp = server.handle(&put("/api/books/book-1", json!({ "publicationYear": "soon" })));
    assert_eq!(resp.status, 400);
    assert_eq!(server.snapshot().books()[0].publication_year, 1997);
}

#[test]
fn delete_returns_removed_book() {
    let server = server();
    let resp = server.handle(&Request::delete("/api/books/book-6"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["id"], "book-6");
    // returned as stored, without substitution
    assert_eq!(resp.body["coverUrl"], "");

    assert_eq!(server.handle(&Request::get("/api/books/book-6")).status, 404);
    assert_eq!(server.snapshot().books().len(), 5);
    assert_eq!(server.handle(&Request::delete("/api/books/book-6")).status, 404);
}

#[test]
fn create_assigns_id_and_appends() {
    let server = server();
    let resp = server.handle(&post(
        "/api/books",
        json!({
            "title": "Солярис",
            "authorId": "author-x",
            "publisherId": "pub-1",
            "publicationYear": 1961,
            "genres": ["Научная фантастика"],
            "format": "FB2",
        }),
    ));
    assert_eq!(resp.status, 201);
    let created: Book = serde_json::from_value(resp.body).unwrap();
    assert!(created.id.starts_with("book-"));
    assert_eq!(created.cover_url, "");

    let snapshot = server.snapshot();
    assert_eq!(snapshot.books().len(), 7);
    assert_eq!(snapshot.books()[6], created);
    // dangling author reference is stored as is
    assert_eq!(snapshot.books()[6].author_id, "author-x");
    assert_eq!(server.handle(&Request::get("/api/authors/author-x")).status, 404);
}

#[test]
fn create_with_bad_body_is_rejected() {
    let server = server();
    let resp = server.handle(&post("/api/books", json!({ "title": "no author" })));
    assert_eq!(resp.status, 400);

    let resp = server.handle(&Request::new(Method::Post, "/api/books").with_body("{not json"));
    assert_eq!(resp.status, 400);
    assert_eq!(server.snapshot().books().len(), 6);
}

#[test]
fn login_policy() {
    let server = server();
    let login = |username: &str, password: &str| {
        server.handle(&post(
            "/api/auth/login",
            json!({ "username": username, "password": password }),
        ))
    };

    let resp = login("sheri", "wrong");
    assert_eq!(resp.status, 401);
    assert_eq!(resp.error_message(), Some("Invalid credentials"));

    let resp = login("sheri", "sheri2001");
    assert_eq!(resp.status, 200);
    let account: Account = serde_json::from_value(resp.body).unwrap();
    assert!(account.is_admin());

    let resp = login("testuser", "anything at all");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["readingHistory"], json!(["book-1", "book-4"]));

    let resp = login("nobody", "x");
    assert_eq!(resp.status, 401);
    assert_eq!(resp.error_message(), Some("User not found"));

    // usernames are case-sensitive
    assert_eq!(login("TestUser", "x").status, 401);
}

#[test]
fn register_rejects_taken_usernames() {
    let server = server();
    let resp = server.handle(&post("/api/auth/register", json!({ "username": "testuser" })));
    assert_eq!(resp.status, 400);

    let resp = server.handle(&post("/api/auth/register", json!({ "username": "sheri" })));
    assert_eq!(resp.status, 400);
    assert_eq!(server.snapshot().users().len(), 2);
}

#[test]
fn register_creates_empty_reader() {
    let server = server();
    let resp = server.handle(&post(
        "/api/auth/register",
        json!({ "username": "reader", "password": "pw" }),
    ));
    assert_eq!(resp.status, 201);
    assert_eq!(resp.body["readingHistory"], json!([]));
    assert_eq!(resp.body["wantToRead"], json!([]));
    assert_eq!(resp.body["friends"], json!([]));

    let id = resp.body["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("user-"));
    let fetched = server.handle(&Request::get(&format!("/api/users/{}", id)));
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["username"], "reader");
}

#[test]
fn users_are_looked_up_across_account_kinds() {
    let server = server();
    let resp = server.handle(&Request::get("/api/users/admin-1"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["role"], "admin");

    let resp = server.handle(&Request::get("/api/users/user-1"));
    assert_eq!(resp.status, 200);
    assert!(resp.body.get("role").is_none());

    assert_eq!(server.handle(&Request::get("/api/users/user-9")).status, 404);
}

#[test]
fn authors_and_publishers() {
    let server = server();
    let resp = server.handle(&Request::get("/api/authors"));
    assert_eq!(resp.body.as_array().unwrap().len(), 5);
    let resp = server.handle(&Request::get("/api/authors/author-4"));
    assert_eq!(resp.body["name"], "Фрэнк Герберт");
    let resp = server.handle(&Request::get("/api/authors/author-9"));
    assert_eq!(resp.status, 404);
    assert_eq!(resp.error_message(), Some("Author not found"));

    let resp = server.handle(&Request::get("/api/publishers"));
    assert_eq!(resp.body.as_array().unwrap().len(), 3);
    let resp = server.handle(&Request::get("/api/publishers/pub-3"));
    assert_eq!(resp.body["name"], "Эксмо");
    assert_eq!(server.handle(&Request::get("/api/publishers/pub-9")).status, 404);
}

#[test]
fn reviews_by_book() {
    let server = server();
    let resp = server.handle(&Request::get("/api/reviews/book/book-1"));
    assert_eq!(resp.status, 200);
    let reviews = resp.body.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 5);

    let resp = server.handle(&Request::get("/api/reviews/book/book-2"));
    assert_eq!(resp.body, json!([]));
}

#[test]
fn unmatched_routes_are_not_found() {
    let server = server();
    for req in vec![
        Request::get("/api/nothing"),
        Request::get("/api/books/"),
        Request::get("/api/books/book-1/extra"),
        Request::new(Method::Post, "/api/books/book-1"),
        Request::new(Method::Delete, "/api/authors/author-1"),
        Request::get("/api/auth/login"),
    ] {
        let resp = server.handle(&req);
        assert_eq!(resp.status, 404, "{:?}", req);
        assert_eq!(resp.error_message(), Some("Not Found"));
    }
}

#[test]
fn patterns_bind_named_parameters() {
    let (route, params) = router::resolve(Method::Get, "/api/reviews/book/book-3").unwrap();
    assert_eq!(route.pattern, "/api/reviews/book/:bookId");
    assert_eq!(params.get("bookId").unwrap(), "book-3");

    let (route, _) = router::resolve(Method::Put, "/api/books/book-3").unwrap();
    assert_eq!(route.method, Method::Put);
    assert!(router::resolve(Method::Put, "/api/books").is_none());
}
