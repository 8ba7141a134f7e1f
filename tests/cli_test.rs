use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

fn bookish(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookish").unwrap();
    cmd.args(&["--data-dir", dir.path().to_str().unwrap(), "--latency-ms", "0"]);
    cmd
}

// `bookish` with no args should exit with a non-zero code.
#[test]
fn cli_no_args() {
    Command::cargo_bin("bookish").unwrap().assert().failure();
}

#[test]
fn cli_version() {
    Command::cargo_bin("bookish")
        .unwrap()
        .args(&["-V"])
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_get_searches_seeded_catalog() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["get", "/api/books?q=гарри"])
        .assert()
        .success()
        .stdout(contains("Гарри Поттер и философский камень"));
}

#[test]
fn cli_mutations_persist_between_runs() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["put", "/api/books/book-1", r#"{"title":"Новое название"}"#])
        .assert()
        .success()
        .stdout(contains("Новое название"));

    bookish(&temp_dir)
        .args(&["get", "/api/books/book-1"])
        .assert()
        .success()
        .stdout(contains("Новое название"));

    bookish(&temp_dir)
        .args(&["rm", "/api/books/book-1"])
        .assert()
        .success();

    bookish(&temp_dir)
        .args(&["get", "/api/books/book-1"])
        .assert()
        .failure()
        .stdout(contains("Book not found"));
}

#[test]
fn cli_login() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["login", "sheri", "sheri2001"])
        .assert()
        .success()
        .stdout(contains("admin"));

    bookish(&temp_dir)
        .args(&["login", "sheri", "wrong"])
        .assert()
        .failure()
        .stderr(contains("Invalid credentials"));
}

#[test]
fn cli_register_then_profile() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["register", "testuser"])
        .assert()
        .failure();

    bookish(&temp_dir)
        .args(&["profile", "user-1"])
        .assert()
        .success()
        .stdout(contains("Дюна"))
        .stdout(contains("Игра престолов"));
}

#[test]
fn cli_unknown_route() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["get", "/api/nowhere"])
        .assert()
        .failure()
        .stdout(contains("Not Found"));
}

#[test]
fn cli_book_details() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["book", "book-1"])
        .assert()
        .success()
        .stdout(contains("Джоан Роулинг"))
        .stdout(contains("Росмэн"))
        .stdout(contains("testuser"));

    bookish(&temp_dir)
        .args(&["put", "/api/books/book-2", r#"{"authorId":"author-x"}"#])
        .assert()
        .success();
    bookish(&temp_dir)
        .args(&["book", "book-2"])
        .assert()
        .success()
        .stdout(contains("Unknown author"));
}

#[test]
fn cli_newest_books() {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    bookish(&temp_dir)
        .args(&["newest", "2"])
        .assert()
        .success()
        .stdout(contains("\"book-6\""))
        .stdout(contains("\"book-5\""));

    bookish(&temp_dir)
        .args(&["newest", "many"])
        .assert()
        .failure();
}
