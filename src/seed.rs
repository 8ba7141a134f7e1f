//! The fixed demo dataset installed when no usable catalog is persisted.
use tracing::{error, info};

use crate::engine::StorageEngine;
use crate::model::{
    Account, AdminUser, Author, Book, BookFormat, Genre, Publisher, Review, Role, User,
};
use crate::persist::Persistence;
use crate::store::EntityStore;

// fixed so that two fresh seeds are byte-identical
const SEED_REVIEW_CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

/// Restores the catalog from `persistence`, or seeds it.
///
/// A persisted document that loads but holds no books counts as absent: whatever was loaded
/// is discarded and the demo dataset is installed and committed instead.
pub fn load_or_seed<E: StorageEngine>(persistence: &Persistence<E>) -> EntityStore {
    if let Some(store) = persistence.load() {
        if !store.books().is_empty() {
            info!("catalog loaded from storage");
            return store;
        }
        info!("persisted catalog has no books, reseeding");
    }

    let store = demo_dataset();
    if let Err(e) = persistence.commit(&store) {
        error!("Failed to save seeded catalog: {}", e);
    }
    info!("demo catalog initialized and saved");
    store
}

/// 5 authors, 3 publishers, 6 books, a reader, an admin and one review
pub fn demo_dataset() -> EntityStore {
    let authors = vec![
        author("author-1", "Джоан Роулинг"),
        author("author-2", "Джордж Р. Р. Мартин"),
        author("author-3", "Дж. Р. Р. Толкин"),
        author("author-4", "Фрэнк Герберт"),
        author("author-5", "Энди Вейер"),
    ];

    let publishers = vec![
        publisher("pub-1", "Росмэн"),
        publisher("pub-2", "АСТ"),
        publisher("pub-3", "Эксмо"),
    ];

    let books = vec![
        Book {
            id: "book-1".into(),
            title: "Гарри Поттер и философский камень".into(),
            author_id: "author-1".into(),
            publisher_id: "pub-1".into(),
            publication_year: 1997,
            genres: vec![Genre::Fantasy],
            cover_url: "https://cv4.litres.ru/pub/c/pdf-kniga/cover_415/18898145-dzhoan-rouling-garri-potter-i-filosofskiy-kamen-18898145.jpg".into(),
            summary: "Жизнь десятилетнего Гарри Поттера нельзя назвать сладкой: родители умерли, едва ему исполнился год, а от дяди и тёти, взявших сироту на воспитание, достаются лишь тычки да подзатыльники.".into(),
            content_url: String::new(),
            format: BookFormat::Epub,
        },
        Book {
            id: "book-2".into(),
            title: "Игра престолов".into(),
            author_id: "author-2".into(),
            publisher_id: "pub-2".into(),
            publication_year: 1996,
            genres: vec![Genre::Fantasy],
            cover_url: "https://www.moscowbooks.ru/image/book/645/big/645605.jpg".into(),
            summary: "Это суровые земли вечного холода и радостные земли вечного лета. Это сказание о лордах и героях, воинах и магах, убийцах и чернокнижниках.".into(),
            content_url: String::new(),
            format: BookFormat::Pdf,
        },
        Book {
            id: "book-3".into(),
            title: "Властелин колец: Братство Кольца".into(),
            author_id: "author-3".into(),
            publisher_id: "pub-2".into(),
            publication_year: 1954,
            genres: vec![Genre::Fantasy],
            cover_url: "https://s1.livelib.ru/boocover/1000326233/o/5953/Dzh.R.R._Tolkin__Vlastelin_Kolets_Trilogiya.jpeg".into(),
            summary: "История о великом походе отважных хоббитов и их союзников, о Кольце Всевластья, которое несет гибель всему живому.".into(),
            content_url: String::new(),
            format: BookFormat::Fb2,
        },
        Book {
            id: "book-4".into(),
            title: "Дюна".into(),
            author_id: "author-4".into(),
            publisher_id: "pub-2".into(),
            publication_year: 1965,
            genres: vec![Genre::SciFi],
            cover_url: "https://cv9.litres.ru/pub/c/elektronnaya-kniga/cover_415/1989999-frenk-gerbert-duna.jpg".into(),
            summary: "Пауль Атрейдес, молодой наследник знатного рода, отправляется на пустынную планету Арракис, единственный источник самого ценного вещества во вселенной.".into(),
            content_url: String::new(),
            format: BookFormat::Epub,
        },
        Book {
            id: "book-5".into(),
            title: "Проект «Аве Мария»".into(),
            author_id: "author-5".into(),
            publisher_id: "pub-2".into(),
            publication_year: 2021,
            genres: vec![Genre::SciFi],
            cover_url: "https://cv0.litres.ru/pub/c/elektronnaya-kniga/cover_415/66191008-endi-veyer-proekt-ave-mariya.jpg".into(),
            summary: "Астронавт с амнезией просыпается на одиночной миссии по спасению Земли.".into(),
            content_url: String::new(),
            format: BookFormat::Epub,
        },
        Book {
            id: "book-6".into(),
            title: "Загадка старого поместья".into(),
            author_id: "author-1".into(),
            publisher_id: "pub-3".into(),
            publication_year: 2023,
            genres: vec![Genre::Mystery, Genre::Thriller],
            // left empty, served with the default cover
            cover_url: String::new(),
            summary: "Группа друзей решает провести выходные в заброшенном поместье, но вскоре понимает, что они там не одни.".into(),
            content_url: String::new(),
            format: BookFormat::Pdf,
        },
    ];

    let users = vec![
        Account::Regular(User {
            id: "user-1".into(),
            username: "testuser".into(),
            reading_history: vec!["book-1".into(), "book-4".into()],
            want_to_read: vec!["book-2".into()],
            friends: vec![],
        }),
        Account::Admin(AdminUser {
            id: "admin-1".into(),
            username: "sheri".into(),
            role: Role::Admin,
        }),
    ];

    let reviews = vec![Review {
        id: "review-1".into(),
        book_id: "book-1".into(),
        user_id: "user-1".into(),
        rating: 5,
        text: "Волшебная книга! Погружаешься в мир магии с головой.".into(),
        created_at: SEED_REVIEW_CREATED_AT.into(),
    }];

    EntityStore::new(users, authors, publishers, books, reviews)
}

fn author(id: &str, name: &str) -> Author {
    Author {
        id: id.into(),
        name: name.into(),
    }
}

fn publisher(id: &str, name: &str) -> Publisher {
    Publisher {
        id: id.into(),
        name: name.into(),
    }
}
