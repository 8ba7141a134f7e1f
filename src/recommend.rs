//! Book recommendations from a generative text service.
//!
//! A [`Recommender`] never fails: without credentials, or when the service call goes wrong in
//! any way, it answers with a fixed list instead.
use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::model::Book;
use crate::{BookishError, Result};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A recommended book: its title, then a one sentence description, a genre and a year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// book title
    pub title: String,
    /// description, genre and year
    pub details: Vec<String>,
}

impl Recommendation {
    fn new(title: &str, details: &[&str]) -> Self {
        Recommendation {
            title: title.to_string(),
            details: details.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Anything that can suggest books from a reader's history
pub trait Recommender {
    /// recommendations based on `read_books`
    fn recommend(&self, read_books: &[Book]) -> Vec<Recommendation>;
}

/// returned when no api key is configured
pub fn fallback_without_key() -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            "Похитительница звездной пыли",
            &[
                "Торговец магическими реликвиями, вынужденный отправиться в опасное путешествие.",
                "Фэнтези",
                "2022",
            ],
        ),
        Recommendation::new(
            "Проект «Аве Мария»",
            &[
                "Астронавт с амнезией просыпается на одиночной миссии по спасению Земли.",
                "Научная фантастика",
                "2021",
            ],
        ),
    ]
}

/// returned when the service call fails
pub fn fallback_on_error() -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            "Приорат апельсинового дерева",
            &["Мир драконов, королев и магов.", "Фэнтези", "2019"],
        ),
        Recommendation::new(
            "Дюна",
            &[
                "Благородная семья сражается за контроль над пустынной планетой.",
                "Научная фантастика",
                "1965",
            ],
        ),
    ]
}

/// Settings of the Gemini service
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// the api key; without one the recommender only serves the fallback list
    pub api_key: Option<String>,
    /// model name, e.g. `gemini-2.5-flash`
    pub model: String,
    /// base url of the REST api
    pub endpoint: String,
}

impl GeminiConfig {
    /// reads the key from `GEMINI_API_KEY`, then `API_KEY`
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());
        GeminiConfig {
            api_key,
            ..GeminiConfig::default()
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// A [`Recommender`] backed by the Gemini `generateContent` api
#[derive(Debug, Clone)]
pub struct GeminiRecommender {
    config: GeminiConfig,
    http: reqwest::blocking::Client,
}

impl GeminiRecommender {
    /// builds the recommender and its http client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.is_none() {
            warn!("Gemini api key not found, recommendations will use a fixed list");
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(GeminiRecommender { config, http })
    }

    fn generate(&self, api_key: &str, read_books: &[Book]) -> Result<Vec<Recommendation>> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(read_books) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            },
        });

        debug!("requesting recommendations from {}", url);
        let resp: Value = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        parse_generation(&resp)
    }
}

impl Recommender for GeminiRecommender {
    fn recommend(&self, read_books: &[Book]) -> Vec<Recommendation> {
        let api_key = match &self.config.api_key {
            Some(key) => key,
            None => return fallback_without_key(),
        };
        match self.generate(api_key, read_books) {
            Ok(recommendations) => recommendations,
            Err(e) => {
                error!("Failed to generate recommendations: {}", e);
                fallback_on_error()
            }
        }
    }
}

/// the prompt asking for five books similar to `read_books`
pub fn build_prompt(read_books: &[Book]) -> String {
    let book_list = read_books
        .iter()
        .map(|book| {
            let genres: Vec<&str> = book.genres.iter().map(|g| g.name()).collect();
            format!("- {} (автор жанра {})", book.title, genres.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "На основе следующего списка прочитанных мною книг, пожалуйста, порекомендуй 5 других книг. \
Для каждой книги укажи одно предложение с описанием, основной жанр и год публикации.\n\n\
Мои прочитанные книги:\n{}\n\n\
Предоставь рекомендации в структурированном формате.\n",
        book_list
    )
}

fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "Название рекомендованной книги.",
                },
                "details": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Массив, содержащий описание в одно предложение, жанр и год публикации в виде строк.",
                },
            },
            "required": ["title", "details"],
        },
    })
}

/// extracts the recommendations from a `generateContent` response body
///
/// # Errors
/// `BookishError::Remote` if the body holds no generated text, `BookishError::Serde` if the
/// text is not a list of recommendations
pub fn parse_generation(resp: &Value) -> Result<Vec<Recommendation>> {
    let text = resp
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| BookishError::Remote {
            status: 502,
            message: "generation response contains no text".to_string(),
        })?;
    Ok(serde_json::from_str(text.trim())?)
}
