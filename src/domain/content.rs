use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single piece of generated content. Records are append-only per category;
/// the latest `generated_at` determines what callers see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: ContentId,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

impl ContentRecord {
    /// Whether this record still falls inside the cooldown window at `now`.
    pub fn is_fresh(&self, cooldown: Duration, now: DateTime<Utc>) -> bool {
        now - self.generated_at < cooldown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    pub category: String,
    pub title: Option<String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Split raw generated text into a title and body: the trimmed first line is
/// the title, the trimmed remainder the body. Text without a newline becomes
/// a bare title with an empty body.
pub fn split_title_body(text: &str) -> (String, String) {
    match text.split_once('\n') {
        Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

/// A content category with its generation prompt and cooldown. Categories
/// partition independent cooldown timelines.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    pub slug: String,
    pub prompt: String,
    pub cooldown: Duration,
}

impl CategorySpec {
    pub fn new(slug: impl Into<String>, prompt: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            slug: slug.into(),
            prompt: prompt.into(),
            cooldown,
        }
    }
}

/// The built-in categories served by the site, sharing one cooldown.
pub fn default_categories(cooldown: Duration) -> Vec<CategorySpec> {
    vec![
        CategorySpec::new(
            "motivational-phrase",
            "Write a short, original motivational phrase. No introductions or \
             quotation marks, just the phrase itself.",
            cooldown,
        ),
        CategorySpec::new(
            "training-tip",
            "Write a paragraph of roughly ten lines with training tips for \
             beginners. No introductions, headings or greetings, just the tips.",
            cooldown,
        ),
        CategorySpec::new(
            "news",
            "Write an interesting, upbeat piece of news about technology, at \
             least ten paragraphs long. Put a catchy headline on the first line.",
            cooldown,
        ),
    ]
}
