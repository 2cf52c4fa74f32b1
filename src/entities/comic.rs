use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::{CoverDate, Username};

/// Query parameter stamped onto every stored image URL. Stands in for a
/// future re-hosting step that would rewrite the URL to a managed bucket.
const IMAGE_MARKER: (&str, &str) = ("test", "done");

#[derive(Error, Debug)]
pub enum InvalidComicError {
    #[error("invalid image URL: {0}")]
    ImageUrl(#[from] url::ParseError),
}

/// A persisted comic record. `id`, `username`, and the timestamps are
/// storage- and server-assigned; clients never write them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: i64,
    pub title: String,
    pub issue_number: String,
    pub main_character: String,
    pub genre: String,
    pub cover_year: CoverDate,
    pub publisher: String,
    pub grade: f64,
    pub price: f64,
    pub image_url: String,
    pub username: Username,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Create payload. Descriptive fields default to empty like the original
/// wire format; the cover date and image URL must be present and valid.
/// There is deliberately no `username` field, and unknown fields are
/// dropped, so ownership can only come from the verified token.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComic {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub issue_number: String,
    #[serde(default)]
    pub main_character: String,
    #[serde(default)]
    pub genre: String,
    pub cover_year: CoverDate,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub grade: f64,
    #[serde(default)]
    pub price: f64,
    pub image_url: String,
}

/// Partial-update payload: only present fields overwrite. An explicit JSON
/// `null` deserializes to `None` and is indistinguishable from an absent
/// field; both leave the prior value in place. Known limitation carried
/// over from the original wire behavior.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComic {
    pub title: Option<String>,
    pub issue_number: Option<String>,
    pub main_character: Option<String>,
    pub genre: Option<String>,
    pub cover_year: Option<CoverDate>,
    pub publisher: Option<String>,
    pub grade: Option<f64>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

impl Comic {
    /// Merges a patch onto the record. `id`, `username`, and the timestamps
    /// are not reachable from the payload.
    pub fn apply(&mut self, patch: UpdateComic) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(issue_number) = patch.issue_number {
            self.issue_number = issue_number;
        }
        if let Some(main_character) = patch.main_character {
            self.main_character = main_character;
        }
        if let Some(genre) = patch.genre {
            self.genre = genre;
        }
        if let Some(cover_year) = patch.cover_year {
            self.cover_year = cover_year;
        }
        if let Some(publisher) = patch.publisher {
            self.publisher = publisher;
        }
        if let Some(grade) = patch.grade {
            self.grade = grade;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
    }
}

/// Re-serializes the image URL with the marker parameter appended. Any
/// existing marker pair is replaced rather than duplicated.
pub fn normalize_image_url(raw: &str) -> Result<String, InvalidComicError> {
    let mut url = Url::parse(raw)?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != IMAGE_MARKER.0)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
        query.append_pair(IMAGE_MARKER.0, IMAGE_MARKER.1);
    }
    Ok(url.to_string())
}
