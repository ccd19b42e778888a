use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::MovieSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovieStatus {
    #[default]
    NowShowing,
    ComingSoon,
}

impl MovieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::NowShowing => "now-showing",
            MovieStatus::ComingSoon => "coming-soon",
        }
    }
}

impl FromStr for MovieStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "now-showing" => Ok(MovieStatus::NowShowing),
            "coming-soon" => Ok(MovieStatus::ComingSoon),
            other => Err(format!("unknown movie status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    /// Minutes.
    pub duration: i32,
    pub release_date: NaiveDate,
    pub poster_url: String,
    pub trailer_url: String,
    pub cast: Vec<String>,
    pub status: MovieStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog fields of a movie, as submitted by an admin.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    pub duration: i32,
    pub release_date: NaiveDate,
    pub poster_url: String,
    pub trailer_url: String,
    pub cast: Vec<String>,
    pub status: MovieStatus,
}

impl Movie {
    pub fn from_draft(draft: MovieDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            genre: draft.genre,
            duration: draft.duration,
            release_date: draft.release_date,
            poster_url: draft.poster_url,
            trailer_url: draft.trailer_url,
            cast: draft.cast,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the catalog fields, keeping identity and creation time.
    pub fn apply(&mut self, draft: MovieDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.genre = draft.genre;
        self.duration = draft.duration;
        self.release_date = draft.release_date;
        self.poster_url = draft.poster_url;
        self.trailer_url = draft.trailer_url;
        self.cast = draft.cast;
        self.status = draft.status;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            title: self.title.clone(),
            poster_url: self.poster_url.clone(),
        }
    }
}
