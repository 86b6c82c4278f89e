//! Catalog references (books, authors, categories, borrowers).
//!
//! The catalog is owned elsewhere; these are read-only views. A reference
//! built from a bare identifier is a "shell": only `id` is set and the other
//! attributes are omitted from the JSON output.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorRef {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BorrowerRef {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookRef {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
}

impl BookRef {
    /// Identifier-only reference
    pub fn shell(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

impl BorrowerRef {
    pub fn shell(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// Flat row for a book joined with its author and category
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub publication_year: i32,
    pub description: Option<String>,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    pub author_bio: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub category_description: Option<String>,
}

impl From<BookRow> for BookRef {
    fn from(row: BookRow) -> Self {
        BookRef {
            id: row.id,
            title: Some(row.title),
            publication_year: Some(row.publication_year),
            description: row.description,
            author: row.author_id.map(|id| AuthorRef {
                id,
                name: row.author_name,
                bio: row.author_bio,
            }),
            category: row.category_id.map(|id| CategoryRef {
                id,
                name: row.category_name,
                description: row.category_description,
            }),
        }
    }
}
