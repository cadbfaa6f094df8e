use serde::{Deserialize, Serialize};

use crate::snippets::repo_types::Snippet;

/// Lifetimes offered by the create form, in days.
pub const PERMITTED_EXPIRY_DAYS: [i64; 3] = [1, 7, 365];

#[derive(Debug, Deserialize)]
pub struct CreateSnippetRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateFormResponse {
    pub expires: i64,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub flash: Option<String>,
    pub snippets: Vec<Snippet>,
}

#[derive(Debug, Serialize)]
pub struct SnippetResponse {
    pub flash: Option<String>,
    pub snippet: Snippet,
}
