// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini client for coach-style feedback on a competition result.
//!
//! Feedback is optional: without an API key, or when the upstream call
//! fails, callers get a fixed fallback text instead of an error.

use crate::error::AppError;
use serde::Deserialize;

/// Shown when no API key is configured.
pub const FEEDBACK_DISABLED: &str = "AI feedback is not configured for this club.";
/// Shown when the upstream call fails.
pub const FEEDBACK_FAILED: &str = "AI performance analysis failed. Please try again later.";
/// Shown when the model answers with no text.
pub const FEEDBACK_EMPTY: &str = "No analysis generated.";

/// Outcome of a feedback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    /// Text produced by the model
    Generated(String),
    /// Fixed text used when the model could not be asked
    Fallback(&'static str),
}

impl Analysis {
    pub fn text(&self) -> &str {
        match self {
            Analysis::Generated(text) => text,
            Analysis::Fallback(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Analysis::Generated(_))
    }
}

#[derive(Clone)]
pub struct FeedbackService {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl FeedbackService {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model,
            api_key,
        }
    }

    /// Point the client at another endpoint (local stubs in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask for short coaching feedback on one result.
    pub async fn analyze(&self, wins: u32, losses: u32, notes: &str, category: &str) -> Analysis {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Feedback requested but GEMINI_API_KEY is not set");
            return Analysis::Fallback(FEEDBACK_DISABLED);
        };

        let prompt = build_prompt(wins, losses, notes, category);
        match self.generate(api_key, &prompt).await {
            Ok(Some(text)) => Analysis::Generated(text),
            Ok(None) => Analysis::Fallback(FEEDBACK_EMPTY),
            Err(e) => {
                tracing::warn!(error = %e, model = %self.model, "Feedback generation failed");
                Analysis::Fallback(FEEDBACK_FAILED)
            }
        }
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Feedback(e.to_string()))?;

        let parsed: GenerateContentResponse = check_response_json(response).await?;
        Ok(parsed.text())
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Gemini rate limit hit (429)");
        }

        return Err(AppError::Feedback(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Feedback(format!("JSON parse error: {}", e)))
}

fn build_prompt(wins: u32, losses: u32, notes: &str, category: &str) -> String {
    let notes = if notes.trim().is_empty() {
        "(none)"
    } else {
        notes.trim()
    };
    format!(
        "Act as an Olympic-level judo coach.\n\
         Analyse an athlete's performance in the {category} category.\n\
         Results: {wins} wins, {losses} losses.\n\
         Athlete's notes: \"{notes}\"\n\
         Give short, constructive and motivating feedback (at most 3 sentences), \
         pointing out what to improve based on the notes."
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
