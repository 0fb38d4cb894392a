// src/services/summarizer.rs

//! AI summaries attached to papers before delivery.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Paper, SummarizerConfig};
use crate::utils::Pacer;
use crate::utils::http::create_client_with;

/// Produces a short summary for one paper.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// The summary text. An empty string means "nothing to add".
    async fn summarize(&self, paper: &Paper) -> Result<String>;
}

/// Summarizer backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    prompt: String,
    api_key: String,
}

impl GeminiSummarizer {
    pub fn new(config: &SummarizerConfig, user_agent: &str) -> Result<Self> {
        let client = create_client_with(user_agent, Duration::from_secs(config.timeout_secs))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &SummarizerConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, paper: &Paper) -> Result<String> {
        let text = format!("{}\n\n{}", self.prompt, paper_prompt(paper));
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &text }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.trim())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::Summarize(format!(
                "{} returned {status}: {}",
                self.model,
                detail.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Summarize(format!("unreadable response: {e}")))?;
        Ok(parsed.text())
    }
}

fn paper_prompt(paper: &Paper) -> String {
    format!(
        "Title: {}\nAuthors: {}\nAbstract: {}",
        paper.title(),
        paper.authors(),
        paper.abstract_text()
    )
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Attach summaries to `papers` in order, pausing between calls.
///
/// Empty summaries are skipped. The first failure stops the run; papers
/// already summarized keep their summaries. Returns how many were attached.
pub async fn summarize_papers(
    papers: &mut [Paper],
    summarizer: &dyn Summarizer,
    pacer: Pacer,
) -> Result<usize> {
    let mut attached = 0;
    for (i, paper) in papers.iter_mut().enumerate() {
        if i > 0 {
            pacer.pause().await;
        }
        let summary = summarizer.summarize(paper).await?;
        let summary = summary.trim();
        if summary.is_empty() {
            log::debug!("Empty summary for {}", paper.id());
            continue;
        }
        paper.set_ai_summary(summary);
        attached += 1;
    }
    log::info!("Summarized {attached}/{} papers", papers.len());
    Ok(attached)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSummarizer;

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, paper: &Paper) -> Result<String> {
            match paper.id() {
                "fail" => Err(AppError::Summarize("quota exceeded".into())),
                "blank" => Ok("   ".into()),
                id => Ok(format!(" summary of {id} ")),
            }
        }
    }

    fn paper(id: &str) -> Paper {
        Paper::new(id, "Title", "A. Author", "Abstract", "https://arxiv.org/abs/x")
    }

    #[tokio::test]
    async fn test_summaries_attached_and_blank_skipped() {
        let mut papers = vec![paper("a"), paper("blank"), paper("b")];
        let attached = summarize_papers(&mut papers, &FakeSummarizer, Pacer::default())
            .await
            .unwrap();

        assert_eq!(attached, 2);
        assert_eq!(papers[0].ai_summary(), Some("summary of a"));
        assert_eq!(papers[1].ai_summary(), None);
        assert_eq!(papers[2].ai_summary(), Some("summary of b"));
    }

    #[tokio::test]
    async fn test_failure_stops_but_keeps_earlier_summaries() {
        let mut papers = vec![paper("a"), paper("fail"), paper("b")];
        let err = summarize_papers(&mut papers, &FakeSummarizer, Pacer::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Summarize(_)));
        assert_eq!(papers[0].ai_summary(), Some("summary of a"));
        assert_eq!(papers[2].ai_summary(), None);
    }

    #[test]
    fn test_response_text_joins_first_candidate_parts() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Plans "}, {"text": "with LLMs. "}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 42}
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), "Plans with LLMs.");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.text(), "");

        let blocked = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(blocked).unwrap();
        assert_eq!(parsed.text(), "");
    }

    #[test]
    fn test_endpoint() {
        let config = SummarizerConfig {
            base_url: "https://example.test/v1beta/".into(),
            model: "gemini-2.0-flash".into(),
            ..SummarizerConfig::default()
        };
        let summarizer = GeminiSummarizer::with_client(reqwest::Client::new(), &config);
        assert_eq!(
            summarizer.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
