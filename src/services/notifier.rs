// src/services/notifier.rs

//! Digest rendering and delivery.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, NotifierConfig, NotifierKind, Paper};
use crate::utils::http::create_async_client;

/// A rendered digest message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
}

/// Renders a batch of papers as an HTML digest.
pub struct DigestComposer;

impl DigestComposer {
    pub fn subject(count: usize) -> String {
        format!("[arXiv Daily Digest] {count} new papers today")
    }

    pub fn compose(papers: &[Paper]) -> Digest {
        let mut html = String::from("<html><body>\n");
        html.push_str("<h2>arXiv Daily Papers</h2>\n");
        html.push_str("<p>Here are today's new papers from arXiv:</p>\n<hr/>\n");

        for paper in papers {
            html.push_str(&format!(
                "<h3><a href=\"{}\">{}</a></h3>\n",
                encode_double_quoted_attribute(paper.url()),
                encode_text(paper.title())
            ));
            html.push_str(&format!(
                "<p><strong>Authors:</strong> {}</p>\n",
                encode_text(paper.authors())
            ));
            html.push_str(&format!(
                "<p><strong>Abstract:</strong> {}</p>\n",
                encode_text(paper.abstract_text())
            ));
            if let Some(summary) = paper.ai_summary() {
                html.push_str(&format!(
                    "<p><strong>AI Summary:</strong> {}</p>\n",
                    encode_text(summary)
                ));
            }
            html.push_str("<hr/>\n");
        }

        html.push_str("<p>Generated automatically by paper-digest.</p>\n</body></html>\n");
        Digest {
            subject: Self::subject(papers.len()),
            html,
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers a digest. Failures are logged and counted, never raised.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_digest(&self, papers: &[Paper]) -> DeliveryReport;
}

/// Build the notifier selected by `notifier.kind`.
pub fn build_notifier(config: &NotifierConfig, crawler: &CrawlerConfig) -> Result<Box<dyn Notifier>> {
    let notifier: Box<dyn Notifier> = match config.kind {
        NotifierKind::File => Box::new(FileNotifier::new(&config.output_dir)),
        NotifierKind::Webhook => Box::new(WebhookNotifier::new(
            create_async_client(crawler)?,
            config,
        )),
    };
    Ok(notifier)
}

/// Writes each digest as an HTML file.
pub struct FileNotifier {
    output_dir: PathBuf,
}

impl FileNotifier {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    async fn write(&self, digest: &Digest) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let name = format!("digest-{}.html", Utc::now().format("%Y%m%d-%H%M%S"));
        let path = self.output_dir.join(name);
        tokio::fs::write(&path, &digest.html).await?;
        Ok(path)
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    async fn send_digest(&self, papers: &[Paper]) -> DeliveryReport {
        if papers.is_empty() {
            log::info!("No new papers, skipping digest");
            return DeliveryReport::default();
        }
        let digest = DigestComposer::compose(papers);
        match self.write(&digest).await {
            Ok(path) => {
                log::info!("Digest written to {}", path.display());
                DeliveryReport {
                    delivered: 1,
                    failed: 0,
                }
            }
            Err(e) => {
                log::error!("Failed to write digest: {e}");
                DeliveryReport {
                    delivered: 0,
                    failed: 1,
                }
            }
        }
    }
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts the digest to a mail relay, one message per recipient.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    sender: String,
    recipients: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, config: &NotifierConfig) -> Self {
        Self {
            client,
            url: config.webhook_url.clone(),
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
        }
    }

    async fn deliver(&self, recipient: &str, digest: &Digest) -> Result<()> {
        let message = RelayMessage {
            from: &self.sender,
            to: recipient,
            subject: &digest.subject,
            html: &digest.html,
        };
        let response = self.client.post(&self.url).json(&message).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Notify(format!(
                "relay rejected message for {recipient}: {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_digest(&self, papers: &[Paper]) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        if papers.is_empty() {
            log::info!("No new papers, skipping digest");
            return report;
        }
        let digest = DigestComposer::compose(papers);
        for recipient in &self.recipients {
            match self.deliver(recipient, &digest).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    log::error!("Failed to send digest to {recipient}: {e}");
                    report.failed += 1;
                }
            }
        }
        log::info!(
            "Digest sent to {}/{} recipients",
            report.delivered,
            self.recipients.len()
        );
        report
    }
}
