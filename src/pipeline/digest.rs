// src/pipeline/digest.rs

//! One digest run: crawl, summarize, deliver.

use std::time::Duration;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::crawl::CrawlOrchestrator;
use crate::services::{
    DeliveryReport, GeminiSummarizer, Notifier, Summarizer, build_notifier, summarize_papers,
};
use crate::utils::Pacer;

/// What a digest run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestOutcome {
    pub papers: usize,
    pub summarized: usize,
    pub delivery: DeliveryReport,
}

/// Run the digest with collaborators built from `config`.
pub async fn run_digest(config: &Config, skip_summary: bool) -> Result<DigestOutcome> {
    let orchestrator = CrawlOrchestrator::from_config(config)?;
    let summarizer = if config.summarizer.enabled && !skip_summary {
        Some(GeminiSummarizer::new(
            &config.summarizer,
            &config.crawler.user_agent,
        )?)
    } else {
        None
    };
    let notifier = build_notifier(&config.notifier, &config.crawler)?;
    let pacer = Pacer::new(Duration::from_millis(config.summarizer.delay_ms));

    run_digest_with(
        &orchestrator,
        summarizer.as_ref().map(|s| s as &dyn Summarizer),
        notifier.as_ref(),
        pacer,
    )
    .await
}

/// Run the digest with explicit collaborators.
///
/// A failed crawl is returned and nothing is delivered. Summarization
/// failures are logged and the digest goes out with whatever summaries
/// were attached.
pub async fn run_digest_with(
    orchestrator: &CrawlOrchestrator,
    summarizer: Option<&dyn Summarizer>,
    notifier: &dyn Notifier,
    pacer: Pacer,
) -> Result<DigestOutcome> {
    let mut papers = match orchestrator.fetch_window_papers().await {
        Ok(papers) => papers,
        Err(e) => {
            log::error!("Crawl failed, no digest will be sent: {e}");
            return Err(e);
        }
    };

    let mut outcome = DigestOutcome {
        papers: papers.len(),
        ..DigestOutcome::default()
    };
    if papers.is_empty() {
        log::info!("No new papers in this window");
        return Ok(outcome);
    }

    if let Some(summarizer) = summarizer {
        match summarize_papers(&mut papers, summarizer, pacer).await {
            Ok(count) => outcome.summarized = count,
            Err(e) => {
                outcome.summarized = papers.iter().filter(|p| p.ai_summary().is_some()).count();
                log::error!("Summarization stopped: {e}");
            }
        }
    }

    outcome.delivery = notifier.send_digest(&papers).await;
    Ok(outcome)
}
