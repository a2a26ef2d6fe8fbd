//! JSON export of the daily digest.

use std::path::{Path, PathBuf};

use anyhow::Context;
use batnews_core::Provider;
use batnews_llm::{EnrichedItem, EnrichmentSource};
use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::pipeline::merge::DigestItem;

#[derive(Debug, Serialize)]
pub(crate) struct DigestRecord {
    pub uid: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub provider: Provider,
    pub published_at: String,
    pub relevance: u8,
    pub importance: u8,
    pub score: f64,
    pub tier: u8,
    pub entities: Vec<String>,
    pub topic: Option<&'static str>,
    pub group_size: usize,
    pub related_links: Vec<String>,
    pub summary: Vec<String>,
    pub companies: Vec<String>,
    pub enrichment: EnrichmentSource,
}

#[derive(Debug, Serialize)]
pub(crate) struct DigestFile {
    pub date: String,
    pub count: usize,
    pub items: Vec<DigestRecord>,
}

/// Stable record id: first 16 bytes of the link's SHA-256, hex encoded.
#[must_use]
pub(crate) fn record_uid(link: &str) -> String {
    Sha256::digest(link.as_bytes())
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub(crate) fn build_records(items: &[DigestItem], enrichments: &[EnrichedItem]) -> Vec<DigestRecord> {
    items
        .iter()
        .zip(enrichments)
        .map(|(digest, enriched)| {
            let item = &digest.item;
            let c = &item.candidate;
            DigestRecord {
                uid: record_uid(&c.link),
                title: c.title.clone(),
                link: c.link.clone(),
                source: c.source.clone(),
                provider: c.provider,
                published_at: c.published_at.to_rfc3339(),
                relevance: item.relevance,
                importance: item.importance,
                score: (digest.score * 10.0).round() / 10.0,
                tier: digest.tier,
                entities: item.entities.clone(),
                topic: item.topic,
                group_size: item.group_size,
                related_links: item.related_links.clone(),
                summary: enriched.summary.clone(),
                companies: enriched.companies.clone(),
                enrichment: enriched.source,
            }
        })
        .collect()
}

/// `<output_dir>/<date>/selection.json`.
#[must_use]
pub(crate) fn selection_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir
        .join(date.format("%Y-%m-%d").to_string())
        .join("selection.json")
}

pub(crate) fn render(date: NaiveDate, records: Vec<DigestRecord>) -> anyhow::Result<String> {
    let file = DigestFile {
        date: date.format("%Y-%m-%d").to_string(),
        count: records.len(),
        items: records,
    };
    serde_json::to_string_pretty(&file).context("failed to serialize digest")
}

/// Write the rendered digest, creating the dated directory.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub(crate) fn write_selection(
    output_dir: &Path,
    date: NaiveDate,
    records: Vec<DigestRecord>,
) -> anyhow::Result<PathBuf> {
    let path = selection_path(output_dir, date);
    let json = render(date, records)?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
