//! Document- and Image-Understanding boundaries.
//!
//! Both collaborators are advisory: the evidence normalizer absorbs any
//! failure here and degrades that signal to an empty string, so neither
//! implementation needs its own fallback logic.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::llm_client::LlmClient;

const PROFILE_TRANSCRIBE_INSTRUCTION: &str = "Transcribe all professional information \
    visible in this profile screenshot as plain text: headline, roles, companies, \
    dates, skills, and education. Output only the transcription.";

/// Extracts plain text from a binary document (resume PDF).
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn extract_text(&self, document: &[u8]) -> Result<String>;
}

/// Extracts plain text from an image (professional-network profile screenshot).
#[async_trait]
pub trait ImageReader: Send + Sync {
    async fn extract_text(&self, image: &[u8]) -> Result<String>;
}

/// PDF text extraction via `pdf-extract`. The crate is synchronous and can
/// chew CPU on large documents, so it runs on the blocking pool.
pub struct PdfDocumentReader;

#[async_trait]
impl DocumentReader for PdfDocumentReader {
    async fn extract_text(&self, document: &[u8]) -> Result<String> {
        let bytes = document.to_vec();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .context("pdf extraction task panicked")?
            .context("failed to extract text from pdf")?;

        Ok(text)
    }
}

/// Profile-screenshot transcription via the LLM vision endpoint.
pub struct VisionImageReader {
    llm: LlmClient,
}

impl VisionImageReader {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ImageReader for VisionImageReader {
    async fn extract_text(&self, image: &[u8]) -> Result<String> {
        let text = self
            .llm
            .describe_image(image, sniff_media_type(image), PROFILE_TRANSCRIBE_INSTRUCTION)
            .await?;

        Ok(text)
    }
}

/// Uploaded screenshots arrive without a declared content type, so the media
/// type is sniffed from magic bytes. PNG is the safe default for screenshots.
fn sniff_media_type(image: &[u8]) -> &'static str {
    if image.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if image.starts_with(b"GIF8") {
        "image/gif"
    } else if image.len() > 11 && &image[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}
