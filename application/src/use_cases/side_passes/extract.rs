//! Structured-data extraction at session end.

use crate::ports::generator::{GenerationRequest, TextGenerator};
use crate::ports::progress::ConversationNotifier;
use crate::use_cases::shared::{GenerationService, TurnError};
use roundtable_domain::core::string::tail;
use roundtable_domain::{PromptTemplate, SharedDocument};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// History lines sent with the document.
const EXTRACTION_HISTORY_LINES: usize = 20;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction request failed: {0}")]
    Generation(#[from] TurnError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Strip surrounding whitespace and markdown code fences from a JSON reply.
pub fn clean_json(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub struct DataExtractor<G: TextGenerator + 'static> {
    service: GenerationService<G>,
    document: Arc<SharedDocument>,
    schema_description: String,
    output_file: PathBuf,
}

impl<G: TextGenerator + 'static> DataExtractor<G> {
    pub fn new(
        service: GenerationService<G>,
        document: Arc<SharedDocument>,
        schema_description: impl Into<String>,
        output_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            service,
            document,
            schema_description: schema_description.into(),
            output_file: output_file.into(),
        }
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Extract data from the document and recent history, then write it to
    /// the output file. The reply is written as-is once fences are removed.
    pub async fn extract(
        &self,
        history: &[String],
        cancel: Option<&CancellationToken>,
        progress: &dyn ConversationNotifier,
    ) -> Result<PathBuf, ExtractionError> {
        let history_text = tail(history, EXTRACTION_HISTORY_LINES).join("\n");
        let request = GenerationRequest::new(
            PromptTemplate::extraction_system(&self.schema_description),
            PromptTemplate::extraction(
                &self.document.content(),
                &history_text,
                &self.schema_description,
            ),
        );

        let reply = self
            .service
            .generate_metered("Data extraction", &request, cancel, progress)
            .await?;

        if let Some(parent) = self.output_file.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| ExtractionError::Write {
                path: self.output_file.clone(),
                source,
            })?;
        }
        std::fs::write(&self.output_file, clean_json(&reply)).map_err(|source| {
            ExtractionError::Write {
                path: self.output_file.clone(),
                source,
            }
        })?;

        Ok(self.output_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoConversationProgress;
    use crate::testing::MockGenerator;

    #[test]
    fn test_clean_json() {
        assert_eq!(clean_json("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json("```\n[1]\n```\n"), "[1]");
        assert_eq!(clean_json("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_extract_writes_clean_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("data.json");
        let generator = Arc::new(MockGenerator::with_replies([
            "```json\n{\"decision\": \"Rust\"}\n```",
        ]));
        let doc = Arc::new(SharedDocument::from_markdown("# Plan\n\nUse Rust.\n\n"));
        let extractor = DataExtractor::new(
            GenerationService::unmetered(generator.clone()),
            doc,
            "decision: the chosen language",
            &output,
        );

        let history: Vec<String> = (0..25).map(|i| format!("Ada: msg {i}")).collect();
        let path = extractor
            .extract(&history, None, &NoConversationProgress)
            .await
            .unwrap();

        assert_eq!(path, output);
        let written = std::fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["decision"], "Rust");

        let request = &generator.requests()[0];
        assert!(request.system.contains("'decision: the chosen language'"));
        assert!(request.prompt.contains("Use Rust."));
        assert!(!request.prompt.contains("msg 4\n"));
        assert!(request.prompt.contains("msg 5"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("data.json");
        let generator = Arc::new(MockGenerator::with_replies(Vec::<String>::new()));
        let extractor = DataExtractor::new(
            GenerationService::unmetered(generator),
            Arc::new(SharedDocument::new()),
            "anything",
            &output,
        );

        let result = extractor.extract(&[], None, &NoConversationProgress).await;

        assert!(matches!(result, Err(ExtractionError::Generation(_))));
        assert!(!output.exists());
    }
}
