use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{CollaboratorError, ContextProvider};
use crate::domain::{SchemaContext, SchemaDocument, SqlSample};

#[derive(Deserialize)]
struct SchemaDocumentRecord {
    name: String,
    ddl: String,
}

#[derive(Deserialize)]
struct SqlSampleRecord {
    question: String,
    sql: String,
}

/// Serves schema documents held in memory, picking those that share a term with the question.
pub struct InMemorySchemaProvider {
    documents: Vec<SchemaDocument>,
    samples: Vec<SqlSample>,
    top_k: usize,
}

impl InMemorySchemaProvider {
    pub fn new(documents: Vec<SchemaDocument>, top_k: usize) -> Self {
        Self {
            documents,
            samples: Vec::new(),
            top_k,
        }
    }

    pub fn with_samples(mut self, samples: Vec<SqlSample>) -> Self {
        self.samples = samples;
        self
    }

    /// Reads question/SQL pairs from a JSON array of `{ "question", "sql" }` objects.
    pub async fn load_samples(path: impl AsRef<Path>) -> Result<Vec<SqlSample>, SchemaLoadError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let records: Vec<SqlSampleRecord> = serde_json::from_str(&raw)?;
        Ok(records
            .into_iter()
            .map(|r| SqlSample {
                question: r.question,
                sql: r.sql,
            })
            .collect())
    }

    /// Loads documents from a JSON array of `{ "name", "ddl" }` objects.
    pub async fn from_file(
        path: impl AsRef<Path>,
        top_k: usize,
    ) -> Result<Self, SchemaLoadError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let records: Vec<SchemaDocumentRecord> = serde_json::from_str(&raw)?;
        let documents = records
            .into_iter()
            .map(|r| SchemaDocument {
                name: r.name,
                ddl: r.ddl,
            })
            .collect();
        Ok(Self::new(documents, top_k))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl ContextProvider for InMemorySchemaProvider {
    async fn retrieve(&self, question: &str) -> Result<SchemaContext, CollaboratorError> {
        let question_terms = terms(question);

        let documents = best_matches(&self.documents, &question_terms, self.top_k, |d| {
            format!("{} {}", d.name, d.ddl)
        });
        let samples = best_matches(&self.samples, &question_terms, self.top_k, |s| {
            s.question.clone()
        });

        Ok(SchemaContext::new(documents).with_samples(samples))
    }
}

/// Items sharing at least one term with the question, most shared terms first.
fn best_matches<T: Clone>(
    items: &[T],
    question_terms: &HashSet<String>,
    top_k: usize,
    text: impl Fn(&T) -> String,
) -> Vec<T> {
    let mut scored: Vec<(usize, &T)> = items
        .iter()
        .filter_map(|item| {
            let overlap = question_terms.intersection(&terms(&text(item))).count();
            (overlap > 0).then_some((overlap, item))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(top_k)
        .map(|(_, item)| item.clone())
        .collect()
}

/// Lowercased word stems longer than two characters, with a trailing plural `s` dropped.
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|word| word.len() > 2)
        .map(|word| {
            let word = word.to_lowercase();
            match word.strip_suffix('s') {
                Some(stem) if stem.len() > 2 => stem.to_string(),
                _ => word,
            }
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse schema file: {0}")]
    Parse(#[from] serde_json::Error),
}
