/// A serialized schema fragment handed to SQL generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    pub name: String,
    pub ddl: String,
}

/// A question paired with SQL known to answer it, used as a few-shot example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlSample {
    pub question: String,
    pub sql: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaContext {
    pub documents: Vec<SchemaDocument>,
    pub samples: Vec<SqlSample>,
}

impl SchemaContext {
    pub fn new(documents: Vec<SchemaDocument>) -> Self {
        Self {
            documents,
            samples: Vec::new(),
        }
    }

    pub fn with_samples(mut self, samples: Vec<SqlSample>) -> Self {
        self.samples = samples;
        self
    }

    /// Samples alone do not make a context usable; generation needs schema.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
