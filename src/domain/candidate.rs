#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateValidity {
    Valid,
    Invalid { diagnostic: String },
}

/// One generated SQL statement with its natural-language summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub sql: String,
    pub summary: String,
    pub validity: CandidateValidity,
}

impl Candidate {
    pub fn valid(sql: String, summary: String) -> Self {
        Self {
            sql,
            summary,
            validity: CandidateValidity::Valid,
        }
    }

    pub fn invalid(sql: String, summary: String, diagnostic: String) -> Self {
        Self {
            sql,
            summary,
            validity: CandidateValidity::Invalid { diagnostic },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.validity, CandidateValidity::Valid)
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match &self.validity {
            CandidateValidity::Valid => None,
            CandidateValidity::Invalid { diagnostic } => Some(diagnostic),
        }
    }
}

/// Canonical text used to compare statements when the engine returns no normalized form.
pub fn normalize_sql(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(';').trim_end().to_string()
}
