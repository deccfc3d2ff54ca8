use serde::{Deserialize, Serialize};
use url::Url;

/// What a single visit measured, depending on the audit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PageOutcome {
    Status(u16),
    Readability(f64),
    Discovered,
    Unreachable,
}

/// One visited URL and its measurement. Created once per URL, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub outcome: PageOutcome,
}

impl PageRecord {
    pub fn new(url: &Url, outcome: PageOutcome) -> Self {
        Self {
            url: url.to_string(),
            outcome,
        }
    }

    pub fn unreachable(url: &Url) -> Self {
        Self::new(url, PageOutcome::Unreachable)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            PageOutcome::Status(code) => Some(code),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self.outcome {
            PageOutcome::Readability(score) => Some(score),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.outcome == PageOutcome::Unreachable
    }

    pub fn is_broken(&self) -> bool {
        self.status_code() == Some(404)
    }
}
