use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_LOCATION: &str = "New Jersey";

/// Answer style requested by the user. The serialized labels double as the
/// wire format of the ask endpoint and the persisted history files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    #[serde(rename = "Professional (Savvy)")]
    Professional,
    #[serde(rename = "Plain English")]
    PlainEnglish,
    #[serde(rename = "Investor Lens")]
    InvestorLens,
}

impl Tone {
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional (Savvy)",
            Tone::PlainEnglish => "Plain English",
            Tone::InvestorLens => "Investor Lens",
        }
    }

    /// Folds unknown labels to the default instead of erroring; callers pass
    /// whatever string the request carried.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Plain English" => Tone::PlainEnglish,
            "Investor Lens" => Tone::InvestorLens,
            _ => Tone::Professional,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One submission, built fresh each time the user asks.
#[derive(Debug, Clone)]
pub struct AskQuery {
    pub question: String,
    pub location: String,
    pub tone: Tone,
}

impl AskQuery {
    pub fn new(question: impl Into<String>, location: impl Into<String>, tone: Tone) -> Self {
        Self {
            question: question.into().trim().to_string(),
            location: location.into(),
            tone,
        }
    }
}

/// Lightweight record of a past query, written whether or not an answer ever
/// arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentEntry {
    pub id: Uuid,
    pub question: String,
    pub location: String,
    pub tone: Tone,
    pub asked_at: DateTime<Utc>,
}

impl RecentEntry {
    pub fn new(query: &AskQuery) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: query.question.clone(),
            location: query.location.clone(),
            tone: query.tone,
            asked_at: Utc::now(),
        }
    }
}

/// User-curated record pairing a query with the full received answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEntry {
    pub id: Uuid,
    pub question: String,
    pub location: String,
    pub tone: Tone,
    pub answer: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedEntry {
    pub fn new(query: &AskQuery, answer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: query.question.clone(),
            location: query.location.clone(),
            tone: query.tone,
            answer: answer.into(),
            saved_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_labels_round_trip() {
        for tone in [Tone::Professional, Tone::PlainEnglish, Tone::InvestorLens] {
            assert_eq!(Tone::from_label(tone.label()), tone);
        }
    }

    #[test]
    fn unknown_tone_label_folds_to_default() {
        assert_eq!(Tone::from_label("Sarcastic"), Tone::Professional);
        assert_eq!(Tone::from_label(""), Tone::Professional);
    }

    #[test]
    fn tone_serializes_as_its_label() {
        let json = serde_json::to_string(&Tone::PlainEnglish).unwrap();
        assert_eq!(json, "\"Plain English\"");
        let back: Tone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Tone::PlainEnglish);
    }

    #[test]
    fn ask_query_trims_the_question() {
        let q = AskQuery::new("  what about closing costs?  ", DEFAULT_LOCATION, Tone::default());
        assert_eq!(q.question, "what about closing costs?");
    }
}
