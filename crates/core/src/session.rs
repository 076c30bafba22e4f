use crate::domain::answer::FormattedAnswer;
use crate::domain::query::{AskQuery, RecentEntry, SavedEntry, Tone, DEFAULT_LOCATION};
use crate::format;

pub const MIN_QUESTION_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Resolved,
    Failed,
}

/// Single-owner state for the ask flow: question, preferences, phase, the
/// raw answer, and the current error. Every transition goes through a method
/// here; nothing else mutates the fields.
#[derive(Debug)]
pub struct AskSession {
    question: String,
    location: String,
    tone: Tone,
    phase: Phase,
    raw_answer: String,
    error: String,
}

impl AskSession {
    pub fn new() -> Self {
        Self {
            question: String::new(),
            location: DEFAULT_LOCATION.to_string(),
            tone: Tone::default(),
            phase: Phase::Idle,
            raw_answer: String::new(),
            error: String::new(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn raw_answer(&self) -> &str {
        &self.raw_answer
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    /// Editing the question returns the flow to idle.
    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
        self.phase = Phase::Idle;
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn can_submit(&self) -> bool {
        self.question.trim().chars().count() >= MIN_QUESTION_CHARS
            && self.phase != Phase::Pending
    }

    /// Enters `pending` and hands back the recent-history record for this
    /// submission. The record is returned (not stored here) so the caller
    /// can write it before the remote call, whatever that call's outcome.
    /// Returns `None` when the guard rejects the submission.
    pub fn begin_submit(&mut self) -> Option<RecentEntry> {
        if !self.can_submit() {
            return None;
        }
        self.error.clear();
        self.raw_answer.clear();
        self.phase = Phase::Pending;
        Some(RecentEntry::new(&self.query()))
    }

    pub fn query(&self) -> AskQuery {
        AskQuery::new(self.question.clone(), self.location.clone(), self.tone)
    }

    pub fn resolve(&mut self, answer: impl Into<String>) {
        self.raw_answer = answer.into();
        self.phase = Phase::Resolved;
    }

    /// The raw answer stays empty on failure.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = message.into();
        self.phase = Phase::Failed;
    }

    /// Recomputed from the raw answer on every call; the formatted view is
    /// never stored.
    pub fn sections(&self) -> FormattedAnswer {
        format::split_sections(&self.raw_answer)
    }

    /// A saved entry for the current answer, or `None` when there is nothing
    /// worth saving.
    pub fn save_answer(&self) -> Option<SavedEntry> {
        if self.raw_answer.trim().is_empty() {
            return None;
        }
        Some(SavedEntry::new(&self.query(), self.raw_answer.clone()))
    }

    /// Restores a saved answer in full.
    pub fn load_saved(&mut self, entry: &SavedEntry) {
        self.question = entry.question.clone();
        self.location = entry.location.clone();
        self.tone = entry.tone;
        self.raw_answer = entry.answer.clone();
        self.error.clear();
        self.phase = Phase::Resolved;
    }

    /// Restores only the query fields; the question must be re-asked.
    pub fn load_recent(&mut self, entry: &RecentEntry) {
        self.question = entry.question.clone();
        self.location = entry.location.clone();
        self.tone = entry.tone;
        self.raw_answer.clear();
        self.error.clear();
        self.phase = Phase::Idle;
    }
}

impl Default for AskSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(question: &str) -> AskSession {
        let mut s = AskSession::new();
        s.set_question(question);
        s
    }

    #[test]
    fn nine_characters_do_not_submit() {
        let mut s = session_with("123456789");
        assert!(!s.can_submit());
        assert!(s.begin_submit().is_none());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn whitespace_does_not_count_toward_the_guard() {
        let s = session_with("   12345678   ");
        assert!(!s.can_submit());
    }

    #[test]
    fn ten_characters_submit_and_record_a_recent_entry() {
        let mut s = session_with("1234567890");
        let entry = s.begin_submit().expect("guard passes");
        assert_eq!(entry.question, "1234567890");
        assert_eq!(entry.location, DEFAULT_LOCATION);
        assert_eq!(s.phase(), Phase::Pending);
    }

    #[test]
    fn pending_blocks_a_second_submission() {
        let mut s = session_with("is now a good time to sell?");
        assert!(s.begin_submit().is_some());
        assert!(s.begin_submit().is_none());
    }

    #[test]
    fn begin_submit_clears_the_previous_round() {
        let mut s = session_with("what should I offer over asking?");
        s.begin_submit().unwrap();
        s.fail("boom");

        s.set_question("what should I offer over asking??");
        s.begin_submit().unwrap();
        assert_eq!(s.error(), "");
        assert_eq!(s.raw_answer(), "");
    }

    #[test]
    fn failure_keeps_the_answer_empty() {
        let mut s = session_with("should I escalate my offer?");
        s.begin_submit().unwrap();
        s.fail("boom");

        assert_eq!(s.phase(), Phase::Failed);
        assert_eq!(s.error(), "boom");
        assert_eq!(s.raw_answer(), "");
        assert!(!s.sections().has_structured);
    }

    #[test]
    fn resolve_stores_the_answer_and_sections_recompute() {
        let mut s = session_with("what do closing costs include?");
        s.begin_submit().unwrap();
        s.resolve("Quick Answer\n- A\nWhat to Watch Out For\n- B\nSmart Next Steps\n- C");

        assert_eq!(s.phase(), Phase::Resolved);
        let sections = s.sections();
        assert!(sections.has_structured);
        assert_eq!(sections.quick, "- A");
        assert_eq!(sections.watch, "- B");
        assert_eq!(sections.next, "- C");
    }

    #[test]
    fn editing_the_question_returns_to_idle() {
        let mut s = session_with("how long does attorney review take?");
        s.begin_submit().unwrap();
        s.set_question("how long does attorney review take??");
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.can_submit());
    }

    #[test]
    fn nothing_to_save_without_an_answer() {
        let mut s = session_with("should I get a survey done?");
        assert!(s.save_answer().is_none());
        s.begin_submit().unwrap();
        s.fail("boom");
        assert!(s.save_answer().is_none());
    }

    #[test]
    fn saving_then_loading_restores_the_full_round() {
        let mut s = session_with("is a cash offer always stronger?");
        s.set_tone(Tone::InvestorLens);
        s.begin_submit().unwrap();
        s.resolve("Quick Answer\n- usually\nWhat to Watch Out For\n- terms\nSmart Next Steps\n- compare");

        let saved = s.save_answer().expect("answer present");

        let mut restored = AskSession::new();
        restored.load_saved(&saved);
        assert_eq!(restored.question(), "is a cash offer always stronger?");
        assert_eq!(restored.tone(), Tone::InvestorLens);
        assert_eq!(restored.phase(), Phase::Resolved);
        assert!(restored.sections().has_structured);
    }

    #[test]
    fn loading_a_recent_entry_leaves_the_answer_empty() {
        let mut s = session_with("what is PMI and can I drop it?");
        let entry = s.begin_submit().unwrap();
        s.resolve("some answer");

        let mut restored = AskSession::new();
        restored.load_recent(&entry);
        assert_eq!(restored.question(), "what is PMI and can I drop it?");
        assert_eq!(restored.raw_answer(), "");
        assert_eq!(restored.phase(), Phase::Idle);
    }
}
