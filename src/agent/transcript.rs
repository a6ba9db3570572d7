//! Session Transcript
//!
//! Append-only conversation history scoped to one interactive session.
//! Owned exclusively by the session loop; the model client only ever
//! sees it as an ordered slice.

use crate::types::{TranscriptTurn, TurnRole};

#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<TranscriptTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: TurnRole, text: impl Into<String>) {
        self.turns.push(TranscriptTurn {
            role,
            text: text.into(),
        });
    }

    /// The ordered turns, oldest first.
    pub fn as_context(&self) -> &[TranscriptTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(TurnRole::User, "first");
        transcript.append(TurnRole::Assistant, "second");
        transcript.append(TurnRole::ToolFeedback, "third");

        let turns = transcript.as_context();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text, "first");
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert_eq!(turns[2].role, TurnRole::ToolFeedback);
    }

    #[test]
    fn test_new_is_empty() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }
}
