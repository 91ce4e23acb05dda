//! Flashcards parsed from `Term:` / `Definition:` pairs.

use serde::{Serialize, Serializer};

use crate::model::Flashcard;

/// Number of flashcards in every set.
pub const FLASHCARD_COUNT: usize = 10;

const TERM_PREFIX: &str = "Term:";
const DEFINITION_PREFIX: &str = "Definition:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardSet {
    cards: Vec<Flashcard>,
    synthetic_count: usize,
}

impl FlashcardSet {
    fn from_parsed(mut cards: Vec<Flashcard>) -> Self {
        cards.truncate(FLASHCARD_COUNT);
        let parsed = cards.len();
        cards.extend((parsed + 1..=FLASHCARD_COUNT).filter_map(|n| {
            Flashcard::new(format!("Term {n}"), format!("Definition {n}")).ok()
        }));
        Self {
            synthetic_count: FLASHCARD_COUNT - parsed,
            cards,
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    #[must_use]
    pub fn synthetic_count(&self) -> usize {
        self.synthetic_count
    }
}

impl Serialize for FlashcardSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.cards)
    }
}

/// Parse term/definition pairs and pad to `FLASHCARD_COUNT` with placeholders.
///
/// A `Definition:` line pairs with the closest preceding unpaired `Term:`
/// line. Anything else is ignored.
#[must_use]
pub fn parse_flashcards(raw: Option<&str>) -> FlashcardSet {
    let Some(raw) = raw else {
        return FlashcardSet::from_parsed(Vec::new());
    };

    let mut cards = Vec::with_capacity(FLASHCARD_COUNT);
    let mut pending_term: Option<&str> = None;
    for line in raw.lines() {
        let line = line.trim().trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | ' '));
        if let Some(term) = line.strip_prefix(TERM_PREFIX) {
            pending_term = Some(term);
        } else if let Some(definition) = line.strip_prefix(DEFINITION_PREFIX) {
            if let Some(card) = pending_term
                .take()
                .and_then(|term| Flashcard::new(term, definition).ok())
            {
                cards.push(card);
            }
        }
        if cards.len() == FLASHCARD_COUNT {
            break;
        }
    }

    FlashcardSet::from_parsed(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_terms_with_definitions() {
        let raw = "Term: Borrow\nDefinition: A reference to a value\n\n- Term: Move\n- Definition: Ownership transfer\n";
        let set = parse_flashcards(Some(raw));
        assert_eq!(set.cards()[0].front(), "Borrow");
        assert_eq!(set.cards()[1].back(), "Ownership transfer");
        assert_eq!(set.synthetic_count(), FLASHCARD_COUNT - 2);
        assert_eq!(set.cards().len(), FLASHCARD_COUNT);
        assert_eq!(set.cards()[2].front(), "Term 3");
    }

    #[test]
    fn orphan_definition_is_skipped() {
        let set = parse_flashcards(Some("Definition: lonely\nTerm: A\nTerm: B\nDefinition: for B"));
        assert_eq!(set.cards()[0].front(), "B");
        assert_eq!(set.synthetic_count(), FLASHCARD_COUNT - 1);
    }

    #[test]
    fn none_is_all_placeholders() {
        let set = parse_flashcards(None);
        assert_eq!(set.synthetic_count(), FLASHCARD_COUNT);
        assert_eq!(set.cards()[9].back(), "Definition 10");
    }

    #[test]
    fn caps_at_ten() {
        let raw: String = (1..=12).map(|n| format!("Term: t{n}\nDefinition: d{n}\n")).collect();
        let set = parse_flashcards(Some(&raw));
        assert_eq!(set.synthetic_count(), 0);
        assert_eq!(set.cards().len(), FLASHCARD_COUNT);
        assert_eq!(set.cards()[9].front(), "t10");
    }

    #[test]
    fn serializes_front_and_back() {
        let json = serde_json::to_value(parse_flashcards(None)).unwrap();
        assert_eq!(json[0]["front"], "Term 1");
        assert_eq!(json[0]["back"], "Definition 1");
    }
}
