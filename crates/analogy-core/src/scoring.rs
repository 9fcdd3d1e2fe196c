//! Attempt scoring.

use serde::{Deserialize, Serialize};

use crate::model::{Item, ItemType};
use crate::recorder::Responses;

/// Score of one attempt. Only FIXED items are checked against a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub fixed_total: usize,
    pub fixed_correct: usize,
    /// ROTATION items with any answer; never checked against a key.
    pub rotation_answered: usize,
}

impl Score {
    /// Raw score. Equal to `fixed_correct`.
    pub fn raw(&self) -> usize {
        self.fixed_correct
    }

    /// Share of FIXED items answered correctly, `0.0` for an empty form.
    pub fn fixed_rate(&self) -> f64 {
        if self.fixed_total == 0 {
            0.0
        } else {
            self.fixed_correct as f64 / self.fixed_total as f64
        }
    }
}

/// Score the items of a form against the recorded responses.
pub fn compute_score<'a>(form: impl IntoIterator<Item = &'a Item>, responses: &Responses) -> Score {
    let mut score = Score::default();
    for item in form {
        let chosen = responses.chosen(&item.id);
        match item.item_type {
            ItemType::Fixed => {
                score.fixed_total += 1;
                if chosen.is_some() && chosen == item.answer_key {
                    score.fixed_correct += 1;
                }
            }
            ItemType::Rotation => {
                if chosen.is_some() {
                    score.rotation_answered += 1;
                }
            }
            ItemType::Unknown(_) => {}
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{fixed, rotation};
    use crate::model::{ChoiceKey, ItemType};
    use crate::recorder::ResponseRecord;
    use chrono::Utc;

    fn answer(responses: &mut Responses, id: &str, key: ChoiceKey) {
        responses.record(
            id,
            ResponseRecord {
                chosen: key,
                rt_ms: 0,
                ts: Utc::now(),
            },
        );
    }

    #[test]
    fn no_responses() {
        let items = vec![
            fixed("F1", ChoiceKey::A),
            fixed("F2", ChoiceKey::B),
            rotation("R1"),
        ];
        let score = compute_score(&items, &Responses::new());
        assert_eq!(
            score,
            Score {
                fixed_total: 2,
                fixed_correct: 0,
                rotation_answered: 0
            }
        );
        assert_eq!(score.fixed_rate(), 0.0);
    }

    #[test]
    fn three_fixed_items_two_correct() {
        let items = vec![
            fixed("I1", ChoiceKey::A),
            fixed("I2", ChoiceKey::B),
            fixed("I3", ChoiceKey::C),
        ];
        let mut responses = Responses::new();
        answer(&mut responses, "I1", ChoiceKey::A);
        answer(&mut responses, "I2", ChoiceKey::C);
        answer(&mut responses, "I3", ChoiceKey::C);

        let score = compute_score(&items, &responses);
        assert_eq!(score.fixed_total, 3);
        assert_eq!(score.fixed_correct, 2);
        assert_eq!(score.rotation_answered, 0);
        assert_eq!(score.raw(), 2);
    }

    #[test]
    fn rotation_counts_answers_only() {
        let mut keyed_rotation = rotation("R2");
        keyed_rotation.answer_key = Some(ChoiceKey::A);
        let items = vec![rotation("R1"), keyed_rotation, rotation("R3")];
        let mut responses = Responses::new();
        answer(&mut responses, "R1", ChoiceKey::E);
        answer(&mut responses, "R2", ChoiceKey::B);

        let score = compute_score(&items, &responses);
        assert_eq!(score.fixed_total, 0);
        assert_eq!(score.rotation_answered, 2);
    }

    #[test]
    fn fixed_without_key_is_never_correct() {
        let mut item = fixed("F1", ChoiceKey::A);
        item.answer_key = None;
        let mut responses = Responses::new();
        answer(&mut responses, "F1", ChoiceKey::A);
        let score = compute_score([&item], &responses);
        assert_eq!(score.fixed_total, 1);
        assert_eq!(score.fixed_correct, 0);
    }

    #[test]
    fn unknown_types_are_ignored() {
        let mut item = fixed("X", ChoiceKey::A);
        item.item_type = ItemType::Unknown("ANCHOR".into());
        let score = compute_score([&item], &Responses::new());
        assert_eq!(score, Score::default());
    }

    #[test]
    fn order_independent() {
        let items = vec![fixed("I1", ChoiceKey::A), rotation("R1"), fixed("I2", ChoiceKey::B)];
        let mut responses = Responses::new();
        answer(&mut responses, "I1", ChoiceKey::A);
        answer(&mut responses, "R1", ChoiceKey::A);
        let forward = compute_score(&items, &responses);
        let backward = compute_score(items.iter().rev(), &responses);
        assert_eq!(forward, backward);
    }
}
