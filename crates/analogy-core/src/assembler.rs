//! Form assembly.
//!
//! Derives the ordered sequence of items presented in a session, either the
//! whole bank in numeric-aware identifier order or a randomized subset of
//! FIXED items with sampled ROTATION items spliced in.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;

use rand::seq::index;
use rand::Rng;

use crate::model::{Bank, Item};

/// Number of ROTATION items spliced into a randomized form.
pub const DEFAULT_ROTATION_SAMPLE: usize = 8;

/// How the form is derived from the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyPolicy {
    /// Every item, sorted by `ITEM_ID`. The same bank always yields the same form.
    Deterministic,
    /// FIXED items in bank order with `rotation_count` sampled ROTATION items
    /// placed at random positions.
    Randomized { rotation_count: usize },
}

impl AssemblyPolicy {
    /// Build a form. Called exactly once per session.
    pub fn assemble<R: Rng + ?Sized>(&self, bank: Arc<Bank>, rng: &mut R) -> Form {
        let order = match *self {
            AssemblyPolicy::Deterministic => deterministic_order(&bank),
            AssemblyPolicy::Randomized { rotation_count } => {
                randomized_order(&bank, rotation_count, rng)
            }
        };
        Form { bank, order }
    }
}

/// The ordered items of one session. Never re-ordered after assembly.
#[derive(Debug, Clone)]
pub struct Form {
    bank: Arc<Bank>,
    order: Vec<usize>,
}

impl Form {
    /// The bank this form was drawn from.
    pub fn bank(&self) -> &Arc<Bank> {
        &self.bank
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Item at a form position.
    pub fn get(&self, position: usize) -> Option<&Item> {
        self.order.get(position).map(|&i| &self.bank.items[i])
    }

    /// Items in presentation order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.order.iter().map(|&i| &self.bank.items[i])
    }

    /// `(fixed, rotation)` counts of the assembled items.
    pub fn type_counts(&self) -> (usize, usize) {
        self.items().fold((0, 0), |(fixed, rotation), item| {
            (
                fixed + usize::from(item.is_fixed()),
                rotation + usize::from(item.is_rotation()),
            )
        })
    }
}

/// All bank indices sorted by numeric-aware `ITEM_ID` order.
pub fn deterministic_order(bank: &Bank) -> Vec<usize> {
    let mut order: Vec<usize> = (0..bank.items.len()).collect();
    order.sort_by(|&a, &b| natural_cmp(&bank.items[a].id, &bank.items[b].id));
    order
}

/// FIXED items in bank order with up to `rotation_count` ROTATION items
/// interleaved at random positions.
///
/// Under-populated banks degrade to as many rotation items as exist. Insertion
/// slots are chosen among the positions of the final sequence, so there are
/// always enough of them.
pub fn randomized_order<R: Rng + ?Sized>(
    bank: &Bank,
    rotation_count: usize,
    rng: &mut R,
) -> Vec<usize> {
    let fixed: Vec<usize> = bank
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_fixed())
        .map(|(i, _)| i)
        .collect();
    let rotation: Vec<usize> = bank
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_rotation())
        .map(|(i, _)| i)
        .collect();

    let take = rotation_count.min(rotation.len());
    if take < rotation_count {
        tracing::warn!(
            requested = rotation_count,
            available = rotation.len(),
            "not enough ROTATION items, sampling all available"
        );
    }

    let mut sampled = index::sample(rng, rotation.len(), take)
        .into_iter()
        .map(|i| rotation[i]);

    let total = fixed.len() + take;
    let mut slots = index::sample(rng, total, take).into_vec();
    slots.sort_unstable();
    let mut slots = slots.into_iter().peekable();

    let mut fixed = fixed.into_iter();
    let mut order = Vec::with_capacity(total);
    for position in 0..total {
        let next = if slots.peek() == Some(&position) {
            slots.next();
            sampled.next()
        } else {
            fixed.next()
        };
        order.extend(next);
    }
    order
}

/// Compare identifiers so that digit runs order by numeric value
/// (`ITEM_9` < `ITEM_10`). Letters compare case-insensitively; exact ties fall
/// back to plain byte order so the result is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        let ord = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x_run = take_digits(&mut left);
                let y_run = take_digits(&mut right);
                let x_num = x_run.trim_start_matches('0');
                let y_num = y_run.trim_start_matches('0');
                x_num
                    .len()
                    .cmp(&y_num.len())
                    .then_with(|| x_num.cmp(y_num))
            }
            (Some(x), Some(y)) => {
                left.next();
                right.next();
                x.to_lowercase().cmp(y.to_lowercase())
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a.cmp(b)
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{bank, fixed, mixed_bank, rotation};
    use crate::model::ChoiceKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(form: &Form) -> Vec<String> {
        form.items().map(|i| i.id.clone()).collect()
    }

    #[test]
    fn natural_order_compares_digit_runs_numerically() {
        assert_eq!(natural_cmp("ITEM_9", "ITEM_10"), Ordering::Less);
        assert_eq!(natural_cmp("ITEM_10", "ITEM_9"), Ordering::Greater);
        assert_eq!(natural_cmp("item_2", "ITEM_3"), Ordering::Less);
        assert_eq!(natural_cmp("A2B10", "A2B9"), Ordering::Greater);
        assert_eq!(natural_cmp("ITEM", "ITEM_1"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
        assert_ne!(natural_cmp("ITEM_01", "ITEM_1"), Ordering::Equal);
    }

    #[test]
    fn deterministic_sorts_numeric_aware() {
        let b = Arc::new(bank(vec![
            fixed("ITEM_10", ChoiceKey::A),
            rotation("ITEM_2"),
            fixed("ITEM_1", ChoiceKey::B),
            fixed("ITEM_9", ChoiceKey::C),
        ]));
        let form = AssemblyPolicy::Deterministic.assemble(b, &mut rand::rng());
        assert_eq!(ids(&form), ["ITEM_1", "ITEM_2", "ITEM_9", "ITEM_10"]);
    }

    #[test]
    fn deterministic_is_repeatable() {
        let b = Arc::new(mixed_bank(12, 11));
        let first = AssemblyPolicy::Deterministic.assemble(b.clone(), &mut rand::rng());
        let second = AssemblyPolicy::Deterministic.assemble(b, &mut rand::rng());
        assert_eq!(ids(&first), ids(&second));
        for pair in ids(&first).windows(2) {
            assert_ne!(natural_cmp(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn randomized_keeps_fixed_order_and_size() {
        let b = Arc::new(mixed_bank(20, 15));
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let form = AssemblyPolicy::Randomized { rotation_count: 8 }.assemble(b.clone(), &mut rng);
            assert_eq!(form.len(), 28);
            assert_eq!(form.type_counts(), (20, 8));

            let fixed_ids: Vec<String> = form
                .items()
                .filter(|i| i.is_fixed())
                .map(|i| i.id.clone())
                .collect();
            let expected: Vec<String> = (1..=20).map(|n| format!("F{n}")).collect();
            assert_eq!(fixed_ids, expected);

            let mut rotation_ids: Vec<String> = form
                .items()
                .filter(|i| i.is_rotation())
                .map(|i| i.id.clone())
                .collect();
            rotation_ids.sort();
            rotation_ids.dedup();
            assert_eq!(rotation_ids.len(), 8, "rotation items sampled without replacement");
        }
    }

    #[test]
    fn randomized_degrades_when_under_populated() {
        let b = Arc::new(mixed_bank(3, 5));
        let mut rng = StdRng::seed_from_u64(7);
        let form = AssemblyPolicy::Randomized { rotation_count: 8 }.assemble(b, &mut rng);
        assert_eq!(form.len(), 8);
        assert_eq!(form.type_counts(), (3, 5));
    }

    #[test]
    fn randomized_with_only_rotation_items() {
        let b = Arc::new(mixed_bank(0, 10));
        let mut rng = StdRng::seed_from_u64(3);
        let form = AssemblyPolicy::Randomized { rotation_count: 8 }.assemble(b, &mut rng);
        assert_eq!(form.len(), 8);
        assert_eq!(form.type_counts(), (0, 8));
    }

    #[test]
    fn randomized_same_seed_same_form() {
        let b = Arc::new(mixed_bank(10, 10));
        let policy = AssemblyPolicy::Randomized { rotation_count: 8 };
        let a = policy.assemble(b.clone(), &mut StdRng::seed_from_u64(42));
        let c = policy.assemble(b, &mut StdRng::seed_from_u64(42));
        assert_eq!(ids(&a), ids(&c));
    }

    #[test]
    fn empty_bank_yields_empty_form() {
        let b = Arc::new(bank(vec![]));
        let form = AssemblyPolicy::Deterministic.assemble(b.clone(), &mut rand::rng());
        assert!(form.is_empty());
        let form = AssemblyPolicy::Randomized { rotation_count: 8 }.assemble(b, &mut rand::rng());
        assert!(form.is_empty());
        assert!(form.get(0).is_none());
    }
}
