//! Property tests for the shuffle and the review loop.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::model::Question;
use crate::session::{Advance, QuizSession};
use crate::shuffle::shuffle_options;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators
// ═══════════════════════════════════════════════════════════════════════════

/// Distinct-text questions with 1..=5 options, the answer drawn from them.
fn question_set_strategy() -> impl Strategy<Value = Vec<Question>> {
    prop::collection::vec(
        (prop::collection::vec("[a-z]{1,6}", 1..=5), any::<prop::sample::Index>()),
        1..=12,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (options, pick))| {
                let answer = pick.get(&options).clone();
                Question::new(format!("question {i}"), options, answer, "")
            })
            .collect()
    })
}

fn answer_of(session: &QuizSession) -> String {
    session
        .current_question()
        .map(|q| q.answer().to_owned())
        .unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Shuffled options are a permutation of the input.
    #[test]
    fn prop_shuffle_is_permutation(
        options in prop::collection::vec(".{0,8}", 0..16),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut shuffled = shuffle_options(&options, &mut rng);
        let mut expected = options.clone();
        shuffled.sort();
        expected.sort();
        prop_assert_eq!(shuffled, expected);
    }

    /// Display order always holds the current question's options.
    #[test]
    fn prop_display_order_matches_current_question(
        questions in question_set_strategy(),
        seed in any::<u64>(),
    ) {
        let mut session = QuizSession::seeded(questions, seed);
        while !session.is_complete() {
            let mut shown = session.display_order().to_vec();
            let mut expected = session.current_question().unwrap().options().to_vec();
            shown.sort();
            expected.sort();
            prop_assert_eq!(shown, expected);

            let answer = answer_of(&session);
            session.select_answer(&answer);
            session.advance().unwrap();
        }
    }

    /// Always answering correctly completes in exactly one advance per question.
    #[test]
    fn prop_correct_answers_terminate_in_one_pass(
        questions in question_set_strategy(),
        seed in any::<u64>(),
    ) {
        let len = questions.len();
        let mut session = QuizSession::seeded(questions, seed);
        let mut advances = 0;

        while !session.is_complete() {
            let answer = answer_of(&session);
            session.select_answer(&answer);
            prop_assert!(session.missed().is_empty());
            let step = session.advance().unwrap();
            advances += 1;
            let is_review = matches!(step, Advance::ReviewPass { .. });
            prop_assert!(!is_review);
            prop_assert!(advances <= len);
        }

        prop_assert_eq!(advances, len);
        prop_assert!(!session.is_review_pass());
    }

    /// Wrong once, right afterwards: two passes, two advances per question.
    #[test]
    fn prop_single_mistake_converges_in_two_passes(
        questions in question_set_strategy(),
        seed in any::<u64>(),
    ) {
        let len = questions.len();
        let mut session = QuizSession::seeded(questions, seed);
        let mut missed_once: HashSet<String> = HashSet::new();
        let mut advances = 0;

        while !session.is_complete() {
            let text = session.current_question().unwrap().text().to_owned();
            if missed_once.insert(text) {
                // Never equal to a generated option.
                session.select_answer("WRONG!");
            } else {
                let answer = answer_of(&session);
                session.select_answer(&answer);
            }
            session.advance().unwrap();
            advances += 1;
            prop_assert!(advances <= 2 * len);
        }

        prop_assert_eq!(advances, 2 * len);
        prop_assert_eq!(session.pass(), 1);
    }
}
