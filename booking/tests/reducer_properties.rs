//! Property tests for selections and pricing

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

mod common;

use common::{StubBackend, environment, state};
use proptest::prelude::*;
use std::collections::BTreeMap;
use universal_booking::{
    BookingAction, BookingReducer, BookingState, ItemId, Money, Selection, SelectionPatch,
};
use universal_booking_core::reducer::Reducer;

fn selection() -> impl Strategy<Value = Selection> {
    (1_u64..8, 0_i64..50_000, 0_u32..6).prop_map(|(id, price, quantity)| {
        Selection::new(id, format!("Tier {id}"), Money::from_minor(price), quantity)
    })
}

fn patches() -> impl Strategy<Value = Vec<SelectionPatch>> {
    prop::collection::vec(
        prop::collection::vec(selection(), 0..4).prop_map(|selections| {
            selections
                .into_iter()
                .map(|s| (s.id.clone(), s))
                .collect::<SelectionPatch>()
        }),
        0..8,
    )
}

fn run(state: &mut BookingState, actions: Vec<BookingAction>) {
    let reducer = BookingReducer::new();
    let env = environment(StubBackend::default());
    for action in actions {
        let _ = reducer.reduce(state, action, &env);
    }
}

proptest! {
    #[test]
    fn merge_matches_last_write_per_key(patches in patches()) {
        let mut session = state("events");
        run(&mut session, patches.iter().cloned().map(BookingAction::UpdateSelections).collect());

        let mut expected: BTreeMap<ItemId, Selection> = BTreeMap::new();
        for patch in &patches {
            for (id, selection) in patch {
                expected.insert(id.clone(), selection.clone());
            }
        }
        expected.retain(|_, selection| selection.quantity > 0);

        let actual: BTreeMap<ItemId, Selection> =
            session.selections.iter().map(|s| (s.id.clone(), s.clone())).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn total_is_sum_of_positive_lines(patches in patches()) {
        let mut session = state("events");
        let mut actions: Vec<BookingAction> =
            patches.into_iter().map(BookingAction::UpdateSelections).collect();
        actions.push(BookingAction::CalculateTotal);
        run(&mut session, actions);

        let expected: Money = session
            .selections
            .iter()
            .filter(|s| s.quantity > 0)
            .map(|s| s.price.times(s.quantity))
            .sum();
        prop_assert_eq!(session.total_amount, expected);
        prop_assert!(session.selections.iter().all(|s| s.quantity > 0));
    }

    #[test]
    fn reducer_is_deterministic(patches in patches()) {
        let actions: Vec<BookingAction> =
            patches.into_iter().map(BookingAction::UpdateSelections).collect();

        let mut first = state("events");
        let mut second = state("events");
        run(&mut first, actions.clone());
        run(&mut second, actions);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn repeating_a_selection_update_is_idempotent(patch in patches().prop_map(|p| p.into_iter().next().unwrap_or_default())) {
        let mut once = state("events");
        run(&mut once, vec![BookingAction::UpdateSelections(patch.clone())]);

        let mut twice = once.clone();
        run(&mut twice, vec![BookingAction::UpdateSelections(patch)]);

        prop_assert_eq!(once, twice);
    }
}
