//! Property tests over fill sequences.
//!
//! For any sequence of fills: the filled quantity never decreases, never
//! exceeds the order quantity, and always equals the sum of recorded
//! fills.

use proptest::prelude::*;
use rust_decimal::Decimal;

use oms_engine::domain::orders::value_objects::FillState;
use oms_engine::{Fill, FillId, Money, OrderId, Quantity, Timestamp};

fn make_fill(seq: i64, qty: u32, price: u32) -> Fill {
    Fill::new(
        FillId::new(seq),
        OrderId::new(1),
        Quantity::from_i64(i64::from(qty)),
        Money::new(Decimal::from(price.max(1))),
        Timestamp::now(),
    )
}

proptest! {
    #[test]
    fn filled_quantity_tracks_fill_sum(
        order_qty in 1u32..10_000,
        fills in prop::collection::vec((1u32..500, 1u32..1_000), 0..40),
    ) {
        let quantity = Quantity::from_i64(i64::from(order_qty));
        let mut state = FillState::empty();
        let mut accepted_total = Decimal::ZERO;
        let mut previous_filled = Decimal::ZERO;

        for (seq, (qty, price)) in fills.into_iter().enumerate() {
            let would_overfill =
                accepted_total + Decimal::from(qty) > Decimal::from(order_qty);

            let applied = state.apply(make_fill(seq as i64, qty, price), quantity);
            prop_assert_eq!(applied.is_err(), would_overfill);
            if applied.is_ok() {
                accepted_total += Decimal::from(qty);
            }

            // Monotone, bounded, and consistent with the fill list.
            let filled = state.filled_quantity().amount();
            prop_assert!(filled >= previous_filled);
            prop_assert!(filled <= Decimal::from(order_qty));
            prop_assert_eq!(filled, accepted_total);
            prop_assert!(state.verify_integrity());
            previous_filled = filled;
        }
    }

    #[test]
    fn overfill_is_always_rejected(
        order_qty in 1u32..1_000,
        excess in 1u32..500,
    ) {
        let quantity = Quantity::from_i64(i64::from(order_qty));
        let mut state = FillState::empty();

        let too_big = make_fill(0, order_qty + excess, 100);
        prop_assert!(state.apply(too_big, quantity).is_err());
        prop_assert_eq!(state.filled_quantity(), Quantity::ZERO);
        prop_assert!(state.verify_integrity());
    }
}
