//! Property tests for scoring, value extraction and sizing

use momentum_alpha::signal::{extract_order_value, score_confidence, KeywordMatch};
use momentum_alpha::strategy::calculate_position_size;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn keyword_match() -> impl Strategy<Value = KeywordMatch> {
    prop_oneof![
        Just(KeywordMatch::Primary),
        Just(KeywordMatch::Secondary),
        Just(KeywordMatch::None),
    ]
}

proptest! {
    #[test]
    fn confidence_stays_in_unit_interval(
        title in "[ -~]{0,120}",
        keyword_match in keyword_match(),
        value in proptest::option::of(0i64..100_000_000_000),
    ) {
        let confidence = score_confidence(&title, keyword_match, value.map(Decimal::from));
        prop_assert!(confidence >= Decimal::ZERO);
        prop_assert!(confidence <= Decimal::ONE);
    }

    #[test]
    fn extracted_value_never_negative(text in "\\PC{0,80}") {
        if let Some(value) = extract_order_value(&text) {
            prop_assert!(value.amount >= Decimal::ZERO);
            prop_assert!(text.contains(&value.text));
        }
    }

    #[test]
    fn crore_amounts_scale_exactly(amount in 1u32..100_000) {
        let text = format!("Order worth Rs. {amount} crore");
        let value = extract_order_value(&text).map(|v| v.amount);
        prop_assert_eq!(value, Some(Decimal::from(amount) * Decimal::from(10_000_000)));
    }

    #[test]
    fn size_monotonic_in_position_value(
        entry_paise in 100i64..1_000_000,
        stop_pct in 1u32..50,
        max_small in 1_000i64..100_000,
        extra in 0i64..100_000,
    ) {
        let entry = Decimal::new(entry_paise, 2);
        let stop = entry * (Decimal::ONE - Decimal::new(i64::from(stop_pct), 2));
        let risk = Decimal::new(2, 2);

        let small = calculate_position_size(entry, stop, Decimal::from(max_small), risk);
        let large = calculate_position_size(entry, stop, Decimal::from(max_small + extra), risk);
        prop_assert!(small >= 1);
        prop_assert!(small <= large);
    }

    #[test]
    fn size_non_increasing_as_stop_distance_grows(
        entry_paise in 1_000i64..1_000_000,
        near_bps in 1i64..5_000,
        extra_bps in 1i64..4_999,
        max_value in 1_000i64..1_000_000,
    ) {
        let entry = Decimal::new(entry_paise, 2);
        let risk = Decimal::new(2, 2);
        let max_value = Decimal::from(max_value);
        // s1 < s2 < entry, so entry - s1 is the wider risk per share
        let near_stop = entry * (Decimal::ONE - Decimal::new(near_bps, 4));
        let far_stop = entry * (Decimal::ONE - Decimal::new(near_bps + extra_bps, 4));
        prop_assume!(far_stop < near_stop && near_stop < entry);

        let tight = calculate_position_size(entry, near_stop, max_value, risk);
        let wide = calculate_position_size(entry, far_stop, max_value, risk);
        prop_assert!(wide <= tight);
    }

    #[test]
    fn size_zero_when_stop_not_below_entry(
        entry_paise in 1i64..1_000_000,
        above in 0i64..10_000,
        max_value in 1i64..1_000_000,
    ) {
        let entry = Decimal::new(entry_paise, 2);
        let stop = entry + Decimal::new(above, 2);
        prop_assert_eq!(
            calculate_position_size(entry, stop, Decimal::from(max_value), Decimal::new(2, 2)),
            0
        );
    }
}
