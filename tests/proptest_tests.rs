//! Property-based tests for the aggregator, numbering and allocation.
//!
//! Run with: `cargo test --test proptest_tests`

use offerta::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Non-negative amount with up to `scale` decimal places.
fn amount(max_units: i64, scale: u32) -> impl Strategy<Value = Decimal> {
    let factor = 10i64.pow(scale);
    (0..=max_units * factor).prop_map(move |n| Decimal::new(n, scale))
}

fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|n| Decimal::new(n, 2))
}

fn line_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec((amount(1_000, 3), amount(100_000, 4)), 0..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (qty, price))| LineItemBuilder::new(format!("Item {i}"), qty, price).build())
            .collect()
    })
}

proptest! {
    #[test]
    fn recompute_is_deterministic(items in line_items(), discount in percent(), tax in percent()) {
        let a = recompute(&items, discount, tax).unwrap();
        let b = recompute(&items, discount, tax).unwrap();
        prop_assert_eq!(a.total.to_string(), b.total.to_string());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn subtotal_is_sum_of_rounded_lines(items in line_items(), discount in percent(), tax in percent()) {
        let totals = recompute(&items, discount, tax).unwrap();
        let sum: Decimal = totals.line_totals.iter().copied().sum();
        prop_assert_eq!(totals.subtotal, sum);
        prop_assert_eq!(totals.taxable_amount, totals.subtotal - totals.discount_amount);
        prop_assert_eq!(totals.total, totals.taxable_amount + totals.tax_amount);
    }

    #[test]
    fn amounts_are_cents_and_bounded(items in line_items(), discount in percent(), tax in percent()) {
        let totals = recompute(&items, discount, tax).unwrap();
        for amount in [totals.subtotal, totals.discount_amount, totals.tax_amount, totals.total] {
            prop_assert_eq!(amount.scale(), 2);
            prop_assert!(amount >= Decimal::ZERO);
        }
        prop_assert!(totals.discount_amount <= totals.subtotal);
        prop_assert!(totals.taxable_amount <= totals.total);
    }

    #[test]
    fn line_totals_are_rounded_products(items in line_items(), discount in percent(), tax in percent()) {
        let totals = recompute(&items, discount, tax).unwrap();
        prop_assert_eq!(totals.line_totals.len(), items.len());
        for (item, total) in items.iter().zip(&totals.line_totals) {
            prop_assert_eq!(*total, money(item.quantity * item.unit_price));
        }
    }

    #[test]
    fn out_of_range_percent_is_rejected(items in line_items(), over in 1i64..1_000_000) {
        let too_high = Decimal::new(10_000 + over, 2);
        prop_assert!(recompute(&items, too_high, Decimal::ZERO).is_err());
        prop_assert!(recompute(&items, Decimal::ZERO, -Decimal::new(over, 2)).is_err());
    }

    #[test]
    fn number_text_round_trips(year in 0i32..=9999, sequence in 1u32..=u32::MAX) {
        let number = DocumentNumber::new(year, sequence).unwrap();
        let text = number.to_string();
        prop_assert!(text.starts_with("EST-"));
        let parsed: DocumentNumber = text.parse().unwrap();
        prop_assert_eq!(parsed, number);
    }

    #[test]
    fn number_order_is_numeric(year in 2000i32..2100, a in 1u32..100_000, b in 1u32..100_000) {
        let na = DocumentNumber::new(year, a).unwrap();
        let nb = DocumentNumber::new(year, b).unwrap();
        prop_assert_eq!(na.cmp(&nb), a.cmp(&b));
    }

    #[test]
    fn arbitrary_text_never_panics(s in "\\PC{0,24}") {
        let _ = s.parse::<DocumentNumber>();
    }
}

#[cfg(feature = "memory-store")]
mod allocation {
    use offerta::core::*;
    use offerta::lifecycle::EstimateManager;
    use offerta::store::InMemoryStore;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Creating and deleting in any order never produces a duplicate
        /// number, and every new number is above all numbers still stored.
        #[test]
        fn numbers_stay_unique(ops in prop::collection::vec(any::<Option<prop::sample::Index>>(), 1..40)) {
            let manager = EstimateManager::with_clock(
                InMemoryStore::new(),
                FixedClock::at_date(chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
                EngineConfig::default(),
            )
            .unwrap();
            let mut live: Vec<Estimate> = Vec::new();

            for op in ops {
                match op {
                    Some(index) if !live.is_empty() => {
                        let victim = live.remove(index.index(live.len()));
                        manager.delete(victim.id).unwrap();
                    }
                    _ => {
                        let created = manager
                            .create(NewEstimateBuilder::new("Prop Customer").build())
                            .unwrap();
                        prop_assert!(live.iter().all(|e| e.number < created.number));
                        live.push(created);
                    }
                }
            }

            let mut numbers: Vec<_> = live.iter().map(|e| e.number).collect();
            numbers.sort();
            numbers.dedup();
            prop_assert_eq!(numbers.len(), live.len());
        }
    }
}
