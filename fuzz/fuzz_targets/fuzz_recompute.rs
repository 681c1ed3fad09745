#![no_main]

use libfuzzer_sys::fuzz_target;
use offerta::core::{LineItemBuilder, recompute};
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    // Every 12 bytes: quantity mantissa, price mantissa, scale byte, padding.
    let items: Vec<_> = data
        .chunks_exact(12)
        .map(|chunk| {
            let qty = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let price = i32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            let scale = u32::from(chunk[8] % 8);
            LineItemBuilder::new(
                "fuzz",
                Decimal::new(i64::from(qty), scale),
                Decimal::new(i64::from(price), scale),
            )
            .build()
        })
        .collect();
    let discount = Decimal::new(i64::from(data.first().copied().unwrap_or(0)), 0);
    let tax = Decimal::new(i64::from(data.last().copied().unwrap_or(0)), 1);

    // Errors are fine; panics and unbalanced totals are bugs.
    if let Ok(totals) = recompute(&items, discount, tax) {
        assert_eq!(totals.total, totals.taxable_amount + totals.tax_amount);
    }
});
