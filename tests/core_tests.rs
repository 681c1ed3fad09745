use chrono::{NaiveDate, TimeZone, Utc};
use offerta::core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn line(description: &str, quantity: Decimal, unit_price: Decimal) -> LineItem {
    LineItemBuilder::new(description, quantity, unit_price).build()
}

fn estimate_with(lines: Vec<LineItem>, discount: Decimal, tax: Decimal) -> Estimate {
    let at = Utc.with_ymd_and_hms(2025, 4, 2, 10, 30, 0).unwrap();
    Estimate {
        id: Uuid::new_v4(),
        number: DocumentNumber::new(2025, 12).unwrap(),
        customer: Customer::new("Jane Doe").email("jane@example.com"),
        project_id: Some("proj-7".into()),
        project_description: "Bathroom refit".into(),
        notes: String::new(),
        line_items: lines,
        discount_percent: discount,
        tax_percent: tax,
        subtotal: Decimal::ZERO,
        discount_amount: Decimal::ZERO,
        taxable_amount: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total: Decimal::ZERO,
        valid_until: date(2025, 5, 2),
        status: EstimateStatus::Draft,
        created_at: at,
        updated_at: at,
    }
}

// --- Aggregator ---

#[test]
fn discount_then_tax_on_reference_quote() {
    let totals = recompute(&[line("Tile work", dec!(2), dec!(50))], dec!(10), dec!(8.5)).unwrap();
    assert_eq!(totals.line_totals, vec![dec!(100.00)]);
    assert_eq!(totals.subtotal, dec!(100.00));
    assert_eq!(totals.discount_amount, dec!(10.00));
    assert_eq!(totals.taxable_amount, dec!(90.00));
    assert_eq!(totals.tax_amount, dec!(7.65));
    assert_eq!(totals.total, dec!(97.65));
}

#[test]
fn half_cent_rounds_up() {
    let totals = recompute(&[line("Grout", dec!(1), dec!(10.005))], dec!(0), dec!(0)).unwrap();
    assert_eq!(totals.line_totals[0], dec!(10.01));
    assert_eq!(totals.total, dec!(10.01));

    let totals = recompute(&[line("Sealant", dec!(3), dec!(3.335))], dec!(0), dec!(0)).unwrap();
    assert_eq!(totals.subtotal, dec!(10.01));
}

#[test]
fn line_totals_are_rounded_before_summing() {
    // 3 × 0.335 = 1.005 per line → 1.01; two lines → 2.02, not round(2.01)
    let items = vec![
        line("Screws", dec!(3), dec!(0.335)),
        line("Anchors", dec!(3), dec!(0.335)),
    ];
    let totals = recompute(&items, dec!(0), dec!(0)).unwrap();
    assert_eq!(totals.line_totals, vec![dec!(1.01), dec!(1.01)]);
    assert_eq!(totals.subtotal, dec!(2.02));
}

#[test]
fn every_amount_has_two_decimal_places() {
    let totals = recompute(&[line("Labour", dec!(7), dec!(33))], dec!(12.5), dec!(19)).unwrap();
    for amount in [
        totals.line_totals[0],
        totals.subtotal,
        totals.discount_amount,
        totals.taxable_amount,
        totals.tax_amount,
        totals.total,
    ] {
        assert_eq!(amount.scale(), 2, "{amount}");
    }
}

#[test]
fn empty_estimate_totals_zero() {
    let totals = recompute(&[], dec!(25), dec!(20)).unwrap();
    assert!(totals.line_totals.is_empty());
    assert_eq!(totals.subtotal, Decimal::ZERO);
    assert_eq!(totals.total, Decimal::ZERO);
}

#[test]
fn full_discount_leaves_nothing_to_tax() {
    let totals = recompute(&[line("Survey", dec!(1), dec!(250))], dec!(100), dec!(20)).unwrap();
    assert_eq!(totals.taxable_amount, Decimal::ZERO);
    assert_eq!(totals.tax_amount, Decimal::ZERO);
    assert_eq!(totals.total, Decimal::ZERO);
}

#[test]
fn zero_quantity_line_is_allowed() {
    let totals = recompute(&[line("Optional extra", dec!(0), dec!(99.99))], dec!(0), dec!(0)).unwrap();
    assert_eq!(totals.line_totals[0], Decimal::ZERO);
}

#[test]
fn percentages_outside_range_are_rejected() {
    let items = [line("Paint", dec!(1), dec!(10))];
    for (discount, tax, field) in [
        (dec!(-1), dec!(0), "discount_percent"),
        (dec!(100.01), dec!(0), "discount_percent"),
        (dec!(0), dec!(-0.5), "tax_percent"),
        (dec!(0), dec!(101), "tax_percent"),
    ] {
        let err = recompute(&items, discount, tax).unwrap_err();
        assert!(
            matches!(err, EstimateError::InvalidPercentage { field: f, .. } if f == field),
            "{discount}/{tax}: {err}"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert!(recompute(&items, dec!(100), dec!(100)).is_ok());
}

#[test]
fn negative_values_name_the_line() {
    let items = [
        line("Paint", dec!(1), dec!(10)),
        line("Refund", dec!(1), dec!(-5)),
    ];
    let err = recompute(&items, dec!(0), dec!(0)).unwrap_err();
    assert!(matches!(err, EstimateError::InvalidQuantityOrPrice { index: 1 }));

    let items = [line("Paint", dec!(-2), dec!(10))];
    let err = recompute(&items, dec!(0), dec!(0)).unwrap_err();
    assert!(matches!(err, EstimateError::InvalidQuantityOrPrice { index: 0 }));
}

#[test]
fn overflow_is_an_error_not_a_panic() {
    let items = [line("Huge", Decimal::MAX, dec!(2))];
    let err = recompute(&items, dec!(0), dec!(0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn calculate_totals_fills_estimate() {
    let mut estimate = estimate_with(
        vec![
            line("Tiles", dec!(12), dec!(4.75)),
            line("Adhesive", dec!(2), dec!(18.40)),
        ],
        dec!(5),
        dec!(19),
    );
    calculate_totals(&mut estimate).unwrap();

    assert_eq!(estimate.line_items[0].total, dec!(57.00));
    assert_eq!(estimate.line_items[1].total, dec!(36.80));
    assert_eq!(estimate.subtotal, dec!(93.80));
    assert_eq!(estimate.discount_amount, dec!(4.69));
    assert_eq!(estimate.taxable_amount, dec!(89.11));
    assert_eq!(estimate.tax_amount, dec!(16.93));
    assert_eq!(estimate.total, dec!(106.04));
    assert!(validate_arithmetic(&estimate).is_empty());
    assert_eq!(estimate.totals(), recompute(&estimate.line_items, dec!(5), dec!(19)).unwrap());
}

#[test]
fn calculate_totals_leaves_estimate_untouched_on_error() {
    let mut estimate = estimate_with(vec![line("Tiles", dec!(1), dec!(10))], dec!(150), dec!(0));
    let before = estimate.clone();
    assert!(calculate_totals(&mut estimate).is_err());
    assert_eq!(estimate, before);
}

#[test]
fn validate_arithmetic_reports_every_mismatch() {
    let mut estimate = estimate_with(vec![line("Tiles", dec!(2), dec!(50))], dec!(10), dec!(8.5));
    calculate_totals(&mut estimate).unwrap();
    estimate.line_items[0].total = dec!(99.99);
    estimate.total = dec!(1.00);

    let errors = validate_arithmetic(&estimate);
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["line_items[0].total", "total"]);
}

// --- Numbers ---

#[test]
fn number_text_form() {
    let numbers: Vec<String> = [(2025, 1), (2025, 42), (2025, 999), (2025, 1000), (2026, 3)]
        .into_iter()
        .map(|(y, s)| DocumentNumber::new(y, s).unwrap().to_string())
        .collect();
    insta::assert_snapshot!(numbers.join("\n"), @r"
    EST-2025-001
    EST-2025-042
    EST-2025-999
    EST-2025-1000
    EST-2026-003
    ");
}

#[test]
fn number_parse_matches_display() {
    for text in ["EST-2025-001", "EST-1999-999", "EST-2025-1000", "EST-2030-65536"] {
        let number: DocumentNumber = text.parse().unwrap();
        assert_eq!(number.to_string(), text);
    }
}

#[test]
fn numbers_sort_numerically_across_widths() {
    let mut numbers: Vec<DocumentNumber> = ["EST-2025-1000", "EST-2024-500", "EST-2025-999", "EST-2025-010"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    numbers.sort();
    let rendered: Vec<String> = numbers.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["EST-2024-500", "EST-2025-010", "EST-2025-999", "EST-2025-1000"]
    );
}

// --- Builders and input validation ---

#[test]
fn new_estimate_validation_collects_all_findings() {
    let id = Uuid::new_v4();
    let new = NewEstimateBuilder::new("  ")
        .add_line_input(LineItemInput::new("A", dec!(1), dec!(1)).with_id(id))
        .add_line_input(LineItemInput::new("B", dec!(1), dec!(1)).with_id(id))
        .build();
    let errors = new.validate();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].field, "customer.name");
    assert_eq!(errors[1].field, "line_items[1].id");
}

#[test]
fn customer_name_has_no_length_limit() {
    let long = NewEstimateBuilder::new("x".repeat(1_000)).build();
    assert!(long.validate().is_empty());
}

#[test]
fn new_estimate_deserializes_from_json() {
    let new: NewEstimate = serde_json::from_str(
        r#"{
            "customer": { "name": "Jane Doe", "email": "", "phone": "" },
            "project_id": null,
            "project_description": "Deck",
            "notes": "",
            "line_items": [
                { "id": null, "description": "Boards", "quantity": "14", "unit_price": "12.50" }
            ],
            "discount_percent": "0",
            "tax_percent": "7",
            "valid_until": "2025-07-01"
        }"#,
    )
    .unwrap();
    assert_eq!(new.line_items[0].unit_price, dec!(12.50));
    assert_eq!(new.valid_until, Some(date(2025, 7, 1)));
    assert!(new.validate().is_empty());
}

// --- Status, errors, config ---

#[test]
fn status_labels_round_trip() {
    for status in EstimateStatus::ALL {
        assert_eq!(EstimateStatus::from_label(status.label()), Some(status));
        assert_eq!(status.to_string(), status.label());
    }
    assert_eq!(EstimateStatus::from_label("cancelled"), None);
    assert!(EstimateStatus::Draft.is_editable());
    assert!(!EstimateStatus::Sent.is_editable());
    assert!(EstimateStatus::Expired.is_terminal());
    assert!(!EstimateStatus::Sent.is_terminal());
}

#[test]
fn error_messages() {
    let number = DocumentNumber::new(2025, 7).unwrap();
    let locked = EstimateError::EstimateLocked {
        number,
        status: EstimateStatus::Approved,
    };
    assert_eq!(locked.to_string(), "estimate EST-2025-007 is locked (status: approved)");
    assert!(!locked.is_retryable());

    let transition = EstimateError::InvalidTransition {
        from: EstimateStatus::Approved,
        to: EstimateStatus::Draft,
    };
    assert_eq!(transition.to_string(), "cannot move estimate from approved to draft");

    let conflict = EstimateError::AllocationConflict { year: 2025, attempts: 5 };
    assert!(conflict.is_retryable());
    assert_eq!(conflict.kind(), ErrorKind::AllocationConflict);
}

#[test]
fn config_rejects_zero_attempts() {
    let err = EngineConfig::from_json_str(r#"{ "max_allocation_attempts": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("max_allocation_attempts"));
    assert!(EngineConfig::from_json_str("not json").is_err());
    assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
}

#[test]
fn fixed_clock_drives_calendar_year() {
    let clock = FixedClock::at_date(date(2025, 12, 31));
    assert_eq!(clock.current_year(), 2025);
    clock.advance(chrono::Duration::days(1));
    assert_eq!(clock.today(), date(2026, 1, 1));
    assert_eq!(clock.current_year(), 2026);
}
