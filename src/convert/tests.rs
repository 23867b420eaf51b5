use super::*;
use crate::utils::test_utils::{create_empty_store, create_loaded_store};

fn convert(raw: &str, rates: &[(&str, f64)]) -> String {
    let store = create_loaded_store(rates);
    PriceLineConverter::new().process(raw, &store)
}

#[test]
fn converts_foreign_price_line() {
    assert_eq!(
        convert("Coffee | 5 USD ::", &[("USD", 1.1)]),
        "Coffee | 5 USD | €4.55"
    );
}

#[test]
fn base_currency_lines_skip_rate_lookup() {
    // EUR is absent from the table, so a lookup would report a missing rate
    assert_eq!(
        convert("Tea | 3 EUR ::", &[("USD", 1.1)]),
        "Tea | 3 EUR | €3.00"
    );
    assert_eq!(
        convert("Tea | 3.5 euros", &[("USD", 1.1)]),
        "Tea | 3.5 EUR | €3.50"
    );
}

#[test]
fn currency_names_are_normalized_before_lookup() {
    assert_eq!(
        convert("Ramen | 1650 Yen ::", &[("JPY", 165.0)]),
        "Ramen | 1650 JPY | €10.00"
    );
    // The piped-code form alone never passes the fast path, so pair it
    // with a regular line
    assert_eq!(
        convert(
            "Coffee | 5 USD ::\nTacos | 90 | pesos",
            &[("USD", 1.1), ("MXN", 18.0)]
        ),
        "Coffee | 5 USD | €4.55 :: Tacos | 90 MXN | €5.00"
    );
}

#[test]
fn missing_rate_is_annotated_not_dropped() {
    let output = convert("Widget | 50 XYZ ::", &[("USD", 1.1)]);
    assert!(output.contains("rate not found"), "{output}");
    assert!(output.contains("50 XYZ"), "{output}");
    assert_eq!(output, "Widget | 50 XYZ | €? (rate not found)");
}

#[test]
fn missing_currency_is_annotated_and_left_unconverted() {
    let output = convert(
        "Gadget | 12 USD ::\nWidget | 149 ::",
        &[("USD", 1.2)],
    );
    assert!(output.contains("Missing currency code"), "{output}");
    assert!(output.contains("Widget | 149"), "{output}");
    assert_eq!(
        output,
        "Gadget | 12 USD | €10.00 :: Widget | 149 :: [⚠️ Missing currency code - cannot convert]"
    );
}

#[test]
fn standalone_amount_without_currency_is_annotated() {
    let output = convert("Widget | 149 ::", &[("USD", 1.1)]);
    assert!(output.contains("Missing currency code"), "{output}");
    assert_eq!(
        output,
        "Widget | 149 :: [⚠️ Missing currency code - cannot convert]"
    );
}

#[test]
fn text_without_prices_is_returned_unchanged() {
    let raw = "I could not find any prices.\n\nTry another query?";
    assert_eq!(convert(raw, &[("USD", 1.1)]), raw);
}

#[test]
fn unloaded_rates_append_warning_and_keep_lines() {
    let store = create_empty_store();
    let raw = "Coffee | 5 USD ::\nTea | 3 EUR ::";
    let output = PriceLineConverter::new().process(raw, &store);

    assert!(output.starts_with(raw));
    assert!(output.ends_with(RATES_UNAVAILABLE_MARKER));
    assert_eq!(output.matches(RATES_UNAVAILABLE_MARKER).count(), 1);
}

#[test]
fn multi_line_output_keeps_order_and_drops_blank_lines() {
    let raw = "Here is what I found:\n\nCoffee | 5 USD ::\n   \nTea | 3 EUR ::\n";
    assert_eq!(
        convert(raw, &[("USD", 1.1)]),
        "Here is what I found: :: Coffee | 5 USD | €4.55 :: Tea | 3 EUR | €3.00"
    );
}

#[test]
fn second_pass_is_a_no_op() {
    let rates = [("USD", 1.1), ("GBP", 0.85)];
    let raw = "Coffee | 5 USD ::\nScone | 3 GBP ::\nTea | 3 EUR ::\nWidget | 50 XYZ ::";

    let once = convert(raw, &rates);
    let twice = convert(&once, &rates);
    assert_eq!(once, twice);
}

#[test]
fn already_converted_lines_pass_through() {
    let store = create_loaded_store(&[("USD", 1.1)]);
    let converter = PriceLineConverter::new();
    let table = store.snapshot().unwrap();

    assert_eq!(
        converter.convert_line("Coffee | 5 USD | €4.55 ::", BaseCurrency::EUR, &table),
        LineOutcome::AlreadyConverted
    );
    assert_eq!(
        converter.process("Coffee | 5 USD | €4.55 ::", &store),
        "Coffee | 5 USD | €4.55"
    );
}

#[test]
fn original_amount_token_is_preserved_verbatim() {
    assert_eq!(
        convert("Sushi | 1650.00 JPY ::", &[("JPY", 161.0)]),
        "Sushi | 1650.00 JPY | €10.25"
    );
}

#[test]
fn labels_keep_their_spacing() {
    assert_eq!(
        convert("  Tea| 3 EUR ::  ", &[("USD", 1.1)]),
        "Tea| 3 EUR | €3.00"
    );
}

#[test]
fn one_bad_line_does_not_affect_the_rest() {
    let raw = "Widget | 50 XYZ ::\nWidget | 149 ::\nCoffee | 5 USD ::\nnote: 3 items total";
    let output = convert(raw, &[("USD", 1.1)]);
    let parts: Vec<&str> = output.split(OUTPUT_SEPARATOR).collect();

    assert_eq!(parts.len(), 5);
    assert_eq!(parts[0], "Widget | 50 XYZ | €? (rate not found)");
    assert_eq!(parts[1], "Widget | 149");
    assert_eq!(parts[2], "[⚠️ Missing currency code - cannot convert]");
    assert_eq!(parts[3], "Coffee | 5 USD | €4.55");
    assert_eq!(parts[4], "note: 3 items total");
}

#[test]
fn non_eur_base_uses_its_own_symbol() {
    let usd = BaseCurrency::from_code("USD").unwrap();
    let table = crate::core::rates::RateTable::new(
        usd,
        crate::utils::test_utils::rate_map(&[("EUR", 0.9)]),
        crate::utils::test_utils::test_now(),
    )
    .unwrap();

    let output = PriceLineConverter::new().process_with_table(
        "Coffee | 9 EUR ::\nBagel | 2 USD ::",
        usd,
        Some(&table),
    );
    assert_eq!(output, "Coffee | 9 EUR | $10.00 :: Bagel | 2 USD | $2.00");
}

#[test]
fn reassemble_strips_terminators_and_joins() {
    assert_eq!(
        reassemble(&["a ::", "", "  b  ", "c::"]),
        "a :: b :: c"
    );
    assert_eq!(reassemble::<&str>(&[]), "");
}
