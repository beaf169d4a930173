// Currency display: INR lakh/crore grouping, two decimals, half away from zero

use campusdesk::core::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_lakh_grouping() {
    assert_eq!(Currency::INR.format_amount(dec!(100000)), "₹1,00,000.00");
    assert_eq!(Currency::INR.format_amount(dec!(1234567.89)), "₹12,34,567.89");
    assert_eq!(Currency::INR.format_amount(dec!(10000000)), "₹1,00,00,000.00");
}

#[test]
fn test_small_amounts_not_grouped() {
    assert_eq!(Currency::INR.format_amount(dec!(0)), "₹0.00");
    assert_eq!(Currency::INR.format_amount(dec!(999)), "₹999.00");
    assert_eq!(Currency::INR.format_amount(dec!(1000)), "₹1,000.00");
}

#[test]
fn test_half_paisa_rounds_away_from_zero() {
    assert_eq!(Currency::INR.format_amount(dec!(2.345)), "₹2.35");
    assert_eq!(Currency::INR.format_amount(dec!(-2.345)), "-₹2.35");
}

#[test]
fn test_usd_thousands_grouping() {
    assert_eq!(Currency::USD.format_amount(dec!(100000)), "$100,000.00");
}

#[test]
fn test_plain_format_has_no_symbol_or_grouping() {
    assert_eq!(Currency::INR.format_plain(dec!(150000.5)), "150000.50");
}

proptest! {
    /// Stripping the symbol and separators gives back the rounded amount
    #[test]
    fn prop_formatted_amount_round_trips(paise in 0u64..10_000_000_000u64) {
        let amount = Decimal::new(paise as i64, 2);
        let formatted = Currency::INR.format_amount(amount);

        prop_assert!(formatted.starts_with('₹'));
        let digits: String = formatted.chars().filter(|c| *c != '₹' && *c != ',').collect();
        prop_assert_eq!(digits.parse::<Decimal>().unwrap(), amount);
    }

    /// Below the first thousand there is no separator; above it the last group is three digits
    #[test]
    fn prop_last_group_is_three_digits(rupees in 1000u64..1_000_000_000u64) {
        let formatted = Currency::INR.format_amount(Decimal::from(rupees));
        let whole = formatted.trim_start_matches('₹').split('.').next().unwrap().to_string();
        let groups: Vec<&str> = whole.split(',').collect();

        prop_assert_eq!(groups.last().unwrap().len(), 3);
        for group in &groups[1..groups.len() - 1] {
            prop_assert_eq!(group.len(), 2);
        }
    }
}
