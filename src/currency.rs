//! Display formatting for report amounts

use crate::model::Currency;

/// Format an amount for display, e.g. `₹1,23,456`.
///
/// Amounts are rounded to whole rupees and grouped in the Indian style
/// (last three digits, then groups of two).
pub fn format_currency(amount: f64, currency: Currency) -> String {
    let negative = amount < 0.0;
    let rounded = amount.abs().round() as u64;
    let grouped = group_indian(&rounded.to_string());
    if negative {
        format!("-{}{}", currency.symbol(), grouped)
    } else {
        format!("{}{}", currency.symbol(), grouped)
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let bytes = head.as_bytes();
    let mut end = bytes.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_have_no_grouping() {
        assert_eq!(format_currency(0.0, Currency::Inr), "₹0");
        assert_eq!(format_currency(950.0, Currency::Inr), "₹950");
    }

    #[test]
    fn indian_grouping_splits_after_thousands() {
        assert_eq!(format_currency(1234.0, Currency::Inr), "₹1,234");
        assert_eq!(format_currency(123456.0, Currency::Inr), "₹1,23,456");
        assert_eq!(format_currency(12345678.0, Currency::Inr), "₹1,23,45,678");
    }

    #[test]
    fn fractional_amounts_round_to_whole_rupees() {
        assert_eq!(format_currency(2499.5, Currency::Inr), "₹2,500");
        assert_eq!(format_currency(2499.4, Currency::Inr), "₹2,499");
    }

    #[test]
    fn negative_amounts_keep_the_sign_outside() {
        assert_eq!(format_currency(-1234.0, Currency::Inr), "-₹1,234");
    }
}
