//! Kwanza amount formatting for invoices and receipts.
//!
//! Angolan convention: thousands separated with a period, decimals with a
//! comma, currency code prefixed. Amounts are stored as whole Kwanzas, so
//! the decimal part is always `,00`.

/// Format a whole-Kwanza amount, e.g. `35000` -> `"KZ 35.000,00"`.
/// Missing amounts render as zero.
pub fn format_kwanza(amount: Option<i64>) -> String {
    let amount = amount.unwrap_or(0);
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("KZ -{grouped},00")
    } else {
        format!("KZ {grouped},00")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_periods() {
        assert_eq!(format_kwanza(Some(35_000)), "KZ 35.000,00");
        assert_eq!(format_kwanza(Some(1_234_567)), "KZ 1.234.567,00");
        assert_eq!(format_kwanza(Some(100)), "KZ 100,00");
        assert_eq!(format_kwanza(Some(1_000)), "KZ 1.000,00");
    }

    #[test]
    fn zero_and_missing_render_the_same() {
        assert_eq!(format_kwanza(Some(0)), "KZ 0,00");
        assert_eq!(format_kwanza(None), "KZ 0,00");
    }

    #[test]
    fn negative_amounts_keep_grouping() {
        assert_eq!(format_kwanza(Some(-25_000)), "KZ -25.000,00");
    }
}
