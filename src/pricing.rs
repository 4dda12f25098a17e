//! Multi-year pricing for domain registrations.
//!
//! Discounts are driven by an explicit, ordered tier table rather than a
//! chain of `if` statements; the first tier that matches wins. Years with
//! no matching tier (0, 4, ...) pay the full per-year price.

/// How a tier decides whether it applies to a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermMatch {
    Exactly(u32),
    AtLeast(u32),
}

impl TermMatch {
    fn matches(&self, years: u32) -> bool {
        match *self {
            TermMatch::Exactly(n) => years == n,
            TermMatch::AtLeast(n) => years >= n,
        }
    }
}

/// Discount multipliers in basis points (10_000 = full price).
/// Order matters: earlier tiers shadow later ones.
const TIERS: &[(TermMatch, i128)] = &[
    (TermMatch::Exactly(1), 10_000),
    (TermMatch::Exactly(2), 9_500),
    (TermMatch::Exactly(3), 9_000),
    (TermMatch::AtLeast(5), 8_000),
];

const FULL_PRICE_BP: i128 = 10_000;

/// Total price in whole Kwanzas for registering a domain for `years` years
/// at `base_price` per year. Rounded half-up to the nearest Kwanza.
///
/// The function itself does not reject `years == 0`; callers validate the
/// term before quoting.
pub fn multi_year_price(base_price: i64, years: u32) -> i64 {
    let bp = TIERS
        .iter()
        .find(|(matcher, _)| matcher.matches(years))
        .map(|(_, bp)| *bp)
        .unwrap_or(FULL_PRICE_BP);

    let raw = base_price as i128 * years as i128 * bp;
    let rounded = (raw + FULL_PRICE_BP / 2) / FULL_PRICE_BP;
    rounded as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_table() {
        assert_eq!(multi_year_price(1000, 1), 1000);
        assert_eq!(multi_year_price(1000, 2), 1900);
        assert_eq!(multi_year_price(1000, 3), 2700);
        assert_eq!(multi_year_price(1000, 5), 4000);
        assert_eq!(multi_year_price(1000, 10), 8000);
    }

    #[test]
    fn four_years_gets_no_discount() {
        // Open question flagged to product: 4-year terms fall through every
        // tier and pay full price. Pinned here so a change is deliberate.
        assert_eq!(multi_year_price(1000, 4), 4000);
        assert_eq!(multi_year_price(25000, 4), 100_000);
    }

    #[test]
    fn one_year_is_identity() {
        for base in [0, 1, 999, 25_000, 3_500_000] {
            assert_eq!(multi_year_price(base, 1), base);
        }
    }

    #[test]
    fn rounding_is_half_up() {
        // 1001 * 3 * 0.9 = 2702.7 -> 2703
        assert_eq!(multi_year_price(1001, 3), 2703);
        // 999 * 2 * 0.95 = 1898.1 -> 1898
        assert_eq!(multi_year_price(999, 2), 1898);
        // 50 * 2 * 0.95 = 95.0 exact
        assert_eq!(multi_year_price(50, 2), 95);
    }

    #[test]
    fn zero_years_costs_nothing() {
        assert_eq!(multi_year_price(25_000, 0), 0);
    }
}
