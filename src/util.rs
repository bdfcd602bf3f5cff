use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_currency(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.1}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.1}M", value / 1e6)
    } else {
        format!("${value}")
    }
}

/// Link caption in whole millions, switching to billions from $1000M.
pub fn weight_label(weight: f64) -> String {
    let millions = (weight / 1e6).round();
    if millions >= 1000.0 {
        format!("${:.1}B", millions / 1000.0)
    } else {
        format!("${millions}M")
    }
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_uses_largest_unit() {
        assert_eq!(format_currency(2.5e12), "$2.5T");
        assert_eq!(format_currency(95e9), "$95.0B");
        assert_eq!(format_currency(1.3e6), "$1.3M");
        assert_eq!(format_currency(900.0), "$900");
    }

    #[test]
    fn weight_label_rounds_to_millions() {
        assert_eq!(weight_label(150_000_000.0), "$150M");
        assert_eq!(weight_label(1_400_000_000.0), "$1.4B");
        assert_eq!(weight_label(0.0), "$0M");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("Stripe");
        assert_eq!(first, stable_pair("Stripe"));
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
        assert_ne!(first, stable_pair("Airbnb"));
    }
}
