/// Currency helpers for rupiah amounts.
///
/// Budgets are stored as whole rupiah (IDR has no minor unit in practice),
/// and displayed the way `id-ID` formats IDR with zero fraction digits.

/// Format whole rupiah as `Rp 1.500.000`.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Parse a user-entered rupiah amount such as `750000`, `750.000` or `Rp 750.000`.
pub fn parse_rupiah(amount_str: &str) -> Result<i64, String> {
    let cleaned: String = amount_str
        .trim()
        .trim_start_matches("Rp")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();

    if cleaned.starts_with('-') {
        return Err("Amount cannot be negative".to_string());
    }

    cleaned
        .parse::<i64>()
        .map_err(|_| "Invalid amount format".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(500), "Rp 500");
        assert_eq!(format_rupiah(50_000), "Rp 50.000");
        assert_eq!(format_rupiah(750_000), "Rp 750.000");
        assert_eq!(format_rupiah(1_500_000), "Rp 1.500.000");
        assert_eq!(format_rupiah(-2_000), "-Rp 2.000");
    }

    #[test]
    fn test_parse_rupiah() {
        assert_eq!(parse_rupiah("750000"), Ok(750_000));
        assert_eq!(parse_rupiah("Rp 750.000"), Ok(750_000));
        assert_eq!(parse_rupiah("-100"), Err("Amount cannot be negative".to_string()));
        assert_eq!(parse_rupiah("abc"), Err("Invalid amount format".to_string()));
    }
}
