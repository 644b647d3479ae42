/// Format a currency amount with thousands separators and cents, e.g. `-$1,234.50`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let total_cents = (value.abs() * 100.0).round() as u64;
    let dollars = group_thousands(total_cents / 100);
    let cents = total_cents % 100;

    if value < 0.0 && total_cents > 0 {
        format!("-${dollars}.{cents:02}")
    } else {
        format!("${dollars}.{cents:02}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Whole months rendered as years and months, e.g. `2 years 3 months`.
pub fn format_months(months: f64) -> String {
    if !months.is_finite() || months < 0.0 {
        return "n/a".to_string();
    }

    let whole = months.ceil() as u64;
    let (years, rest) = (whole / 12, whole % 12);
    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    match (years, rest) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{} {}", plural(y, "year"), plural(m, "month")),
    }
}
