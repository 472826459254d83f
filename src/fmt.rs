/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let parts: Vec<&str> = cents.split('.').collect();
    let int_part = parts[0];
    let dec_part = parts[1];

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// `**** 1234`
pub fn masked(last4: &str) -> String {
    format!("**** {last4}")
}

/// Horizontal bar of `width` cells filled in proportion to `share` (0.0–1.0).
pub fn bar(share: f64, width: usize) -> String {
    let filled = (share.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut out = "\u{2588}".repeat(filled);
    out.push_str(&"\u{2591}".repeat(width - filled));
    out
}

/// Render a stored date or timestamp as `Jun 10, 2024 2:30 PM`; dates without
/// a time component render as `Jun 10, 2024`.
pub fn when(raw: &str) -> String {
    let Some(ts) = crate::models::parse_date(raw) else {
        return raw.to_string();
    };
    if raw.trim().len() <= 10 {
        ts.format("%b %-d, %Y").to_string()
    } else {
        ts.format("%b %-d, %Y %-I:%M %p").to_string()
    }
}
