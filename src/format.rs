//! Display strings handed to the rendering layer.

/// Group the integer part with commas and keep up to `max_fraction` digits,
/// trimming trailing zeros (`1000.5` → `1,000.5`).
pub fn format_number(value: f64, max_fraction: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let rendered = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (rendered.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// Sign and fixed-point magnitude; values that round to zero carry no sign.
fn signed_fixed(value: f64, decimals: usize) -> (&'static str, String) {
    let digits = format!("{:.*}", decimals, value.abs());
    let rounds_to_zero = digits.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !rounds_to_zero { "-" } else { "" };
    (sign, digits)
}

/// Portfolio and holding values: `$1,000.5`.
pub fn format_currency(value: f64) -> String {
    let number = format_number(value, 3);
    match number.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${number}"),
    }
}

/// Closing prices, always two decimals: `$187.10`.
pub fn format_price(value: f64) -> String {
    let (sign, digits) = signed_fixed(value, 2);
    format!("{sign}${digits}")
}

/// `ROI: 12.35%`
pub fn format_roi(roi_percent: f64) -> String {
    if roi_percent.is_finite() {
        let (sign, digits) = signed_fixed(roi_percent, 2);
        format!("ROI: {sign}{digits}%")
    } else {
        "ROI: N/A%".to_string()
    }
}

/// `AAPL: 10 shares`
pub fn format_shares(symbol: &str, quantity: f64) -> String {
    format!("{symbol}: {} shares", format_number(quantity, 6).replace(',', ""))
}
