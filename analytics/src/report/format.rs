//! Number formatting for report text.

/// Insert `,` every three digits of an unsigned digit string.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed-point number with thousands separators: `1234.5` → `1,234.50`.
///
/// Non-finite values render as `inf`, `-inf` and `nan`.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }

    let fixed = format!("{:.*}", decimals, value);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut out = format!("{}{}", sign, group_thousands(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Currency with two decimals: `$12,345.68`.
pub fn format_currency(value: f64) -> String {
    format!("${}", format_grouped(value, 2))
}

/// Currency with no decimals: `$12,346`.
pub fn format_currency_whole(value: f64) -> String {
    format!("${}", format_grouped(value, 0))
}

/// Integer count with thousands separators.
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// `day` for exactly one, `days` otherwise.
pub fn day_noun(days: i64) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}

/// `1 day`, `4 days`, `-2 days`.
pub fn format_days(days: i64) -> String {
    format!("{} {}", days, day_noun(days))
}

/// Two-decimal float, `nan` when missing.
pub fn format_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_nan() => "nan".to_string(),
        Some(v) => format!("{:.*}", decimals, v),
        None => "nan".to_string(),
    }
}
