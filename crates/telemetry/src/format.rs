/// Abbreviates large counts the way the dashboard cards show them:
/// `999`, `12.5k`, `1.2M`. A trailing `.0` is dropped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_compact(value: i64) -> String {
    let magnitude = value.unsigned_abs();
    let (scaled, suffix) = if magnitude >= 1_000_000 {
        (value as f64 / 1_000_000.0, "M")
    } else if magnitude >= 1_000 {
        (value as f64 / 1_000.0, "k")
    } else {
        return value.to_string();
    };

    let digits = format!("{scaled:.1}");
    let digits = digits.strip_suffix(".0").unwrap_or(&digits);
    format!("{digits}{suffix}")
}
