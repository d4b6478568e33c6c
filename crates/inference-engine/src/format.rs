//! Currency Formatting

/// Render a price as whole rupiah, e.g. `Rp 1,250,000`
///
/// The value is floored; negative and non-finite inputs render as `Rp 0`.
pub fn format_rupiah(price: f64) -> String {
    let whole = price.floor();
    if !whole.is_finite() || whole <= 0.0 {
        return "Rp 0".to_string();
    }
    // Integral floats print every digit exactly, with no exponent
    format!("Rp {}", group_thousands(&format!("{:.0}", whole)))
}

/// Insert `,` between every group of three digits
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
