//! Fractional notation for monetary fields in canonical text.
//!
//! The gateway treats `BilledAmount`, `TaxedAmount` and `Amount` as
//! floating point and canonicalizes them as `100.0`, never `100`. `Money`
//! already serializes that way; this pass covers payloads assembled from
//! untyped JSON where an amount may still be a bare integer.

/// Fields whose integer values are rewritten with a `.0` suffix.
pub const FRACTIONAL_AMOUNT_FIELDS: &[&str] = &["BilledAmount", "TaxedAmount", "Amount"];

/// Rewrites `"<Field>":<integer>` to `"<Field>":<integer>.0` for the fields
/// in [`FRACTIONAL_AMOUNT_FIELDS`] when the integer is directly followed by
/// `,` or `}`. Expects minified JSON. String contents are never touched and
/// the pass is idempotent.
pub fn ensure_fractional_amounts(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'"' {
            let next = bytes[i..]
                .iter()
                .position(|&b| b == b'"')
                .map_or(bytes.len(), |offset| i + offset);
            out.push_str(&text[i..next]);
            i = next;
            continue;
        }

        let end = string_end(bytes, i);
        out.push_str(&text[i..end]);
        let name = text.get(i + 1..end.saturating_sub(1)).unwrap_or("");
        i = end;

        if bytes.get(i) != Some(&b':') || !FRACTIONAL_AMOUNT_FIELDS.contains(&name) {
            continue;
        }

        let value_start = i + 1;
        let mut j = value_start;
        if bytes.get(j) == Some(&b'-') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }

        if j > digits_start && matches!(bytes.get(j), Some(b',') | Some(b'}')) {
            out.push(':');
            out.push_str(&text[value_start..j]);
            out.push_str(".0");
            i = j;
        }
    }

    out
}

/// Index one past the closing quote of the string starting at `start`.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'"' => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}
