//! Parsing of the gateway's stringified header name lists.

/// Separator the gateway places between list elements.
const SEPARATOR: &str = ", ";

/// Split a pseudo-list such as `[Host, Accept]` into header names.
///
/// The first and last characters are dropped without checking that they
/// are brackets, then the remainder is split on `", "`. Inputs shorter than
/// two characters are kept whole, and an empty list yields one empty name.
/// Consumers of the encoded output rely on this exact shape.
pub fn split_header_names(raw: &str) -> Vec<String> {
    inner(raw).split(SEPARATOR).map(str::to_string).collect()
}

/// Characters between the first and the last.
fn inner(raw: &str) -> &str {
    let mut indices = raw.char_indices();
    match (indices.next(), indices.next_back()) {
        (Some((_, first)), Some((last, _))) => &raw[first.len_utf8()..last],
        // Zero or one character: substring(1, len - 1) swaps its bounds
        // to (0, 1), returning the input unchanged.
        _ => raw,
    }
}
