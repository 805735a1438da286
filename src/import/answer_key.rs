/// Resolves an answer key such as `B` to a zero-based option index.
///
/// Letters `A`..`F` (any case) map to `0`..`5`. Anything else is read as a
/// zero-based integer index.
pub fn answer_index(token: &str) -> Option<usize> {
    let key = token.trim().to_ascii_uppercase();
    match key.as_str() {
        "A" => Some(0),
        "B" => Some(1),
        "C" => Some(2),
        "D" => Some(3),
        "E" => Some(4),
        "F" => Some(5),
        _ => key.parse::<usize>().ok(),
    }
}
