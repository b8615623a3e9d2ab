/// Levenshtein edit distance between two strings.
///
/// Classic dynamic-programming formulation with unit costs for insertion,
/// deletion, and substitution, computed over chars (not bytes) so multi-byte
/// input does not skew the result. Uses a rolling single-row table.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // row[j] holds the distance between a[..i] and b[..j]
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, &ca) in a_chars.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;

        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let next = (row[j + 1] + 1).min(row[j] + 1).min(prev_diag + cost);
            prev_diag = row[j + 1];
            row[j + 1] = next;
        }
    }

    row[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("abc", "abd"), 1);
        assert_eq!(levenshtein("abc", "abcd"), 1);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_identical() {
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("hello world", "hello world"), 0);
    }

    #[test]
    fn test_multibyte() {
        // One substitution, regardless of byte lengths
        assert_eq!(levenshtein("naïve", "naive"), 1);
    }
}
