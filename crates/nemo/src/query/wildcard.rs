//! Anchored `*` / `?` wildcard matching.

/// Matches `pattern` against the whole of `candidate`.
///
/// `*` matches any run of characters (including none) and `?` matches
/// exactly one character. Everything else matches itself.
pub fn wildcard_matches(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let mut p = 0usize;
    let mut c = 0usize;
    // Position of the last `*` seen, and where in the candidate it started.
    let mut backtrack: Option<(usize, usize)> = None;

    while c < candidate.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == candidate[c]) {
            p += 1;
            c += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, c));
            p += 1;
        } else if let Some((star, start)) = backtrack {
            // Let the last star absorb one more character and retry.
            p = star + 1;
            c = start + 1;
            backtrack = Some((star, start + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|ch| *ch == '*')
}
