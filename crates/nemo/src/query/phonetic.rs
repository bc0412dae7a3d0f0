//! American Soundex encoding.

/// Digit for a consonant, `None` for vowels and the separators `h`/`w`.
fn soundex_digit(ch: char) -> Option<char> {
    match ch {
        'b' | 'f' | 'p' | 'v' => Some('1'),
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => Some('2'),
        'd' | 't' => Some('3'),
        'l' => Some('4'),
        'm' | 'n' => Some('5'),
        'r' => Some('6'),
        _ => None,
    }
}

/// Returns the four-character Soundex code of `value`, e.g. `"Robert"` → `"R163"`.
///
/// Characters other than ASCII letters are ignored. A value with no letters
/// encodes to the empty string.
pub fn soundex(value: &str) -> String {
    let mut letters = value
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|ch| ch.to_ascii_lowercase());

    let Some(first) = letters.next() else {
        return String::new();
    };

    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());
    let mut previous = soundex_digit(first);

    for ch in letters {
        if code.len() == 4 {
            break;
        }
        match soundex_digit(ch) {
            Some(digit) => {
                if previous != Some(digit) {
                    code.push(digit);
                }
                previous = Some(digit);
            }
            // h and w do not separate equal codes; vowels do.
            None if ch == 'h' || ch == 'w' => {}
            None => previous = None,
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    code
}
