use std::time::Duration;

/// Assumed speaking rate of the remote voice
pub const WORDS_PER_MINUTE: u64 = 150;

/// Shortest "still speaking" window
pub const MIN_SPEECH_DURATION: Duration = Duration::from_millis(2000);

/// Longest "still speaking" window
pub const MAX_SPEECH_DURATION: Duration = Duration::from_millis(20000);

/// Markdown punctuation that would otherwise be read aloud
const MARKUP: [char; 4] = ['*', '_', '`', '#'];

/// Prepare chat text for speech.
///
/// Drops emoji and other pictographs, strips markdown punctuation, turns
/// line breaks into sentence breaks, collapses repeated `.`, `!` and `?`
/// and squeezes whitespace. Applying it twice gives the same result as once.
pub fn sanitize(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|c| !is_pictographic(*c) && !MARKUP.contains(c))
        .collect();

    // Whitespace runs: a run holding a newline becomes a sentence break
    let mut spaced = String::with_capacity(filtered.len());
    let mut chars = filtered.trim().chars().peekable();
    while let Some(c) = chars.next() {
        if !c.is_whitespace() {
            spaced.push(c);
            continue;
        }

        let mut newline = c == '\n';
        while let Some(&next) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            newline |= next == '\n';
            chars.next();
        }
        spaced.push_str(if newline { ". " } else { " " });
    }

    // Repeated terminal punctuation
    let mut out = String::with_capacity(spaced.len());
    let mut last: Option<char> = None;
    for c in spaced.chars() {
        if matches!(c, '.' | '!' | '?') && last == Some(c) {
            continue;
        }
        out.push(c);
        last = Some(c);
    }

    out.trim().to_string()
}

/// Rough time the remote voice needs for `text`.
///
/// Word count at [`WORDS_PER_MINUTE`], clamped to
/// [`MIN_SPEECH_DURATION`]..=[`MAX_SPEECH_DURATION`].
pub fn estimate_duration(text: &str) -> Duration {
    let words = text.split_whitespace().count() as u64;
    let estimate = Duration::from_millis(words * 60_000 / WORDS_PER_MINUTE);
    estimate.clamp(MIN_SPEECH_DURATION, MAX_SPEECH_DURATION)
}

/// Emoji, dingbats, arrows, shapes and the joiners/selectors that glue them
fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x00A9 | 0x00AE | 0x203C | 0x2049 | 0x2122 | 0x2139
            | 0x200D
            | 0x20E3
            | 0x2190..=0x21FF
            | 0x2300..=0x23FF
            | 0x24C2
            | 0x25A0..=0x25FF
            | 0x2600..=0x27BF
            | 0x2900..=0x297F
            | 0x2B00..=0x2BFF
            | 0x3030 | 0x303D | 0x3297 | 0x3299
            | 0xFE00..=0xFE0F
            | 0x1F000..=0x1FAFF
            | 0xE0020..=0xE007F
    )
}
