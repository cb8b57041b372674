//! Display-length truncation for titles and descriptions.

/// Appended after a hard cut.
const ELLIPSIS: &str = "...";

/// Appended after the last whole word kept.
const WORD_ELLIPSIS: &str = " ...";

/// Shorten `text` to at most `max` characters.
///
/// Text that already fits is returned unchanged. With `preserve_words`
/// the longest run of whole words (re-joined with single spaces) that
/// leaves room for `" ..."` is kept; when not even one word fits this
/// falls back to a hard cut. Without it the text is cut at `max - 3`
/// characters and `"..."` appended.
///
/// The marker counts towards `max`, so the output never exceeds `max`
/// and truncating twice is the same as truncating once.
pub fn truncate(text: &str, max: usize, preserve_words: bool) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }

    if preserve_words {
        let budget = max.saturating_sub(WORD_ELLIPSIS.len());
        let mut kept = String::new();
        for word in text.split_whitespace() {
            let extra = if kept.is_empty() { 0 } else { 1 };
            if kept.chars().count() + extra + word.chars().count() > budget {
                break;
            }
            if extra == 1 {
                kept.push(' ');
            }
            kept.push_str(word);
        }
        if !kept.is_empty() {
            kept.push_str(WORD_ELLIPSIS);
            return kept;
        }
    }

    hard_cut(text, max)
}

fn hard_cut(text: &str, max: usize) -> String {
    if max < ELLIPSIS.len() {
        return ELLIPSIS.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str =
        "This sentence should be truncated here and not go on and on and on and more on.";

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(truncate("This no truncate", 25, true), "This no truncate");
        assert_eq!(truncate("exact", 5, false), "exact");
    }

    #[test]
    fn preserves_whole_words() {
        assert_eq!(
            truncate(SENTENCE, 42, true),
            "This sentence should be truncated here ..."
        );
    }

    #[test]
    fn hard_cut_without_preserve() {
        assert_eq!(truncate(SENTENCE, 33, false), "This sentence should be trunca...");
    }

    #[test]
    fn output_never_exceeds_max() {
        for max in 0..90 {
            for preserve in [true, false] {
                let out = truncate(SENTENCE, max, preserve);
                assert!(out.chars().count() <= max, "max={max} preserve={preserve} got {out:?}");
            }
        }
    }

    #[test]
    fn truncation_is_idempotent() {
        let samples = [
            SENTENCE,
            "",
            "   leading and trailing   ",
            "supercalifragilisticexpialidocious word",
            "ünïcödé wörds that need cutting somewhere in the middle",
            "a b c d e f g h i j k l m n o p",
        ];
        for s in samples {
            for max in 0..70 {
                for preserve in [true, false] {
                    let once = truncate(s, max, preserve);
                    let twice = truncate(&once, max, preserve);
                    assert_eq!(once, twice, "s={s:?} max={max} preserve={preserve}");
                }
            }
        }
    }

    #[test]
    fn long_first_word_falls_back_to_hard_cut() {
        assert_eq!(truncate("abcdefghijklmnop qr", 10, true), "abcdefg...");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(truncate("ééééé", 5, false), "ééééé");
        assert_eq!(truncate("éééééé", 5, false), "éé...");
    }
}
