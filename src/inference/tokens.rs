//! Whitespace token accounting.
//!
//! Summary bounds and the input window are measured in whitespace-separated
//! tokens. This is coarser than a model's subword tokenizer but is stable
//! across backends, which is what the length guarantees need.

/// Number of whitespace-separated tokens in `text`.
pub fn count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate `text` to at most `max_tokens` tokens.
///
/// Text already within the bound is returned unchanged. Otherwise the prefix
/// ending at the last kept token is returned, with original spacing intact.
pub fn truncate(text: &str, max_tokens: usize) -> &str {
    if count(text) <= max_tokens {
        return text;
    }
    if max_tokens == 0 {
        return "";
    }

    let mut seen = 0;
    let mut in_token = false;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if in_token {
                seen += 1;
                in_token = false;
                if seen == max_tokens {
                    return text[..idx].trim_start();
                }
            }
        } else {
            in_token = true;
        }
    }

    // Unreachable while count() and the loop agree on token boundaries.
    text
}
