//! Splits long text into pieces that fit a model's input window.
//!
//! Token counts are approximated as `ceil(chars / 4)` per word; this is not
//! any model's real tokenizer. Chunks never overlap.

/// Context window of the default chat model
pub const MAX_TOKENS: usize = 16_000;

/// Tokens kept free for the model's answer
pub const MAX_RESPONSE_TOKENS: usize = 1_000;

pub const DEFAULT_CHUNK_TOKENS: usize = MAX_TOKENS - MAX_RESPONSE_TOKENS;

const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count of `text`
pub fn count_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Approximate token count of a chunk: the sum of its words' counts.
/// This is what [`chunk_text`] keeps under the limit.
pub fn chunk_tokens(chunk: &str) -> usize {
    chunk.split(' ').map(count_tokens).sum()
}

/// Greedily packs space-separated words into chunks while the running sum of
/// per-word token counts stays within `max_tokens`. A word that alone exceeds
/// the limit is cut into limit-sized pieces.
pub fn chunk_text(text: &str, max_tokens: usize) -> Vec<String> {
    let max_tokens = max_tokens.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_tokens = 0;

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_tokens = count_tokens(word);

        if word_tokens > max_tokens {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut pieces = split_chars(word, max_tokens * CHARS_PER_TOKEN);
            let last = pieces.pop().unwrap_or_default();
            chunks.extend(pieces);
            current_tokens = count_tokens(&last);
            current = last;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_tokens = word_tokens;
        } else if current_tokens + word_tokens <= max_tokens {
            current.push(' ');
            current.push_str(word);
            current_tokens += word_tokens;
        } else {
            chunks.push(std::mem::replace(&mut current, word.to_string()));
            current_tokens = word_tokens;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

fn split_chars(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}
