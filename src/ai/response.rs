//! Response post-processing applied before caching.

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Remove `<think>...</think>` reasoning blocks.
///
/// A closing tag without an opening one drops everything before it; an
/// unterminated opening tag drops everything after it.
pub fn strip_think_tags(text: &str) -> String {
    let mut rest = text;
    if let Some(close) = rest.find(THINK_CLOSE)
        && rest.find(THINK_OPEN).is_none_or(|open| open > close)
    {
        rest = &rest[close + THINK_CLOSE.len()..];
    }

    let mut out = String::with_capacity(rest.len());
    while let Some(open) = rest.find(THINK_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + THINK_OPEN.len()..];
        match after.find(THINK_CLOSE) {
            Some(close) => rest = &after[close + THINK_CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Strip each stop word once from the end, in order
pub fn trim_stop_words(text: &str, stop_words: &[String]) -> String {
    let mut out = text;
    for word in stop_words {
        if let Some(stripped) = out.strip_suffix(word.as_str()) {
            out = stripped;
        }
    }
    out.to_string()
}

/// Full post-processing: reasoning removal, stop-word suffixes, surrounding whitespace
pub fn clean_response(text: &str, stop_words: &[String]) -> String {
    let stripped = strip_think_tags(text);
    trim_stop_words(&stripped, stop_words).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_think_block() {
        assert_eq!(
            strip_think_tags("<think>\nplan\n</think>\n\nAnswer"),
            "\n\nAnswer"
        );
        assert_eq!(strip_think_tags("a<think>x</think>b<think>y</think>c"), "abc");
    }

    #[test]
    fn test_orphan_tags() {
        assert_eq!(strip_think_tags("reasoning</think>Answer"), "Answer");
        assert_eq!(strip_think_tags("Answer<think>never closed"), "Answer");
        assert_eq!(strip_think_tags("plain"), "plain");
    }

    #[test]
    fn test_trim_stop_words() {
        let stops = vec!["<|eot_id|>".to_string(), "```".to_string()];
        assert_eq!(trim_stop_words("text```", &stops), "text");
        assert_eq!(trim_stop_words("text```<|eot_id|>", &stops), "text");
        assert_eq!(trim_stop_words("```text", &stops), "```text");
    }

    #[test]
    fn test_clean_response() {
        let stops = vec!["</s>".to_string()];
        assert_eq!(
            clean_response("<think>hmm</think>\n  Summary.  </s>", &stops),
            "Summary."
        );
        assert_eq!(clean_response(" \n<think>only thoughts</think>\n", &stops), "");
    }
}
