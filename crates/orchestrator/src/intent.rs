//! Keyword-heuristic intent classifier: decides whether a query asks for
//! data or is small talk, with a confidence in `[0.5, 0.99]`. It never
//! fails to produce a decision.

use feedchat_protocol::{IntentDecision, IntentKind};

const DATA_QUERY_KEYWORDS: &[&str] = &[
    "show",
    "latest",
    "news",
    "headline",
    "headlines",
    "article",
    "articles",
    "story",
    "stories",
    "feed",
    "feeds",
    "post",
    "posts",
    "update",
    "updates",
    "today",
    "recent",
    "top",
    "trending",
    "list",
    "find",
    "search",
    "what",
    "when",
    "where",
    "which",
    "who",
    "about",
    "summary",
    "summarize",
];

const CHITCHAT_KEYWORDS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "yo",
    "thanks",
    "thank you",
    "how are you",
    "good morning",
    "good afternoon",
    "good evening",
    "good night",
    "bye",
    "goodbye",
    "see you",
    "lol",
    "haha",
    "cool",
    "nice",
];

/// Queries shorter than this with no keyword signal default to chitchat.
const SHORT_QUERY_LEN: usize = 12;

/// Classify a query. Strict keyword majority wins; on a tie (including
/// zero matches on both sides) the default policy applies in order: a
/// question mark means data-query, a very short query means chitchat,
/// anything else is a data-query.
#[must_use]
pub fn classify(query: &str) -> IntentDecision {
    let normalized = query.trim().to_lowercase();
    let tokens: Vec<&str> = normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    let data_matches = count_matches(&normalized, &tokens, DATA_QUERY_KEYWORDS);
    let chat_matches = count_matches(&normalized, &tokens, CHITCHAT_KEYWORDS);

    let (intent, matched) = if data_matches > chat_matches {
        (IntentKind::DataQuery, data_matches)
    } else if chat_matches > data_matches {
        (IntentKind::Chitchat, chat_matches)
    } else if normalized.contains('?') {
        (IntentKind::DataQuery, data_matches)
    } else if normalized.chars().count() < SHORT_QUERY_LEN {
        (IntentKind::Chitchat, chat_matches)
    } else {
        (IntentKind::DataQuery, data_matches)
    };

    #[allow(clippy::cast_precision_loss)]
    let confidence = (0.1f64.mul_add(matched as f64, 0.5)).clamp(0.5, 0.99);
    IntentDecision { intent, confidence }
}

/// Count matched keywords: single words must match a whole token, phrases
/// match as substrings of the normalized query. Each keyword counts once.
fn count_matches(normalized: &str, tokens: &[&str], keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|keyword| {
            if keyword.contains(' ') {
                normalized.contains(*keyword)
            } else {
                tokens.contains(keyword)
            }
        })
        .count()
}
