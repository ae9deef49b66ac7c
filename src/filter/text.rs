use mongodb::bson::{doc, Bson, Document};

const REGEX_SPECIAL: &[char] = &['\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$', '-', '/'];

/// Escape user text so it matches literally inside `$regex`
pub fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if REGEX_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive "contains" condition
pub fn contains_condition(text: &str) -> Bson {
    Bson::Document(doc! { "$regex": escape_regex(text.trim()), "$options": "i" })
}

/// In-memory counterpart of `contains_condition`
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// Skip empty query values the way the handlers receive them (`?name=`)
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Inclusive `[start, end]` range on an integer field
pub fn range_condition(start: Option<i64>, end: Option<i64>) -> Option<Bson> {
    let mut range = Document::new();
    if let Some(start) = start {
        range.insert("$gte", start);
    }
    if let Some(end) = end {
        range.insert("$lte", end);
    }
    if range.is_empty() {
        None
    } else {
        Some(Bson::Document(range))
    }
}

pub fn in_range(value: i64, start: Option<i64>, end: Option<i64>) -> bool {
    start.map_or(true, |s| value >= s) && end.map_or(true, |e| value <= e)
}

/// Clamp a requested page size into `[1, max]`, falling back to `default`
pub fn clamp_limit(requested: Option<i64>, default: i64, max: i64) -> i64 {
    match requested {
        Some(n) if n > 0 => n.min(max),
        _ => default.min(max),
    }
}
