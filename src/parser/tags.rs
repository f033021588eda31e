//! Comment tag parsing
//!
//! Slicers and post-processors embed metadata in comments, e.g.
//! `;layer:3` or `;layer_height:0.2, total_layers:120`.

use std::collections::BTreeMap;

use crate::parser::ast::TagValue;

/// Extract `key:value` pairs from a comment.
///
/// Segments are separated by `,` and split on their first `:`. Keys are
/// lowercased; values become numbers when they parse as finite decimals and
/// lowercase text otherwise. Segments without a `:` are skipped.
pub fn parse_comment_tags(comment: &str) -> BTreeMap<String, TagValue> {
    let mut tags = BTreeMap::new();

    for segment in comment.split(',') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };

        let key = key.trim().to_lowercase();
        tags.insert(key, coerce_value(value.trim()));
    }

    tags
}

fn coerce_value(raw: &str) -> TagValue {
    match raw.parse::<f64>() {
        Ok(number) if number.is_finite() => TagValue::Number(number),
        _ => TagValue::Text(raw.to_lowercase()),
    }
}
