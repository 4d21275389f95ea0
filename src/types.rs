use serde::{Deserialize, Serialize};

use crate::source::Post;

/// Label assigned to every collected post until real labeling exists.
pub const PLACEHOLDER_LABEL: &str = "neutral";

/// One training example: post text paired with its label. Snapshots are JSON
/// arrays of these, in the order the posts were fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub text: String,
    pub label: String,
}

/// Title and body joined by a single space. Link posts have an empty
/// `selftext`, which leaves a trailing space in `text`; the transformer's
/// cleaning pass trims it later.
pub fn record_from_post(post: &Post) -> LabeledRecord {
    LabeledRecord {
        text: format!("{} {}", post.title, post.selftext),
        label: PLACEHOLDER_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_joins_title_and_body() {
        let post = Post { title: "New CPU announced".into(), selftext: "Details inside.".into() };
        let record = record_from_post(&post);
        assert_eq!(record.text, "New CPU announced Details inside.");
        assert_eq!(record.label, "neutral");
    }

    #[test]
    fn link_post_keeps_trailing_space() {
        let post = Post { title: "Link only".into(), selftext: String::new() };
        assert_eq!(record_from_post(&post).text, "Link only ");
    }
}
