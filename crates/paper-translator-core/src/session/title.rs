use chrono::NaiveDateTime;

const FALLBACK_PREFIX: &str = "번역_";

/// Title for a saved translation.
///
/// The first level-1 Markdown heading (`# Title`), or a timestamped fallback
/// such as `번역_20250301_142530` when the text has none.
pub fn derive_title(translated: &str, now: NaiveDateTime) -> String {
    first_heading(translated)
        .map_or_else(|| fallback_title(now), str::to_string)
}

pub fn fallback_title(now: NaiveDateTime) -> String {
    format!("{FALLBACK_PREFIX}{}", now.format("%Y%m%d_%H%M%S"))
}

fn first_heading(text: &str) -> Option<&str> {
    text.lines().find_map(|line| {
        let rest = line.strip_prefix('#')?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let title = rest.trim();
        (!title.is_empty()).then_some(title)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(14, 25, 30)
            .unwrap()
    }

    #[test]
    fn test_first_heading_wins() {
        let text = "서문이다.\n# 주의 메커니즘\n본문\n# 두 번째";
        assert_eq!(derive_title(text, now()), "주의 메커니즘");
    }

    #[test]
    fn test_heading_is_trimmed() {
        assert_eq!(derive_title("#   제목 앞뒤 공백   \n", now()), "제목 앞뒤 공백");
    }

    #[test]
    fn test_subheadings_are_ignored() {
        let text = "## 요약\n### 방법\n본문이다.";
        assert_eq!(derive_title(text, now()), "번역_20250301_142530");
    }

    #[test]
    fn test_hash_without_space_is_not_a_heading() {
        assert_eq!(derive_title("#hashtag\n", now()), "번역_20250301_142530");
    }

    #[test]
    fn test_empty_heading_falls_back() {
        assert_eq!(derive_title("#   \n본문", now()), "번역_20250301_142530");
    }

    #[test]
    fn test_indented_heading_is_not_a_heading() {
        assert_eq!(derive_title("  # 들여쓰기", now()), fallback_title(now()));
    }

    #[test]
    fn test_empty_text_falls_back() {
        assert_eq!(derive_title("", now()), "번역_20250301_142530");
    }
}
