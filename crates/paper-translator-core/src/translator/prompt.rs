//! Instructional prompt sent with every translation request.

/// Rules the model must follow.
const INSTRUCTIONS: &str = "\
다음 영어 논문을 한국어로 번역하라.
번역 시 다음 사항을 반드시 지켜라:
1. 학술 논문의 정확성과 전문성을 유지할 것
2. 모든 내용을 빠짐없이 번역할 것 (수식, 표, 그림 설명 포함, 생략 금지)
3. 원문의 문장 구조를 유지하며 자연스러운 한국어로 번역하되, \"-이다\"체 평서문으로 끝맺을 것 (예: \"This is a test\" -> \"이것은 테스트이다.\")
4. 전문 용어는 적절히 번역하고 필요하면 원문을 괄호 안에 병기할 것
5. 논문의 구조와 형식을 유지할 것
6. 마크다운 형식으로 출력할 것 (제목은 #, ##, ###, 글머리 목록은 -, 번호 목록은 1. 사용)
7. 수식은 LaTeX 형식 그대로 유지할 것
8. 표와 그림 설명도 번역할 것
9. 번역문만 출력하고, 앞뒤에 작업을 수행했다는 안내 문구를 덧붙이지 말 것 (예: \"번역을 완료했습니다.\")";

/// Build the full prompt for `text`.
pub fn build_prompt(text: &str) -> String {
    format!("{INSTRUCTIONS}\n\n영어 원문:\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_source_text() {
        let prompt = build_prompt("Attention is all you need.");
        assert!(prompt.ends_with("영어 원문:\nAttention is all you need."));
    }

    #[test]
    fn test_prompt_covers_formatting_rules() {
        let prompt = build_prompt("");
        assert!(prompt.contains("LaTeX"));
        assert!(prompt.contains("#, ##, ###"));
        assert!(prompt.contains("-이다"));
        assert!(prompt.contains("표와 그림 설명"));
    }
}
