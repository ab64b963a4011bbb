//! Prompt templates. The channel narrates Korean news for viewers in their
//! 40s to 60s, so every prompt is written in Korean.

use crate::models::Article;
use crate::utils::truncate_chars;

/// Characters of the script embedded in the metadata prompt.
pub const SCRIPT_EXCERPT_CHARS: usize = 500;

pub fn script_prompt(article: &Article) -> String {
    let body = article
        .content
        .as_deref()
        .map(|c| format!("본문: {c}\n"))
        .unwrap_or_default();
    format!(
        "당신은 시니어층(40~60대)을 대상으로 하는 유튜브 뉴스 채널의 전문 작가입니다.

아래 뉴스 기사를 바탕으로 8~10분 분량의 유튜브 영상 대본을 작성해주세요.

[뉴스 기사]
제목: {title}
내용: {description}
{body}
[대본 작성 요구사항]
1. 도입부 (30초): 강력한 후킹 멘트로 시작 (예: \"여러분, 이거 아십니까?\")
2. 본문 (7분): 기사 내용을 쉽고 자세하게 설명하고, 전문 용어는 풀어서 설명
3. 마무리 (30초): 핵심 요약, 구독과 좋아요 요청, 다음 영상 예고

[톤 및 스타일]
- 존중하는 어조, \"여러분\", \"~입니다\" 등 정중한 표현
- 감정적 어필보다는 사실 중심

대본만 출력해주세요.",
        title = article.title,
        description = article.description,
    )
}

pub fn thumbnail_prompt(article: &Article, count: usize) -> String {
    format!(
        "아래 뉴스 제목을 바탕으로 유튜브 썸네일에 들어갈 강력한 후킹 문구를 {count}개 생성해주세요.

뉴스 제목: {title}

[요구사항]
1. 15자 이내로 간결하게
2. 충격, 궁금증 유발
3. 질문형, 숫자형, 충격형, 반전형 등 다양한 스타일 사용

각 문구를 한 줄에 하나씩, 번호와 함께 출력해주세요.",
        title = article.title,
    )
}

pub fn metadata_prompt(article: &Article, narration: &str) -> String {
    format!(
        "아래 뉴스와 대본을 바탕으로 유튜브 영상 메타데이터를 생성해주세요.

뉴스 제목: {title}
대본: {excerpt}...

다음 형식으로 출력:
VIDEO_TITLE: [60자 이내 영상 제목]
DESCRIPTION: [200자 정도 영상 설명, 뉴스 출처 포함]
TAGS: [관련 태그 10개, 쉼표로 구분]",
        title = article.title,
        excerpt = truncate_chars(narration, SCRIPT_EXCERPT_CHARS),
    )
}
