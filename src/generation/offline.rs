//! Canned replies used when no text backend is available.

pub const SCRIPT: &str = "\
여러분, 안녕하세요. 오늘은 정말 중요한 소식을 가지고 왔습니다.

[도입부]
혹시 여러분, 이 소식 들어보셨나요? 최근 많은 분들이 관심을 가지고 계신 내용인데요, 오늘 자세히 알아보도록 하겠습니다.

[본문]
먼저 사건의 전말부터 차근차근 말씀드리겠습니다. 이번 일이 우리 생활에 어떤 영향을 미칠지, 전문가들의 의견과 함께 살펴보겠습니다.

[마무리]
오늘 영상이 도움이 되셨다면 구독과 좋아요, 알림 설정 부탁드립니다.
다음 영상에서는 더 유익한 정보로 찾아뵙겠습니다. 감사합니다.";

pub const THUMBNAIL_TITLES: &str = "\
1. 이거 실화인가요?
2. 충격! 00억 날렸다
3. 결국 터졌습니다
4. 알고 보니 대박
5. 지금 당장 확인하세요
6. 99% 모르는 사실
7. 뒤늦은 후회
8. 전문가도 놀란
9. 이제야 밝혀진 진실
10. 반드시 알아야 할";

pub const METADATA: &str = "\
VIDEO_TITLE: [핵심 정리] 오늘 꼭 알아야 할 뉴스, 영향은?
DESCRIPTION: 오늘의 주요 뉴스를 쉽고 자세하게 정리했습니다. 이번 소식이 우리 생활과 경제에 미칠 영향을 함께 살펴봅니다.
TAGS: 뉴스, 시니어뉴스, 경제뉴스, 오늘의뉴스, 핵심정리, 시사, 한국경제, 이슈, 분석, 재테크";
