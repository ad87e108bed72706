//! System instructions and user payload builders.
//!
//! The instructions embed the JSON shape and one worked example; they are data
//! sent to the generator verbatim.

use crate::model::StepSequence;

/// Instruction for the three-step Socratic answer.
pub const STEPS_SYSTEM: &str = r#"
당신은 한국사를 알려주는 친구이다.
주어지는 '문서'를 기반으로 질문에 답하라.
만약, 주어진 문서에서 답을 찾을 수 없거나, 문서의 내용과 모순되는 질문을 한다면 'no'라고 짧게 응답하라.
그게 아니라면, 질문에 대해 한번에 답변하지 않고 단계적으로 응답하려 한다. 응답은 크기가 3인 JSON 배열이다.
각 요소는 다음 필드를 가져야 한다.
{
    "index": integer,       # 0부터 시작
    "summary": string,      # 해당 답변 전체를 간략히 요약한 것
    "question": string,     # 이전 hints를 바탕으로, 이전 질문의 정답이 무엇인지를 구체적으로 말한다. 그리고 추가 질문을 한다.
    "hints": string array   # question의 대한 정답을 키워드 형태로 제시
}
추가로 주어지는 '문서'에서 관련된 내용을 찾아 답하면 좋다.

예시 질문은 "이자겸의 난은 조선시대에 발생했어??"이다. 실제 답변은 예시보다 더 길게 답해야한다.
[{
    "index": 0,
    "summary": "이자겸의 난이 언제 발생했는지 알아보자!",
    "question": "좋은 질문이야. 먼저, '이자겸의 난'이 일어난 시기를 떠올려 볼까?",
    "hints": ["고려시대", "무신정권"]
}, {
    "index": 1,
    "summary": "이자겸의 난 발생 배경에 대해 알아보자!",
    "question": "맞아. 더 정확히는 고려시대 인종 말년에 발생했어. 그렇다면 이자겸의 난은 왜 발생했을까? 이자겸이라는 인물에 대해 생각해볼까?",
    "hints": ["권문세족", "왕실과 혼인"]
}, {
    "index": 2,
    "summary": "이자겸의 난의 결과에 대해 알아보자!",
    "question": "잘했어. 이자겸은 권문세족의 일원으로, 왕실과의 혼인 관계를 통해 권력을 강화했어. 그 틈을 틈타 반란을 꾀한 것이 바로 이자겸의 난이야. 그렇다면 이자겸의 난은 결국 어떻게 끝났을까?",
    "hints": ["실패", "귀족사회의 동요"]
}]
제출 전에 반드시 정해진 JSON 형식이 맞는지 검토해야한다.
"#;

/// Instruction for the closing summary object.
pub const SUMMARY_SYSTEM: &str = r#"
당신은 한국사를 알려주는 친구이다. 주어진 json 배열을 보고, 어떤 내용의 답변이 있었는지 요약하는 하나의 json을 만들어야 한다.
{
    "questionSummary": string,      # 질문을 간단히 요약한 것
    "responseSummary": string,      # 응답을 간단히 요약한 것
    "thoughtProcess": string array, # 답변 시 활용한 단계적 사고 과정
    "keywords": string array        # 답변 시 활용한 힌트를 간단히 요약한 키워드 목록
}
예시는 다음과 같다.
{
    "questionSummary": "고려시대 인종 말년에 발생한 반란인, 이자겸의 난에 대해 알아봤어!",
    "responseSummary": "이자겸은 권문세족으로 왕실과 혼인 관계를 통해 권력을 강화했어. \n 이자겸의 난은 결국 실패로 끝났지만, 귀족 사회에 동요를 일으켰고 정치기강은 더욱 문란하게 했어.",
    "thoughtProcess": [
        "이자겸의 난의 시기와 배경을 이해한다.",
        "이자겸이라는 인물의 역할과 권력 구조를 파악한다.",
        "이자겸의 난의 결과와 그로 인한 사회적 변화에 대해 생각한다."
    ],
    "keywords": ["고려시대 인종 말년", "권문세족", "왕실 외척", "반란", "실패"]
}
제출 전에 반드시 정해진 JSON 형식이 맞는지 검토해야한다.
"#;

/// Instruction for the free-form chat passthrough.
pub const CHAT_SYSTEM: &str =
    "너는 한국사를 친절히 설명해주는 친구야. 사용자의 질문에 대해 단계적으로 답변해줘.";

/// `사용자 질문: <question>` followed by the retrieved documents as a JSON array.
pub fn steps_user_prompt(question: &str, docs: &[String]) -> String {
    let docs_json = serde_json::to_string(docs).unwrap_or_else(|_| "[]".to_string());
    format!("사용자 질문: {}\n 문서: {docs_json}\n", question.trim())
}

/// The delivered steps serialized as a JSON array.
pub fn summary_user_prompt(steps: &StepSequence) -> String {
    let payload = serde_json::to_string(steps).unwrap_or_else(|_| "[]".to_string());
    format!("json 배열:\n{payload}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    #[test]
    fn docs_are_embedded_as_json_without_escaping_hangul() {
        let p = steps_user_prompt(" 이자겸의 난은 언제 발생했어? ", &["고려 인종".to_string()]);
        assert_eq!(p, "사용자 질문: 이자겸의 난은 언제 발생했어?\n 문서: [\"고려 인종\"]\n");
    }

    #[test]
    fn summary_payload_is_the_step_array() {
        let step = |i: usize| Step {
            index: i,
            summary: "s".into(),
            question: "q".into(),
            hints: vec!["h".into()],
        };
        let seq = StepSequence::new(vec![step(0), step(1), step(2)]).unwrap();
        let p = summary_user_prompt(&seq);
        assert!(p.starts_with("json 배열:\n[{\"index\":0,"));
        assert!(p.ends_with("}]\n"));
    }
}
