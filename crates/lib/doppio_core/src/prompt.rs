//! The DoppioBot prompt template.

/// Fixed template; `{doctype_data}`, `{history}` and `{input}` are filled in.
pub const PROMPT_TEMPLATE: &str = "
    The following is a friendly conversation between a human and an AI.
    The AI is named DoppioBot and provides detailed responses with contextual data.
    When a specific Doctype is selected, the AI analyzes its data and answers accordingly, providing insights, summaries, or visualizations.

    Doctype Data (if any): {doctype_data}

    Current conversation:
    {history}
    Human: {input}
    AI:";

/// Values substituted into [`PROMPT_TEMPLATE`].
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub history: &'a str,
    pub input: &'a str,
    pub doctype_data: &'a str,
}

/// Render the template in a single pass.
///
/// Placeholders inside substituted values are left alone, so a user message
/// containing `{history}` is sent as typed.
pub fn render(inputs: &PromptInputs<'_>) -> String {
    let mut out = String::with_capacity(
        PROMPT_TEMPLATE.len() + inputs.history.len() + inputs.input.len() + inputs.doctype_data.len(),
    );
    let mut rest = PROMPT_TEMPLATE;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };
        match &tail[1..end] {
            "history" => out.push_str(inputs.history),
            "input" => out.push_str(inputs.input),
            "doctype_data" => out.push_str(inputs.doctype_data),
            _ => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}
