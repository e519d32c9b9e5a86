//! Prompt template rendering: `{key}` placeholders filled from session state.
//!
//! Used by [`LlmNode`](crate::node::LlmNode) for prompts and
//! [`AnswerNode`](crate::node::AnswerNode) for literal replies. Single pass,
//! no recursion: a substituted value is never re-scanned for placeholders.

use crate::state::SessionState;

/// Renders `template`, replacing each `{key}` with the state value's display
/// text. Placeholders for absent keys are left literal so a missing input is
/// visible in the rendered output instead of silently vanishing.
pub fn render(template: &str, state: &SessionState) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match state.get(key) {
                    Some(value) => out.push_str(&value.display_text()),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                // Unclosed brace: keep the tail verbatim.
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
