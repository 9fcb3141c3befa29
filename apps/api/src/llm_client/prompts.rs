// Shared prompt fragments and the template renderer.
// Each flow keeps its own prompts.rs alongside it; this file holds what they share.

/// Persona every conversational prompt opens with.
pub const COACH_PERSONA: &str = "You are \"知遇 AI\", a warm, empathetic, and professional career coach.";

/// Appended to every prompt: all user-facing output is Chinese.
pub const RESPOND_IN_CHINESE: &str = "Respond in Chinese.";

/// Fills `{key}` slots in a single left-to-right pass.
///
/// Substituted values are never rescanned, so user text that happens to
/// contain a `{key}` token is embedded verbatim. Unknown slots are left as-is.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let slot = values.iter().find(|(key, _)| {
            tail[1..]
                .strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match slot {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_fills_all_slots() {
        let out = render_template("a={a}, b={b}", &[("a", "1"), ("b", "2")]);
        assert_eq!(out, "a=1, b=2");
    }

    #[test]
    fn test_render_template_does_not_rescan_values() {
        let out = render_template(
            "R: {resume}\nJ: {jd}",
            &[("resume", "contains {jd} literally"), ("jd", "job")],
        );
        assert_eq!(out, "R: contains {jd} literally\nJ: job");
    }

    #[test]
    fn test_render_template_leaves_unknown_braces() {
        let out = render_template("{\"json\": {x}} {missing}", &[("x", "1")]);
        assert_eq!(out, "{\"json\": 1} {missing}");
    }

    #[test]
    fn test_render_template_handles_multibyte_text() {
        let out = render_template("你好，{name}！", &[("name", "知遇")]);
        assert_eq!(out, "你好，知遇！");
    }
}
