pub const BASE_INSTRUCTION: &str = "Describe lo que ves en la imagen en español.";
pub const CONTEXT_SECTION: &str = "\n\nContexto adicional:\n{{context}}";

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Compose the text part of a request.
///
/// The context is appended verbatim after the separator; an absent or empty
/// context leaves `base` untouched.
pub fn build_prompt(base: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => {
            let mut prompt = base.to_string();
            prompt.push_str(&render(CONTEXT_SECTION, &[("context", context)]));
            prompt
        }
        _ => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_context_section_has_placeholder() {
        assert!(CONTEXT_SECTION.contains("{{context}}"));
    }

    #[test]
    fn test_build_prompt_without_context() {
        assert_eq!(build_prompt(BASE_INSTRUCTION, None), BASE_INSTRUCTION);
        assert_eq!(build_prompt(BASE_INSTRUCTION, Some("")), BASE_INSTRUCTION);
    }

    #[test]
    fn test_build_prompt_with_context() {
        let prompt = build_prompt(BASE_INSTRUCTION, Some("¿Qué raza es el perro?"));
        assert_eq!(
            prompt,
            "Describe lo que ves en la imagen en español.\n\nContexto adicional:\n¿Qué raza es el perro?"
        );
    }

    #[test]
    fn test_build_prompt_keeps_context_verbatim() {
        let context = "  {{context}} <b>raw</b>\n\ttrailing  ";
        let prompt = build_prompt("base", Some(context));
        assert!(prompt.ends_with(context));
        assert_eq!(prompt.len(), "base\n\nContexto adicional:\n".len() + context.len());
    }
}
