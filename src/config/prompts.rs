//! Prompt templates for FlyPal.
//!
//! Prompts can be customized by placing a `conversation.toml` file in the
//! custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub conversation: ConversationPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for the flight conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationPrompts {
    /// Full prompt sent to the language model. Receives `{{history}}` and `{{input}}`.
    pub template: String,
    /// How retrieved facts are attached to the user's text. Receives `{{facts}}` and `{{input}}`.
    pub context: String,
}

impl Default for ConversationPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are a helpful AI assistant that provides information about flights. Keep your answers concise and informative.
Conversation History: {{history}}
human: {{input}}
AI:"#
                .to_string(),

            context: "Flight information: {{facts}} {{input}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let conversation_path = custom_path.join("conversation.toml");
            if conversation_path.exists() {
                let content = std::fs::read_to_string(&conversation_path)?;
                prompts.conversation = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in one left-to-right pass; substituted values
    /// are copied through as-is, so a value containing `{{name}}` stays literal.
    /// Unknown placeholders are left in place.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            match after.find("}}") {
                Some(end) => match vars.get(&after[..end]) {
                    Some(value) => {
                        result.push_str(value);
                        rest = &after[end + 2..];
                    }
                    None => {
                        result.push_str("{{");
                        rest = after;
                    }
                },
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.conversation.template.contains("{{history}}"));
        assert!(prompts.conversation.template.contains("{{input}}"));
        assert!(prompts.conversation.context.starts_with("Flight information:"));
    }

    #[test]
    fn test_render_context_template() {
        let mut vars = HashMap::new();
        vars.insert("facts".to_string(), "Flight number AA123 has a squawk code of 3412.".to_string());
        vars.insert("input".to_string(), "What is the squawk of AA123".to_string());

        let result = Prompts::render(&ConversationPrompts::default().context, &vars);
        assert_eq!(
            result,
            "Flight information: Flight number AA123 has a squawk code of 3412. What is the squawk of AA123"
        );
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("history".to_string(), "Human: what does {{input}} mean".to_string());
        vars.insert("input".to_string(), "Where is {{history}} now".to_string());

        let template = &ConversationPrompts::default().template;
        let first = Prompts::render(template, &vars);
        assert!(first.contains("Conversation History: Human: what does {{input}} mean\n"));
        assert!(first.contains("human: Where is {{history}} now\nAI:"));

        for _ in 0..50 {
            assert_eq!(Prompts::render(template, &vars.clone()), first);
        }
    }

    #[test]
    fn test_render_unterminated_placeholder() {
        let mut vars = HashMap::new();
        vars.insert("input".to_string(), "hi".to_string());
        assert_eq!(Prompts::render("{{input}} and {{input", &vars), "hi and {{input");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let result = Prompts::render("{{history}} {{input}}", &HashMap::new());
        assert_eq!(result, "{{history}} {{input}}");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut custom = HashMap::new();
        custom.insert("airline".to_string(), "Acme Air".to_string());
        custom.insert("input".to_string(), "ignored".to_string());
        let prompts = Prompts::load(None, Some(&custom)).unwrap();

        let mut vars = HashMap::new();
        vars.insert("input".to_string(), "Where is AA123?".to_string());

        let rendered = prompts.render_with_custom("{{airline}}: {{input}}", &vars);
        assert_eq!(rendered, "Acme Air: Where is AA123?");
    }

    #[test]
    fn test_load_custom_conversation_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("conversation.toml"),
            "template = \"History: {{history}}\\nQ: {{input}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.conversation.template, "History: {{history}}\nQ: {{input}}");
        // Unspecified fields keep their defaults.
        assert_eq!(prompts.conversation.context, "Flight information: {{facts}} {{input}}");
    }
}
