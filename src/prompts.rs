//! Prompt templates for LLM pairwise judgments.
//!
//! Domain logic for rendering comparison prompts. Provider-agnostic.

use crate::gateway::Message;

/// Rendered prompt ready for LLM.
#[derive(Debug, Clone)]
pub struct PromptInstance {
    pub system: String,
    pub user: String,
}

impl PromptInstance {
    pub fn to_messages(&self) -> Vec<Message> {
        vec![Message::system(&self.system), Message::user(&self.user)]
    }
}

/// Escape XML special characters to prevent prompt injection via tag breaking.
fn escape_xml_chars(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// A prompt template with `{label}`, `{item_a}`, `{item_b}` and
/// `{attribute}` placeholders.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    pub fn render(&self, label: &str, item_a: &str, item_b: &str, attribute: &str) -> PromptInstance {
        let fill = |text: &str| {
            text.replace("{label}", &escape_xml_chars(label))
                .replace("{item_a}", &escape_xml_chars(item_a))
                .replace("{item_b}", &escape_xml_chars(item_b))
                .replace("{attribute}", &escape_xml_chars(attribute))
        };

        PromptInstance {
            system: fill(self.system).trim().to_string(),
            user: fill(self.user).trim().to_string(),
        }
    }
}

/// Asks which of two items is better on one attribute. The answer schema is
/// `{"reason": string, "preferred": 1 | 2}` where 1 names the first item.
pub const COMPARISON_PROMPT: PromptTemplate = PromptTemplate {
    system: r#"You judge pairs of {label}. Answer with only a JSON object of the form
{"reason": "<one or two sentences>", "preferred": 1}
where "preferred" is 1 if the first item is better and 2 if the second item is better. Always pick one."#,
    user: "Compare the following two {label}: {item_a} and {item_b}. \
           Which is better in regard to {attribute} and why?",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_items_attribute_and_label() {
        let p = COMPARISON_PROMPT.render("fruits", "apple", "pear", "sweetness");
        assert_eq!(
            p.user,
            "Compare the following two fruits: apple and pear. \
             Which is better in regard to sweetness and why?"
        );
        assert!(p.system.contains("pairs of fruits"));
        assert!(p.system.contains("\"preferred\""));
    }

    #[test]
    fn to_messages_orders_system_then_user() {
        let msgs = COMPARISON_PROMPT.render("x", "a", "b", "q").to_messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, crate::gateway::Role::System);
        assert_eq!(msgs[1].role, crate::gateway::Role::User);
    }

    #[test]
    fn xml_escaping() {
        let p = COMPARISON_PROMPT.render("tools", "<script>alert('x')</script>", "b", "a & b");
        assert!(p.user.contains("&lt;script&gt;"));
        assert!(!p.user.contains("<script>"));
        assert!(p.user.contains("a &amp; b"));
    }
}
