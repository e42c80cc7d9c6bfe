//! Prompt Construction
//!
//! Turns generation and validation requests into prompt text. Pure and
//! infallible.

mod templates;

use std::fmt::Write;

use crate::models::{ConversationMessage, GenerateCodeRequest, ValidateCodeRequest};

/// Number of most recent conversation messages included in a prompt
pub const HISTORY_WINDOW: usize = 5;
/// Characters kept from each conversation message
pub const MESSAGE_PREVIEW_CHARS: usize = 200;
/// Characters kept from each existing project file
pub const FILE_PREVIEW_CHARS: usize = 500;

/// Builds prompt text for the two request kinds.
pub trait PromptBuilder: Send + Sync {
    fn build_generation_prompt(&self, request: &GenerateCodeRequest) -> String;
    fn build_validation_prompt(&self, request: &ValidateCodeRequest) -> String;
}

/// Prompt builder using fixed per-framework templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePromptBuilder;

impl PromptBuilder for TemplatePromptBuilder {
    fn build_generation_prompt(&self, request: &GenerateCodeRequest) -> String {
        let framework = request.framework;
        let mut prompt = String::new();

        let _ = writeln!(prompt, "{}\n", templates::generation_guidance(framework));
        let _ = writeln!(prompt, "USER REQUIREMENTS:\n{}\n", request.prompt);
        let _ = writeln!(prompt, "TARGET FRAMEWORK: {framework}\n");

        push_history(&mut prompt, &request.conversation_history);

        if !request.current_files.is_empty() {
            prompt.push_str("CURRENT PROJECT FILES:\n");
            let mut names: Vec<&String> = request.current_files.keys().collect();
            names.sort();
            for name in names {
                let content = &request.current_files[name];
                let _ = writeln!(prompt, "--- {name} ---\n{}", preview(content, FILE_PREVIEW_CHARS));
            }
            prompt.push_str("Keep new code consistent with these existing files.\n\n");
        }

        prompt.push_str(
            "RESPONSE FORMAT:\n\
             A JSON object with \"files\" (filename to complete file content), \
             \"explanation\" (what was built) and \"suggestions\" (list of next steps). \
             File contents must be complete and the JSON properly escaped.\n",
        );
        prompt
    }

    fn build_validation_prompt(&self, request: &ValidateCodeRequest) -> String {
        let framework = request.framework;
        let mut prompt = String::new();

        let _ = writeln!(prompt, "You are an expert {framework} code reviewer.");
        let _ = writeln!(prompt, "{}\n", templates::validation_focus(framework));

        prompt.push_str("CODE TO ANALYZE:\n");
        let mut names: Vec<&String> = request.files.keys().collect();
        names.sort();
        for name in names {
            let _ = writeln!(prompt, "--- FILE: {name} ---\n{}", request.files[name]);
        }

        prompt.push_str(
            "\nRESPONSE FORMAT:\n\
             A JSON object with \"is_valid\" (boolean), \"errors\", \"warnings\" and \
             \"suggestions\" (lists of strings). Be specific and cite file names or \
             snippets where relevant.\n",
        );
        prompt
    }
}

fn push_history(prompt: &mut String, history: &[ConversationMessage]) {
    if history.is_empty() {
        return;
    }

    prompt.push_str("CONVERSATION CONTEXT:\n");
    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
    for message in recent {
        let _ = writeln!(
            prompt,
            "{}: {}",
            message.role.as_str().to_uppercase(),
            preview(&message.content, MESSAGE_PREVIEW_CHARS)
        );
    }
    prompt.push('\n');
}

/// First `max_chars` characters, with an ellipsis if anything was cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
