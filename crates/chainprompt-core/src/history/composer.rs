use crate::history::resolver::ChainEntry;
use crate::history::store::InteractionStore;
use regex::Regex;
use std::sync::OnceLock;

/// Matches a caller-supplied context section, including its tags.
fn rag_region() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<RAG>[\s\S]*?</RAG>").expect("valid regex"))
}

/// Renders a resolved chain plus a new prompt into the final provider-bound
/// string.
///
/// Stored prompt/response values are never normalized; only the composed
/// output is.
pub struct PromptComposer;

impl PromptComposer {
    /// Build the final prompt. With an empty chain this is just the cleaned,
    /// normalized caller prompt; otherwise the chain is rendered as tagged
    /// blocks inside a `<RAG>` section ahead of the prompt.
    pub fn compose(chain: &[ChainEntry], prompt: &str) -> String {
        // Callers must not smuggle a fake context section of their own.
        let cleaned = rag_region().replace_all(prompt, "");

        if chain.is_empty() {
            return normalize_whitespace(&cleaned);
        }

        let blocks: Vec<String> = chain.iter().map(|entry| tagged_block(entry)).collect();
        let composed = format!(
            "<RAG>\n{}\n</RAG>\n========\nPROMPT\n========\n{}",
            blocks.join("\n"),
            cleaned,
        );
        normalize_whitespace(&composed)
    }

    /// Tagged-block rendering of the latest interaction per name, for
    /// embedding in external prompts. Non-recursive: `history_refs` of the
    /// found interactions are not followed.
    pub fn formatted_responses(store: &InteractionStore, names: &[String]) -> String {
        let mut seen = std::collections::HashSet::new();
        let mut blocks = Vec::new();
        for name in names {
            if !seen.insert(name.as_str()) {
                continue;
            }
            if let Some(latest) = store.latest(name) {
                blocks.push(normalize_whitespace(&tagged_block(&ChainEntry {
                    prompt: latest.prompt,
                    response: latest.response,
                })));
            }
        }
        blocks.join("\n")
    }
}

fn tagged_block(entry: &ChainEntry) -> String {
    format!(
        "<prompt:{prompt}>{response}</prompt:{prompt}>",
        prompt = entry.prompt,
        response = entry.response,
    )
}

/// Collapse runs of whitespace within each line to a single space and re-join
/// with single newlines. Blank lines survive as empty lines.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}
