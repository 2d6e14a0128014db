use crate::history::store::InteractionStore;
use std::collections::HashSet;

/// One link of a resolved context chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub prompt: String,
    pub response: String,
}

/// Expands prompt-name references into a flat, ordered, deduplicated context
/// chain.
///
/// Resolution is depth-first and pre-order: when an interaction itself
/// declares `history_refs`, those ancestors are resolved before the
/// interaction's own entry is appended. A single `visited` set spans the
/// whole resolution, so a name is expanded at most once anywhere in the
/// chain and cyclic references terminate.
pub struct ChainResolver;

impl ChainResolver {
    /// Resolve `refs` against the store's latest interaction per name.
    ///
    /// Unknown or never-used names contribute nothing; they are not errors.
    /// An empty input yields an empty chain.
    pub fn resolve(store: &InteractionStore, refs: &[String]) -> Vec<ChainEntry> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        Self::collect(store, refs, &mut visited, &mut chain);
        chain
    }

    fn collect(
        store: &InteractionStore,
        refs: &[String],
        visited: &mut HashSet<String>,
        chain: &mut Vec<ChainEntry>,
    ) {
        for name in refs {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(latest) = store.latest(name) else {
                tracing::debug!(name = %name, "history ref has no interaction, skipping");
                continue;
            };
            if !latest.history_refs.is_empty() {
                Self::collect(store, &latest.history_refs, visited, chain);
            }
            chain.push(ChainEntry {
                prompt: latest.prompt,
                response: latest.response,
            });
        }
    }
}
