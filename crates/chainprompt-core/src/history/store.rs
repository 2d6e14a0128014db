use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// One recorded prompt/response exchange. Immutable once stored: the store
/// only ever hands out clones, never references into its own ledger.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Interaction {
    /// Globally unique, strictly increasing in insertion order.
    pub sequence_number: u64,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied key, stored as supplied. When `None`, the prompt text
    /// itself acts as the key in the store.
    pub prompt_name: Option<String>,
    /// The final composed prompt as sent to the provider.
    pub prompt: String,
    pub response: String,
    /// Prompt names this interaction depended on when it was composed.
    pub history_refs: Vec<String>,
}

impl Interaction {
    /// The key this interaction is filed under.
    pub fn effective_name(&self) -> &str {
        self.prompt_name.as_deref().unwrap_or(&self.prompt)
    }

    /// Export record: every field plus a derived ISO-8601 `datetime` string.
    /// For inspection and debugging, not a reload format.
    pub fn to_json(&self) -> Value {
        json!({
            "sequence_number": self.sequence_number,
            "model": self.model,
            "timestamp": self.timestamp.timestamp_millis() as f64 / 1000.0,
            "prompt_name": self.prompt_name,
            "prompt": self.prompt,
            "response": self.response,
            "history_refs": self.history_refs,
            "datetime": self.timestamp.to_rfc3339(),
        })
    }
}

/// Append-only ledger of interactions keyed by prompt name.
///
/// Multiple interactions may share a name; per-name order is insertion order
/// and is never rewritten. Sequence numbers are assigned here and define the
/// global total order across all names.
#[derive(Debug, Default)]
pub struct InteractionStore {
    /// All interactions in sequence order.
    ledger: Vec<Interaction>,
    /// Effective name -> indices into `ledger`, in insertion order.
    by_name: HashMap<String, Vec<usize>>,
    /// Names in order of first appearance.
    name_order: Vec<String>,
    next_sequence: u64,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new interaction and return a copy of the stored record.
    pub fn add(
        &mut self,
        model: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
        prompt_name: Option<String>,
        history_refs: Vec<String>,
    ) -> Interaction {
        self.push(Interaction {
            sequence_number: 0, // stamped in push
            model: model.into(),
            timestamp: Utc::now(),
            prompt_name,
            prompt: prompt.into(),
            response: response.into(),
            history_refs,
        })
    }

    /// Append a fully formed record, stamping the next sequence number.
    fn push(&mut self, mut interaction: Interaction) -> Interaction {
        self.next_sequence += 1;
        interaction.sequence_number = self.next_sequence;
        let name = interaction.effective_name().to_string();
        let index = self.ledger.len();
        self.ledger.push(interaction.clone());
        match self.by_name.get_mut(&name) {
            Some(indices) => indices.push(index),
            None => {
                self.by_name.insert(name.clone(), vec![index]);
                self.name_order.push(name);
            }
        }
        interaction
    }

    /// Most recent interaction for a name, or `None` if the name has never
    /// been used. Never an error.
    pub fn latest(&self, name: &str) -> Option<Interaction> {
        self.by_name
            .get(name)
            .and_then(|indices| indices.last())
            .map(|&i| self.ledger[i].clone())
    }

    /// Every interaction recorded under `name`, in insertion order. Empty for
    /// unknown names.
    pub fn interactions_for(&self, name: &str) -> Vec<Interaction> {
        self.by_name
            .get(name)
            .map(|indices| indices.iter().map(|&i| self.ledger[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Interactions for a name further filtered by model.
    pub fn interactions_for_model(&self, model: &str, name: &str) -> Vec<Interaction> {
        self.interactions_for(name)
            .into_iter()
            .filter(|i| i.model == model)
            .collect()
    }

    /// All interactions across all names, sorted by sequence number.
    pub fn all_interactions(&self) -> Vec<Interaction> {
        self.ledger.clone()
    }

    /// All prompt names in order of first appearance.
    pub fn prompt_names(&self) -> Vec<String> {
        self.name_order.clone()
    }

    /// How many interactions each name holds.
    pub fn usage_stats(&self) -> HashMap<String, usize> {
        self.by_name
            .iter()
            .map(|(name, indices)| (name.clone(), indices.len()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Absorb every record from `other`. The result carries one consistent
    /// numbering: this store's entries first, then `other`'s, each re-stamped
    /// while keeping its original relative order and every other field value.
    pub fn merge(&mut self, other: &InteractionStore) {
        for interaction in &other.ledger {
            self.push(interaction.clone());
        }
    }

    /// Whole history as JSON keyed by effective prompt name, each value the
    /// ordered list of export records for that name.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for name in &self.name_order {
            let records: Vec<Value> = self
                .interactions_for(name)
                .iter()
                .map(Interaction::to_json)
                .collect();
            map.insert(name.clone(), Value::Array(records));
        }
        Value::Object(map)
    }
}
