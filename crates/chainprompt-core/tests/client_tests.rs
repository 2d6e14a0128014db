use chainprompt_core::error::ChainPromptError;
use chainprompt_core::{ConversationClient, GenerateOptions, InteractionStore, Provider};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted provider: echoes a canned response per call, records what it was
/// sent, and can be told to fail.
struct MockProvider {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: Arc<AtomicBool>,
    cleared: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct MockHandles {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: Arc<AtomicBool>,
    cleared: Arc<AtomicUsize>,
}

fn mock_provider() -> (Box<dyn Provider>, MockHandles) {
    let handles = MockHandles {
        sent: Arc::new(Mutex::new(Vec::new())),
        fail: Arc::new(AtomicBool::new(false)),
        cleared: Arc::new(AtomicUsize::new(0)),
    };
    let provider = MockProvider {
        sent: handles.sent.clone(),
        fail: handles.fail.clone(),
        cleared: handles.cleared.clone(),
    };
    (Box::new(provider), handles)
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    async fn send(&self, prompt: &str, model: &str) -> chainprompt_core::Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChainPromptError::Provider("simulated outage".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((prompt.to_string(), model.to_string()));
        Ok(format!("reply-{}", sent.len()))
    }

    fn clear_conversation(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

// ========================================================================
// ConversationClient (client.rs)
// ========================================================================

#[tokio::test]
async fn test_generate_records_interaction() {
    let (provider, _handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    let response = client.generate("hello there").await.unwrap();
    assert_eq!(response, "reply-1");

    let all = client.interaction_history();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].model, "mock-model");
    assert_eq!(all[0].prompt, "hello there");
    assert_eq!(all[0].response, "reply-1");
    // Unnamed calls are recorded under the original prompt text
    assert_eq!(all[0].prompt_name.as_deref(), Some("hello there"));
}

#[tokio::test]
async fn test_generate_with_model_override() {
    let (provider, handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client
        .generate_response("q", GenerateOptions::new().with_model("other-model"))
        .await
        .unwrap();

    let sent = handles.sent.lock().unwrap();
    assert_eq!(sent[0].1, "other-model");
    assert_eq!(client.interaction_history()[0].model, "other-model");
}

#[tokio::test]
async fn test_history_refs_injected_into_provider_prompt() {
    let (provider, handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client
        .generate_response("What is Rust?", GenerateOptions::new().with_prompt_name("rust"))
        .await
        .unwrap();
    client
        .generate_response(
            "Summarize the above.",
            GenerateOptions::new()
                .with_prompt_name("summary")
                .with_history_refs(vec!["rust".to_string()]),
        )
        .await
        .unwrap();

    let sent = handles.sent.lock().unwrap();
    let second_prompt = &sent[1].0;
    assert!(second_prompt.starts_with("<RAG>"));
    assert!(second_prompt.contains("<prompt:What is Rust?>reply-1</prompt:What is Rust?>"));
    assert!(second_prompt.ends_with("Summarize the above."));

    // The recorded prompt is the final composed one, with its refs
    let recorded = client.interactions_by_prompt_name("summary");
    assert_eq!(recorded.len(), 1);
    assert_eq!(&recorded[0].prompt, second_prompt);
    assert_eq!(recorded[0].history_refs, vec!["rust".to_string()]);
}

#[tokio::test]
async fn test_transitive_refs_compose_full_chain() {
    let (provider, handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client
        .generate_response("step one", GenerateOptions::new().with_prompt_name("a"))
        .await
        .unwrap();
    client
        .generate_response(
            "step two",
            GenerateOptions::new()
                .with_prompt_name("b")
                .with_history_refs(vec!["a".to_string()]),
        )
        .await
        .unwrap();
    client
        .generate_response(
            "step three",
            GenerateOptions::new()
                .with_prompt_name("c")
                .with_history_refs(vec!["b".to_string()]),
        )
        .await
        .unwrap();

    // Referencing only "b" still pulls in its ancestor "a", ancestors first
    let sent = handles.sent.lock().unwrap();
    let third = &sent[2].0;
    let a_pos = third.find("<prompt:step one>").expect("a in chain");
    let b_pos = third.find("reply-2").expect("b in chain");
    assert!(a_pos < b_pos);
}

#[tokio::test]
async fn test_failed_call_records_nothing() {
    let (provider, handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client.generate("ok").await.unwrap();
    assert_eq!(client.interaction_history().len(), 1);

    handles.fail.store(true, Ordering::SeqCst);
    let err = client.generate("will fail").await.unwrap_err();
    assert!(matches!(err, ChainPromptError::Provider(_)));

    // Failed calls never pollute history
    assert_eq!(client.interaction_history().len(), 1);
}

#[tokio::test]
async fn test_clear_conversation_keeps_history() {
    let (provider, handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client.generate("one").await.unwrap();
    client.clear_conversation();

    assert_eq!(handles.cleared.load(Ordering::SeqCst), 1);
    assert_eq!(client.interaction_history().len(), 1);
}

#[tokio::test]
async fn test_query_surface() {
    let (provider, _handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client
        .generate_response("p1", GenerateOptions::new().with_prompt_name("n1"))
        .await
        .unwrap();
    client
        .generate_response(
            "p2",
            GenerateOptions::new()
                .with_prompt_name("n1")
                .with_model("alt"),
        )
        .await
        .unwrap();
    client
        .generate_response("p3", GenerateOptions::new().with_prompt_name("n2"))
        .await
        .unwrap();

    assert_eq!(client.last_n_interactions(2).len(), 2);
    assert_eq!(client.last_n_interactions(10).len(), 3);
    assert_eq!(client.interaction(2).unwrap().prompt, "p2");
    assert!(client.interaction(99).is_none());
    assert_eq!(client.model_interactions("alt").len(), 1);
    assert_eq!(client.latest_interaction().unwrap().prompt, "p3");
    assert_eq!(client.prompt_history(), vec!["p1", "p2", "p3"]);
    assert_eq!(
        client.response_history(),
        vec!["reply-1", "reply-2", "reply-3"]
    );
    assert_eq!(client.model_usage_stats().get("mock-model"), Some(&2));
    assert_eq!(client.prompt_name_usage_stats().get("n1"), Some(&2));

    let json = client.history_json();
    assert!(json.get("n1").is_some());
    assert_eq!(json["n2"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_formatted_responses_via_client() {
    let (provider, _handles) = mock_provider();
    let mut client = ConversationClient::new(provider);

    client
        .generate_response("question", GenerateOptions::new().with_prompt_name("q"))
        .await
        .unwrap();

    let formatted = client.formatted_responses(&["q".to_string()]);
    assert_eq!(formatted, "<prompt:question>reply-1</prompt:question>");
}

#[tokio::test]
async fn test_merge_history_from_other_store() {
    let (provider, _handles) = mock_provider();
    let mut client = ConversationClient::new(provider);
    client.generate("mine").await.unwrap();

    let mut other = InteractionStore::new();
    other.add("m2", "theirs", "r", Some("imported".to_string()), Vec::new());

    client.merge_history(&other);

    let all = client.interaction_history();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].prompt, "theirs");
    assert_eq!(all[1].sequence_number, 2);

    // Merged names participate in resolution for later calls
    let formatted = client.formatted_responses(&["imported".to_string()]);
    assert_eq!(formatted, "<prompt:theirs>r</prompt:theirs>");
}
