use futures::StreamExt;
use futures::stream;
use parking_lot::Mutex;
use rumo_rs::app::{Conversation, MenuAction, MenuOutcome, MessageRole, SendOutcome};
use rumo_rs::chat::{ChatBackend, ChatConfig, ChatService, ChunkStream};
use rumo_rs::prompts::{CHAT_FAILURE_MESSAGE, DEFAULT_ATTACHMENT_PROMPT, WELCOME_MESSAGE_ID};
use rumo_rs::protocol::chat::{GenerateContentRequest, GenerateContentResponse};
use rumo_rs::transport::BoxFuture;
use rumo_rs::{ApiError, Attachment, Error, Result, Sampling};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

enum Step {
    Reply(Vec<Result<GenerateContentResponse>>),
    Reject(Error),
    /// Yields its chunks, then never finishes.
    Stall(Vec<Result<GenerateContentResponse>>),
}

#[derive(Default)]
struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl ScriptedBackend {
    fn reply(&self, fragments: &[&str]) {
        let chunks = fragments.iter().map(|t| Ok(chunk(t))).collect();
        self.steps.lock().push_back(Step::Reply(chunks));
    }

    fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().clone()
    }
}

impl ChatBackend for ScriptedBackend {
    fn stream_generate(
        &self,
        _model: &str,
        request: GenerateContentRequest,
    ) -> BoxFuture<'_, Result<ChunkStream>> {
        self.requests.lock().push(request);
        let step = self.steps.lock().pop_front();
        Box::pin(async move {
            match step {
                Some(Step::Reply(chunks)) => Ok(stream::iter(chunks).boxed()),
                Some(Step::Reject(err)) => Err(err),
                Some(Step::Stall(chunks)) => {
                    Ok(stream::iter(chunks).chain(stream::pending()).boxed())
                }
                None => Ok(stream::empty().boxed()),
            }
        })
    }
}

fn chunk(text: &str) -> GenerateContentResponse {
    serde_json::from_value(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
    .expect("valid chunk")
}

fn unavailable() -> Error {
    Error::Api(ApiError {
        code: 503,
        message: "overloaded".to_string(),
        status: Some("UNAVAILABLE".to_string()),
    })
}

fn conversation(backend: &Arc<ScriptedBackend>) -> Conversation {
    let config = ChatConfig {
        model: "gemini-test".to_string(),
        system_instruction: "És o assistente.".to_string(),
        sampling: Sampling::default(),
    };
    Conversation::new(ChatService::new(Arc::clone(backend) as Arc<dyn ChatBackend>, config))
}

#[tokio::test]
async fn reply_streams_into_transcript() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.reply(&["O Rumo ", "és ", "Tu!"]);
    let mut conv = conversation(&backend);

    let mut seen = Vec::new();
    let outcome = conv
        .send("Olá", None, |c| {
            let last = c.transcript().last().expect("transcript not empty");
            seen.push((last.text.clone(), last.streaming, c.is_loading()));
        })
        .await;

    let SendOutcome::Replied { reply_id } = outcome else {
        panic!("unexpected {outcome:?}");
    };
    let messages = conv.transcript().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].id, WELCOME_MESSAGE_ID);
    assert_eq!(messages[1].role, MessageRole::User);
    assert_eq!(messages[2].id, reply_id);
    assert_eq!(messages[2].text, "O Rumo és Tu!");
    assert!(!messages[2].streaming);
    assert!(!conv.is_loading());

    assert_eq!(seen.first(), Some(&(String::new(), true, true)));
    assert!(seen.contains(&("O Rumo és ".to_string(), true, true)));
    assert_eq!(seen.last(), Some(&("O Rumo és Tu!".to_string(), false, false)));
}

#[tokio::test]
async fn follow_up_carries_history() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.reply(&["Primeira."]);
    backend.reply(&["Segunda."]);
    let mut conv = conversation(&backend);

    conv.send("um", None, |_| {}).await;
    conv.send("dois", None, |_| {}).await;

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].contents.len(), 1);
    assert_eq!(requests[1].contents.len(), 3);
    assert_eq!(requests[1].contents[1].parts[0].text.as_deref(), Some("Primeira."));
}

#[tokio::test]
async fn rejected_request_appends_fallback_and_resets_session() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.reply(&["Olá!"]);
    backend.steps.lock().push_back(Step::Reject(unavailable()));
    backend.reply(&["De novo."]);
    let mut conv = conversation(&backend);

    conv.send("um", None, |_| {}).await;
    let outcome = conv.send("dois", None, |_| {}).await;
    assert!(matches!(outcome, SendOutcome::Failed { error: Error::Api(_) }));

    let messages = conv.transcript().messages();
    let last = messages.last().expect("fallback");
    assert_eq!(last.text, CHAT_FAILURE_MESSAGE);
    assert!(messages.iter().all(|m| !m.text.is_empty()));
    assert_eq!(messages.len(), 5);
    assert!(conv.chat().current_session().is_none());

    conv.send("três", None, |_| {}).await;
    assert_eq!(backend.requests()[2].contents.len(), 1);
}

#[tokio::test]
async fn mid_stream_failure_keeps_partial_reply() {
    let backend = Arc::new(ScriptedBackend::default());
    backend
        .steps
        .lock()
        .push_back(Step::Reply(vec![Ok(chunk("Os 5 Azimutes")), Err(Error::ConnectionClosed)]));
    let mut conv = conversation(&backend);

    let outcome = conv.send("propostas", None, |_| {}).await;
    assert!(matches!(outcome, SendOutcome::Failed { .. }));

    let messages = conv.transcript().messages();
    assert_eq!(messages[2].text, "Os 5 Azimutes");
    assert!(!messages[2].streaming);
    assert_eq!(messages[3].text, CHAT_FAILURE_MESSAGE);
}

#[tokio::test]
async fn blank_text_without_attachment_is_ignored() {
    let backend = Arc::new(ScriptedBackend::default());
    let mut conv = conversation(&backend);

    let outcome = conv.send("   ", None, |_| panic!("no transcript change")).await;
    assert!(matches!(outcome, SendOutcome::Ignored));
    assert_eq!(conv.transcript().len(), 1);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn attachment_alone_uses_default_prompt() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.reply(&["Bonita foto!"]);
    let mut conv = conversation(&backend);

    let attachment = Attachment::from_bytes("image/png", &[0x89, 0x50]).expect("png");
    conv.send("", Some(attachment.clone()), |_| {}).await;

    assert_eq!(conv.transcript().messages()[1].attachment.as_ref(), Some(&attachment));
    let requests = backend.requests();
    let parts = &requests[0].contents[0].parts;
    assert_eq!(parts[0].text.as_deref(), Some(DEFAULT_ATTACHMENT_PROMPT));
    let blob = parts[1].inline_data.as_ref().expect("inline data");
    assert_eq!(blob.mime_type, "image/png");
    assert_eq!(blob.data, "iVA=");
}

#[tokio::test]
async fn unsupported_file_leaves_transcript_untouched() {
    let backend = Arc::new(ScriptedBackend::default());
    let mut conv = conversation(&backend);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notas.txt");
    std::fs::write(&path, "texto").expect("write");

    let err = conv.send_file("lê isto", &path, |_| {}).await.unwrap_err();
    assert!(matches!(err, Error::Attachment(_)));
    assert_eq!(conv.transcript().len(), 1);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn menu_actions() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.reply(&["Cinco azimutes."]);
    let mut conv = conversation(&backend);

    let outcome = conv.activate(MenuAction::Ask("Quais são os vossos 5 Azimutes?"), |_| {}).await;
    assert!(matches!(outcome, MenuOutcome::Sent(SendOutcome::Replied { .. })));
    assert_eq!(conv.transcript().len(), 3);

    let outcome = conv.activate(MenuAction::OpenLink("https://example.org"), |_| {}).await;
    assert!(matches!(outcome, MenuOutcome::OpenLink("https://example.org")));

    let outcome = conv.activate(MenuAction::Reset, |_| {}).await;
    assert!(matches!(outcome, MenuOutcome::Reset));
    assert_eq!(conv.transcript().len(), 1);
    assert!(conv.chat().current_session().is_none());
}

#[tokio::test]
async fn cancelled_send_does_not_leave_loading_stuck() {
    let backend = Arc::new(ScriptedBackend::default());
    backend.steps.lock().push_back(Step::Stall(vec![Ok(chunk("Meia resposta"))]));
    backend.reply(&["Completa."]);
    let mut conv = conversation(&backend);

    let cancelled =
        tokio::time::timeout(Duration::from_millis(20), conv.send("um", None, |_| {})).await;
    assert!(cancelled.is_err());
    assert!(conv.is_loading());
    assert!(conv.transcript().last().expect("reply").streaming);

    let outcome = conv.send("dois", None, |_| {}).await;
    assert!(matches!(outcome, SendOutcome::Replied { .. }));
    assert!(!conv.is_loading());
    let messages = conv.transcript().messages();
    assert_eq!(messages[2].text, "Meia resposta");
    assert!(messages.iter().all(|m| !m.streaming));
    assert_eq!(messages.last().expect("reply").text, "Completa.");
}
