use clipflow_core::{
    AsyncProcessingHandler, BufferError, Language, MemorySink, Provider, WorkingBuffer,
};
use clipflow_providers::{HttpTranslator, ProviderError, ProviderKind, TranslatorConfig};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_config(server: &MockServer) -> TranslatorConfig {
    TranslatorConfig {
        endpoint: server.uri(),
        ..Default::default()
    }
}

fn translator(server: &MockServer, kind: ProviderKind) -> HttpTranslator {
    HttpTranslator::new(kind, Language::English, Language::Chinese, mock_config(server)).unwrap()
}

// ── Provider kinds ──────────────────────────────────────────────

#[test]
fn chinese_target_codes_per_service() {
    let zh = Language::Chinese;
    assert_eq!(ProviderKind::Google.target_code(&zh), "zh-CN");
    assert_eq!(ProviderKind::Bing.target_code(&zh), "zh-Hans");
    assert_eq!(ProviderKind::Baidu.target_code(&zh), "zh");
    assert_eq!(ProviderKind::Tencent.target_code(&zh), "zh");
}

#[test]
fn non_chinese_targets_become_english() {
    for kind in ProviderKind::ALL {
        assert_eq!(kind.target_code(&Language::English), "en");
        assert_eq!(kind.target_code(&Language::from("ja")), "en");
    }
}

#[test]
fn kinds_parse_by_name() {
    assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
    assert_eq!(" Bing ".parse::<ProviderKind>().unwrap(), ProviderKind::Bing);
    assert_eq!(ProviderKind::Tencent.to_string(), "tencent");
    assert!(matches!(
        "deepl".parse::<ProviderKind>(),
        Err(ProviderError::UnknownProvider(ref n)) if n == "deepl"
    ));
}

#[test]
fn config_defaults_and_kebab_case() {
    let cfg = TranslatorConfig::default();
    assert_eq!(cfg.endpoint, "http://localhost:5000");
    assert_eq!(cfg.timeout_secs, 30);
    assert!(cfg.api_key.is_none());

    let parsed: TranslatorConfig =
        serde_json::from_str(r#"{"api-key": "secret", "timeout-secs": 5}"#).unwrap();
    assert_eq!(parsed.api_key.as_deref(), Some("secret"));
    assert_eq!(parsed.timeout_secs, 5);
    assert_eq!(parsed.endpoint, "http://localhost:5000");
}

// ── Requests ────────────────────────────────────────────────────

#[tokio::test]
async fn translate_posts_libretranslate_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_json(serde_json::json!({
            "q": "good morning",
            "source": "en",
            "target": "zh-Hans",
            "format": "text"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translatedText": "早上好"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let translator = translator(&server, ProviderKind::Bing);
    assert_eq!(translator.translate("good morning").await.unwrap(), "早上好");
}

#[tokio::test]
async fn api_key_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_json(serde_json::json!({
            "q": "hi",
            "source": "en",
            "target": "zh-CN",
            "format": "text",
            "api_key": "k-123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translatedText": "嗨"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = TranslatorConfig {
        api_key: Some("k-123".into()),
        ..mock_config(&server)
    };
    let translator =
        HttpTranslator::new(ProviderKind::Google, Language::English, Language::Chinese, config)
            .unwrap();
    assert_eq!(translator.translate("hi").await.unwrap(), "嗨");
}

#[tokio::test]
async fn trailing_slash_on_endpoint_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translatedText": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = TranslatorConfig {
        endpoint: format!("{}/", server.uri()),
        ..Default::default()
    };
    let translator =
        HttpTranslator::new(ProviderKind::Baidu, Language::English, Language::Chinese, config)
            .unwrap();
    assert_eq!(translator.translate("ok").await.unwrap(), "ok");
}

// ── Error mapping ───────────────────────────────────────────────

#[tokio::test]
async fn non_success_status_is_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid target"))
        .mount(&server)
        .await;

    let err = translator(&server, ProviderKind::Google).translate("x").await.unwrap_err();
    assert!(err.is_rejected());
    assert!(matches!(
        err,
        ProviderError::Status { status: 400, ref body } if body == "invalid target"
    ));
}

#[tokio::test]
async fn server_error_is_not_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = translator(&server, ProviderKind::Google).translate("x").await.unwrap_err();
    assert!(!err.is_rejected());
    assert!(matches!(err, ProviderError::Status { status: 503, .. }));
}

#[tokio::test]
async fn malformed_body_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "text": "wrong field"
        })))
        .mount(&server)
        .await;

    let err = translator(&server, ProviderKind::Google).translate("x").await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn process_maps_errors_to_processing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let translator = translator(&server, ProviderKind::Tencent);
    assert_eq!(translator.name(), "tencent");
    let err = translator.process("x").await.unwrap_err();
    assert!(matches!(err, BufferError::Processing(ref msg) if msg.contains("500")));
}

// ── Through the working buffer ──────────────────────────────────

#[tokio::test]
async fn committed_text_is_translated_into_sink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "translatedText": "你好世界"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(translator(&server, ProviderKind::Google));
    let handler = Arc::new(AsyncProcessingHandler::on_current_runtime(provider).unwrap());
    let sink = Arc::new(MemorySink::new());

    let mut buffer = WorkingBuffer::for_source(&Language::English);
    buffer.register_sink("memory", sink.clone()).unwrap();
    buffer.register_commit_handler("google", handler.clone()).unwrap();

    buffer.push("hello\n").unwrap();
    buffer.push("world").unwrap();
    buffer.commit().unwrap();
    handler.flush().await;

    assert_eq!(sink.entries(), vec!["你好世界"]);
}

#[tokio::test]
async fn failed_translation_reaches_no_sink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let provider = Arc::new(translator(&server, ProviderKind::Google));
    let handler = Arc::new(AsyncProcessingHandler::on_current_runtime(provider).unwrap());
    let mut failures = handler.subscribe_failures();
    let sink = Arc::new(MemorySink::new());

    let mut buffer = WorkingBuffer::new();
    buffer.register_sink("memory", sink.clone()).unwrap();
    buffer.register_commit_handler("google", handler.clone()).unwrap();

    buffer.push("lost").unwrap();
    let id = buffer.commit().unwrap().unwrap();
    handler.flush().await;

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.commit_id, id);
    assert_eq!(failure.provider, "google");
    assert!(buffer.is_empty());
    assert_eq!(sink.append_count(), 0);
}
