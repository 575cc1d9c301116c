use clipflow_cli::{App, AppConfig, CliError, FILE_SINK, PASSTHROUGH_PROVIDER, SCREEN_SINK};
use clipflow_core::{BufferState, Language};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A writer whose output stays readable after the app took ownership.
#[derive(Clone, Default)]
struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn passthrough_config() -> AppConfig {
    AppConfig {
        translation_provider: PASSTHROUGH_PROVIDER.to_string(),
        ..Default::default()
    }
}

fn passthrough_app(config: &AppConfig) -> (App, SharedOutput) {
    let out = SharedOutput::default();
    let app = App::build_with_screen(config, out.clone()).unwrap();
    (app, out)
}

async fn run_script(app: &mut App, script: &str) {
    app.run(script.as_bytes()).await.unwrap();
}

// ── Wiring ───────────────────────────────────────────────────────

#[test]
fn screen_sink_by_default_and_file_sink_on_request() {
    let dir = TempDir::new().unwrap();
    let (app, _) = passthrough_app(&passthrough_config());
    assert_eq!(app.buffer().sink_names(), vec![SCREEN_SINK]);
    assert_eq!(app.buffer().commit_handler_names(), vec![PASSTHROUGH_PROVIDER]);

    let config = AppConfig {
        no_result_to_screen: true,
        output_file: Some(dir.path().join("out.txt")),
        ..passthrough_config()
    };
    let (app, _) = passthrough_app(&config);
    assert_eq!(app.buffer().sink_names(), vec![FILE_SINK]);
}

#[test]
fn source_language_picks_filter_preset() {
    let config = AppConfig {
        source_language: Language::Chinese,
        ..passthrough_config()
    };
    let (app, _) = passthrough_app(&config);
    assert_eq!(app.buffer().filters().names(), vec!["remove_white_space", "remove_line_break"]);
}

#[test]
fn unknown_provider_fails_setup() {
    let config = AppConfig {
        translation_provider: "deepl".into(),
        ..Default::default()
    };
    let err = App::build_with_screen(&config, SharedOutput::default()).unwrap_err();
    assert!(matches!(err, CliError::Provider(_)));
}

#[test]
fn translator_needs_a_runtime() {
    let err = App::build_with_screen(&AppConfig::default(), SharedOutput::default()).unwrap_err();
    assert!(matches!(err, CliError::Buffer(_)));
}

#[test]
fn bad_key_binding_fails_setup() {
    let config = AppConfig {
        key_bindings: BTreeMap::from([("paste".to_string(), "v".to_string())]),
        ..passthrough_config()
    };
    let err = App::build_with_screen(&config, SharedOutput::default()).unwrap_err();
    assert!(matches!(err, CliError::UnknownBinding(_)));
}

// ── Trigger loop ─────────────────────────────────────────────────

#[tokio::test]
async fn push_commit_prints_filtered_result() {
    let (mut app, out) = passthrough_app(&passthrough_config());

    run_script(&mut app, "push_to_buffer The end\\nof a line.\npush Next\ncommit\n").await;

    assert_eq!(out.text(), "The end of a line. Next\n");
    assert_eq!(app.buffer().state(), BufferState::Empty);
}

#[tokio::test]
async fn pop_and_revert_through_the_loop() {
    let (mut app, out) = passthrough_app(&passthrough_config());

    run_script(
        &mut app,
        "push keep \npush drop\npop_buffer\ncommit\nrevert\nrevert\n",
    )
    .await;

    assert_eq!(out.text(), "keep \nRevert last output: keep \n");
}

#[tokio::test]
async fn bad_lines_are_skipped() {
    let (mut app, out) = passthrough_app(&passthrough_config());

    run_script(&mut app, "paste\n\n   \npush ok\ncommit\n").await;

    assert_eq!(out.text(), "ok\n");
}

#[tokio::test]
async fn key_bindings_map_tokens_to_signals() {
    let config = AppConfig {
        key_bindings: BTreeMap::from([
            ("push_to_buffer".to_string(), "+".to_string()),
            ("commit".to_string(), "!".to_string()),
        ]),
        ..passthrough_config()
    };
    let (mut app, out) = passthrough_app(&config);

    run_script(&mut app, "+ bound\n!\n").await;

    assert_eq!(out.text(), "bound\n");
}

#[tokio::test]
async fn results_and_reverts_reach_the_output_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("out.txt");
    let config = AppConfig {
        output_file: Some(file.clone()),
        ..passthrough_config()
    };
    let (mut app, _) = passthrough_app(&config);

    run_script(&mut app, "push one\ncommit\npush two\ncommit\nrevert\n").await;

    assert_eq!(fs::read_to_string(&file).unwrap(), "one\n");
}

#[tokio::test]
async fn translated_results_are_flushed_before_exit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "translatedText": "你好" }))
                .set_delay(std::time::Duration::from_millis(50)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut config = AppConfig::default();
    config.translator.endpoint = server.uri();
    let out = SharedOutput::default();
    let mut app = App::build_with_screen(&config, out.clone()).unwrap();

    run_script(&mut app, "push hello\ncommit\npush again\ncommit\n").await;

    assert_eq!(out.text(), "你好\n你好\n");
}

// ── Config file ──────────────────────────────────────────────────

#[test]
fn missing_config_file_means_defaults() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_or_default(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn config_file_is_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "source-language": "zh",
            "translation-provider": "bing",
            "output-file": "results.txt",
            "translator": { "endpoint": "http://mt.local" },
            "key-bindings": { "revert": "u" }
        }"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.source_language, Language::Chinese);
    assert_eq!(config.translation_provider, "bing");
    assert_eq!(config.output_file.as_deref(), Some(std::path::Path::new("results.txt")));
    assert_eq!(config.translator.endpoint, "http://mt.local");
    assert_eq!(config.translator.timeout_secs, 30);
    assert_eq!(config.key_bindings.get("revert").map(String::as_str), Some("u"));
}

#[tokio::test]
async fn provider_name_in_config_file_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "translation-provider": "Passthrough" }"#).unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.translation_provider, PASSTHROUGH_PROVIDER);

    let out = SharedOutput::default();
    let mut app = App::build_with_screen(&config, out.clone()).unwrap();
    assert_eq!(app.buffer().commit_handler_names(), vec![PASSTHROUGH_PROVIDER]);
    run_script(&mut app, "push same\ncommit\n").await;
    assert_eq!(out.text(), "same\n");
}

#[test]
fn malformed_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(AppConfig::load_or_default(&path), Err(CliError::ParseConfig { .. })));
}
