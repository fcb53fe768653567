//! Telegram Bot API client against a mocked server.

use std::time::Duration;

use ghverify_bot::commands::telegram_command_specs;
use ghverify_bot::notify::Notifier;
use ghverify_bot::telegram::{InlineKeyboardMarkup, TelegramClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:abc";

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(TOKEN.to_string())
        .with_base_url(format!("{}/", server.uri()))
        .with_timeout(Duration::from_secs(5))
}

fn sent_message() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": true,
        "result": {"message_id": 5, "chat": {"id": 7, "type": "private"}, "text": "hi"}
    }))
}

#[tokio::test]
async fn send_message_with_url_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_json(json!({
            "chat_id": 7,
            "text": "Tap below",
            "reply_markup": {
                "inline_keyboard": [[{"text": "Verify on GitHub", "url": "https://github.com/login/oauth/authorize?state=s"}]]
            }
        })))
        .respond_with(sent_message())
        .expect(1)
        .mount(&server)
        .await;

    let keyboard = InlineKeyboardMarkup::url_button(
        "Verify on GitHub",
        "https://github.com/login/oauth/authorize?state=s",
    );
    client(&server)
        .send_message(7, "Tap below", Some(&keyboard))
        .await
        .unwrap();
}

#[tokio::test]
async fn notifier_sends_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .and(body_json(json!({"chat_id": 7, "text": "✅ done"})))
        .respond_with(sent_message())
        .expect(1)
        .mount(&server)
        .await;

    client(&server).notify(7, "✅ done").await.unwrap();
}

#[tokio::test]
async fn api_errors_surface_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .send_message(7, "hi", None)
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("bot was blocked by the user"), "{message}");
    assert!(!message.contains(TOKEN));
}

#[tokio::test]
async fn get_updates_decodes_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getUpdates")))
        .and(body_json(json!({"offset": 41, "timeout": 0, "allowed_updates": ["message"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                {
                    "update_id": 41,
                    "message": {
                        "message_id": 1,
                        "chat": {"id": 7, "type": "private"},
                        "from": {"id": 99, "is_bot": false, "username": "someone"},
                        "text": "octocat"
                    }
                },
                {"update_id": 42}
            ]
        })))
        .mount(&server)
        .await;

    let updates = client(&server)
        .get_updates(Some(41), Duration::ZERO)
        .await
        .unwrap();
    assert_eq!(updates.len(), 2);
    let message = updates[0].message.as_ref().unwrap();
    assert_eq!(message.chat.id, 7);
    assert!(message.chat.is_private());
    assert!(!message.is_from_bot());
    assert_eq!(message.text.as_deref(), Some("octocat"));
    assert!(updates[1].message.is_none());
}

#[tokio::test]
async fn set_my_commands_sends_command_table() {
    let server = MockServer::start().await;
    let commands = telegram_command_specs();
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/setMyCommands")))
        .and(body_json(json!({ "commands": commands })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).set_my_commands(&commands).await.unwrap();
}
