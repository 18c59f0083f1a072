use super::*;
use funil_core::message::{Attachment, AttachmentType, IncomingMessage, OutgoingMessage};
use funil_core::traits::Channel;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(base_url: &str) -> WhatsAppConfig {
    WhatsAppConfig {
        enabled: true,
        access_token: "EAAG-test".into(),
        phone_number_id: "1099".into(),
        verify_token: "verify-me".into(),
        base_url: base_url.to_string(),
        ..Default::default()
    }
}

fn payload(messages: serde_json::Value) -> WebhookPayload {
    serde_json::from_value(json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {"display_phone_number": "5511000000000", "phone_number_id": "1099"},
                    "contacts": [{"profile": {"name": "Maria"}, "wa_id": "5511988887777"}],
                    "messages": messages
                }
            }]
        }]
    }))
    .unwrap()
}

#[test]
fn test_normalize_phone() {
    assert_eq!(normalize_phone("5511988887777@c.us"), "5511988887777");
    assert_eq!(normalize_phone("5511988887777@s.whatsapp.net"), "5511988887777");
    assert_eq!(normalize_phone("+55 (11) 98888-7777"), "5511988887777");
    assert_eq!(normalize_phone("abc"), "");
}

#[test]
fn test_verify_webhook() {
    let ch = WhatsAppCloudChannel::new(config("http://unused"));
    assert_eq!(
        ch.verify_webhook("subscribe", "verify-me", "12345"),
        Some("12345".to_string())
    );
    assert!(ch.verify_webhook("subscribe", "wrong", "12345").is_none());
    assert!(ch.verify_webhook("unsubscribe", "verify-me", "12345").is_none());
}

#[test]
fn test_verify_webhook_rejects_when_token_unset() {
    let ch = WhatsAppCloudChannel::new(WhatsAppConfig::default());
    assert!(ch.verify_webhook("subscribe", "", "1").is_none());
}

#[test]
fn test_extract_text_message() {
    let p = payload(json!([{
        "from": "5511988887777", "id": "wamid.1", "timestamp": "1767225600",
        "type": "text", "text": {"body": "quero saber sobre hemogotas"}
    }]));
    let msgs = extract_messages(&p, &[]);
    assert_eq!(msgs.len(), 1);
    let m = &msgs[0];
    assert_eq!(m.channel, "whatsapp");
    assert_eq!(m.sender_id, "5511988887777");
    assert_eq!(m.sender_name.as_deref(), Some("Maria"));
    assert_eq!(m.text, "quero saber sobre hemogotas");
    assert_eq!(m.reply_target.as_deref(), Some("5511988887777"));
    assert_eq!(m.platform_id.as_deref(), Some("wamid.1"));
    assert_eq!(m.timestamp.timestamp(), 1_767_225_600);
    assert!(!m.has_media());
}

#[test]
fn test_extract_media_messages() {
    let p = payload(json!([
        {"from": "5511988887777", "id": "a", "timestamp": "1", "type": "audio",
         "audio": {"id": "MEDIA_A", "mime_type": "audio/ogg; codecs=opus"}},
        {"from": "5511988887777", "id": "b", "timestamp": "1", "type": "image",
         "image": {"id": "MEDIA_B", "mime_type": "image/jpeg", "caption": "o que é isso?"}},
        {"from": "5511988887777", "id": "c", "timestamp": "1", "type": "location",
         "location": {"latitude": -23.5, "longitude": -46.6}}
    ]));
    let msgs = extract_messages(&p, &[]);
    assert_eq!(msgs.len(), 3);

    let audio = &msgs[0].attachments[0];
    assert_eq!(audio.file_type, AttachmentType::Audio);
    assert_eq!(audio.media_id.as_deref(), Some("MEDIA_A"));

    assert_eq!(msgs[1].text, "o que é isso?");
    assert_eq!(msgs[1].attachments[0].file_type, AttachmentType::Image);

    assert_eq!(msgs[2].attachments[0].file_type, AttachmentType::Other);
    assert!(msgs[2].attachments[0].media_id.is_none());
}

#[test]
fn test_extract_filters_statuses_reactions_and_unauthorized() {
    let p = payload(json!([
        {"from": "5511988887777", "id": "r", "timestamp": "1", "type": "reaction",
         "reaction": {"message_id": "x", "emoji": "👍"}},
        {"from": "5511977776666", "id": "t", "timestamp": "1", "type": "text",
         "text": {"body": "oi"}}
    ]));
    assert_eq!(extract_messages(&p, &[]).len(), 1);
    assert!(extract_messages(&p, &["+55 11 98888-7777".to_string()]).is_empty());

    let status_only: WebhookPayload = serde_json::from_value(json!({
        "object": "whatsapp_business_account",
        "entry": [{"id": "W", "changes": [{"field": "messages", "value": {
            "messaging_product": "whatsapp",
            "statuses": [{"id": "wamid.1", "status": "delivered"}]
        }}]}]
    }))
    .unwrap();
    assert!(extract_messages(&status_only, &[]).is_empty());
}

#[tokio::test]
async fn test_ingest_requires_start_and_forwards() {
    let ch = WhatsAppCloudChannel::new(config("http://unused"));
    let p = payload(json!([{
        "from": "5511988887777", "id": "1", "timestamp": "1", "type": "text",
        "text": {"body": "oi"}
    }]));
    assert!(ch.ingest(&p).await.is_err());

    let mut rx = ch.start().await.unwrap();
    assert_eq!(ch.ingest(&p).await.unwrap(), 1);
    assert_eq!(rx.recv().await.unwrap().text, "oi");
}

#[tokio::test]
async fn test_send_posts_to_messages_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v18.0/1099/messages"))
        .and(header("authorization", "Bearer EAAG-test"))
        .and(body_partial_json(json!({
            "messaging_product": "whatsapp",
            "to": "5511988887777",
            "type": "text",
            "text": {"body": "Olá! 😊 Como posso te ajudar hoje?"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messaging_product": "whatsapp",
            "messages": [{"id": "wamid.out"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ch = WhatsAppCloudChannel::new(config(&server.uri()));
    ch.send(OutgoingMessage::to(
        "5511988887777@c.us",
        "Olá! 😊 Como posso te ajudar hoje?",
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn test_send_typing_marks_message_read() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v18.0/1099/messages"))
        .and(header("authorization", "Bearer EAAG-test"))
        .and(body_partial_json(json!({
            "messaging_product": "whatsapp",
            "status": "read",
            "message_id": "wamid.HBgN",
            "typing_indicator": {"type": "text"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let ch = WhatsAppCloudChannel::new(config(&server.uri()));
    let mut msg = IncomingMessage::text("whatsapp", "5511988887777", "oi");
    msg.platform_id = Some("wamid.HBgN".into());
    ch.send_typing(&msg).await.unwrap();
}

#[tokio::test]
async fn test_send_typing_without_message_id_is_noop() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ch = WhatsAppCloudChannel::new(config(&server.uri()));
    let msg = IncomingMessage::text("whatsapp", "5511988887777", "oi");
    ch.send_typing(&msg).await.unwrap();
}

#[tokio::test]
async fn test_send_typing_error_status_is_channel_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let ch = WhatsAppCloudChannel::new(config(&server.uri()));
    let mut msg = IncomingMessage::text("whatsapp", "5511988887777", "oi");
    msg.platform_id = Some("wamid.X".into());
    let err = ch.send_typing(&msg).await.unwrap_err();
    assert!(err.to_string().contains("401"), "got: {err}");
}

#[tokio::test]
async fn test_send_error_status_is_channel_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid recipient"))
        .mount(&server)
        .await;

    let ch = WhatsAppCloudChannel::new(config(&server.uri()));
    let err = ch
        .send(OutgoingMessage::to("5511988887777", "oi"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("400"), "got: {err}");
}

#[tokio::test]
async fn test_send_without_target_fails() {
    let ch = WhatsAppCloudChannel::new(config("http://unused"));
    let msg = OutgoingMessage {
        text: "x".into(),
        ..Default::default()
    };
    assert!(ch.send(msg).await.is_err());
}

#[tokio::test]
async fn test_download_media_two_step() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v18.0/MEDIA_A"))
        .and(header("authorization", "Bearer EAAG-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": format!("{}/files/MEDIA_A", server.uri()),
            "mime_type": "audio/ogg"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/MEDIA_A"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"OggS".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let ch = WhatsAppCloudChannel::new(config(&server.uri()));
    let attachment = Attachment {
        file_type: AttachmentType::Audio,
        mime_type: Some("audio/ogg".into()),
        media_id: Some("MEDIA_A".into()),
        data: None,
        filename: None,
    };
    assert_eq!(ch.download_media(&attachment).await.unwrap(), b"OggS");
}
