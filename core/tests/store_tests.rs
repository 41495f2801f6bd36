// tests/store_tests.rs

use std::time::Duration;

use checkflow::clients::multipart::{encode_related, encode_related_with_boundary};
use checkflow::{
  Attachment, CheckRecord, HttpDocumentStore, HttpOcrClient, ProcessorConfig, StoreCredentials,
};

fn sample_doc() -> checkflow::ProcessedCheck {
  let mut record = CheckRecord::parse("acct42^19.99").unwrap();
  record.merge_ocr("acct7".to_string(), "rt001".to_string());
  record.to_document().unwrap()
}

fn credentials() -> StoreCredentials {
  StoreCredentials {
    username: "svc-checks".to_string(),
    password: "hunter2".to_string(),
  }
}

fn config() -> ProcessorConfig {
  serde_json::from_value(serde_json::json!({
    "store_url": "https://couch.example.com",
    "api_base": "https://actions.example.com/api/v1",
  }))
  .unwrap()
}

#[test]
fn multipart_body_has_document_then_attachment() {
  let doc = sample_doc();
  let attachment = Attachment {
    name: "acct42^19.99",
    content_type: "image/jpeg",
    data: b"jpeg-bytes-here",
  };

  let encoded = encode_related_with_boundary(&doc, &attachment, "testboundary").unwrap();
  assert_eq!(
    encoded.content_type,
    "multipart/related; boundary=\"testboundary\""
  );

  let body = String::from_utf8(encoded.body).unwrap();
  assert!(body.starts_with("--testboundary\r\nContent-Type: application/json\r\n\r\n"));
  assert!(body.ends_with("\r\n--testboundary--\r\n"));

  // The two parts sit between the boundary markers in order.
  let parts: Vec<&str> = body.split("--testboundary").collect();
  // ["", json part, attachment part, "--\r\n"]
  assert_eq!(parts.len(), 4);
  assert!(parts[2].trim_start_matches("\r\n").trim_end_matches("\r\n") == "jpeg-bytes-here");
}

#[test]
fn multipart_document_declares_the_attachment() {
  let doc = sample_doc();
  let attachment = Attachment {
    name: "acct42^19.99",
    content_type: "image/jpeg",
    data: b"0123456789",
  };

  let encoded = encode_related_with_boundary(&doc, &attachment, "b").unwrap();
  let body = String::from_utf8(encoded.body).unwrap();
  let json_part = body
    .split("--b")
    .nth(1)
    .unwrap()
    .split("\r\n\r\n")
    .nth(1)
    .unwrap()
    .trim_end_matches("\r\n");
  let value: serde_json::Value = serde_json::from_str(json_part).unwrap();

  assert_eq!(value["_id"], "acct42^19.99");
  assert_eq!(value["fromAccount"], "acct7");
  assert_eq!(value["routingNumber"], "rt001");
  assert_eq!(value["toAccount"], "acct42");
  assert_eq!(value["amount"], "19.99");

  let stanza = &value["_attachments"]["acct42^19.99"];
  assert_eq!(stanza["follows"], true);
  assert_eq!(stanza["content_type"], "image/jpeg");
  assert_eq!(stanza["length"], 10);
}

#[test]
fn multipart_boundary_is_fresh_per_encode() {
  let doc = sample_doc();
  let attachment = Attachment {
    name: "acct42^19.99",
    content_type: "image/jpeg",
    data: b"x",
  };

  let first = encode_related(&doc, &attachment).unwrap();
  let second = encode_related(&doc, &attachment).unwrap();
  assert_ne!(first.content_type, second.content_type);
}

#[test]
fn store_urls_percent_encode_the_record_id() {
  let store = HttpDocumentStore::new(
    "https://couch.example.com/",
    "incoming-checks",
    credentials(),
    Duration::from_secs(30),
  )
  .unwrap();

  assert_eq!(
    store.attachment_url("acct42^19.99", "acct42^19.99"),
    "https://couch.example.com/incoming-checks/acct42%5E19.99/acct42%5E19.99"
  );
  assert_eq!(
    store.document_url("acct42^19.99"),
    "https://couch.example.com/incoming-checks/acct42%5E19.99"
  );
}

#[test]
fn ocr_action_url_is_fully_qualified() {
  let client = HttpOcrClient::new(&config(), credentials(), "prod-checks").unwrap();
  assert_eq!(
    client.action_url(),
    "https://actions.example.com/api/v1/namespaces/prod-checks/actions/parse-image?blocking=true"
  );
}
