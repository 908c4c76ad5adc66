/*
 * roundtrip.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for the full parse/generate cycle: a message is
 * parsed into the part tree, regenerated, reparsed, and the second
 * generation must be byte-identical to the first.
 *
 * Run with:
 *   cargo test --test roundtrip
 */

use plico::{Body, BodyPart, Charset, Encoding, FieldValue, MailContext, MimeError, PartPath};

fn roundtrip(ctx: &MailContext, input: &[u8]) -> (BodyPart, Vec<u8>) {
    let part = BodyPart::parse(ctx, input);
    let first = part.generate_to_vec(ctx.max_line_length());
    let reparsed = BodyPart::parse(ctx, &first);
    let second = reparsed.generate_to_vec(ctx.max_line_length());
    assert_eq!(
        second, first,
        "second generation must reproduce the first byte for byte"
    );
    assert_eq!(reparsed, part, "reparse must restore the same tree");
    (part, first)
}

#[test]
fn plain_message_idempotent() {
    let ctx = MailContext::new();
    let msg = b"From: <alice@example.org>\r\n\
                To: Bob <bob@example.net>\r\n\
                Subject: lunch?\r\n\
                Date: Wed, 1 Jan 2020 00:00:00 +0000\r\n\
                \r\n\
                Nothing fancy, just text.\r\n";
    let (part, bytes) = roundtrip(&ctx, msg);
    assert_eq!(bytes, msg);
    assert!(!part.body().is_multipart());
}

#[test]
fn nested_multipart_structure_preserved() {
    let ctx = MailContext::new();
    let msg = b"Content-Type: multipart/mixed; boundary=outer\r\n\
                \r\n\
                Mixed preamble for non-MIME readers.\r\n\
                --outer\r\n\
                Content-Type: multipart/alternative; boundary=inner\r\n\
                \r\n\
                --inner\r\n\
                Content-Type: text/plain; charset=utf-8\r\n\
                \r\n\
                plain alternative\r\n\
                --inner\r\n\
                Content-Type: text/html; charset=utf-8\r\n\
                \r\n\
                <p>html alternative</p>\r\n\
                --inner--\r\n\
                \r\n\
                --outer\r\n\
                Content-Type: application/octet-stream\r\n\
                Content-Transfer-Encoding: base64\r\n\
                \r\n\
                aGVsbG8gd29ybGQ=\r\n\
                --outer--\r\n\
                epilogue text\r\n";
    let (part, _) = roundtrip(&ctx, msg);

    assert_eq!(part.body().parts().len(), 2);
    let alternative = &part.body().parts()[0];
    assert_eq!(alternative.body().parts().len(), 2);
    match part.body() {
        Body::Multipart { prolog, epilog, .. } => {
            assert_eq!(&prolog[..], b"Mixed preamble for non-MIME readers.");
            assert_eq!(&epilog[..], b"epilogue text\r\n");
        }
        other => panic!("expected multipart, got {:?}", other),
    }

    // Leaf bodies stay transfer-encoded until extracted.
    let attachment = part
        .part_at(&PartPath::root().child(1))
        .expect("attachment part");
    match attachment.body() {
        Body::Contents { data, encoding, .. } => {
            assert_eq!(&data[..], b"aGVsbG8gd29ybGQ=");
            assert_eq!(encoding, &Encoding::base64());
        }
        other => panic!("expected leaf, got {:?}", other),
    }
    let mut decoded = Vec::new();
    attachment
        .body()
        .extract(ctx.encoders(), &mut decoded, None)
        .unwrap();
    assert_eq!(decoded, b"hello world");
}

#[test]
fn received_field_clauses() {
    let ctx = MailContext::new();
    let msg = b"Received: from a.b.com by c.d.com with ESMTP id 123; \
                Wed, 1 Jan 2020 00:00:00 +0000\r\n\
                \r\n\
                x\r\n";
    let (part, _) = roundtrip(&ctx, msg);
    let relay = part.header().field("received").unwrap().relay().unwrap();
    assert_eq!(relay.from.as_deref(), Some("a.b.com"));
    assert_eq!(relay.by.as_deref(), Some("c.d.com"));
    assert_eq!(relay.with, ["ESMTP"]);
    assert_eq!(relay.id.as_deref(), Some("123"));
    assert!(relay.date.is_some());
}

#[test]
fn header_lookup_case_insensitive() {
    let ctx = MailContext::new();
    let msg = b"SUBJECT: shouting\r\ncontent-type: text/plain\r\n\r\nx";
    let part = BodyPart::parse(&ctx, msg);
    assert!(part.header().field("Subject").is_ok());
    assert!(part.header().content_type().is_some());
    assert!(matches!(
        part.header().field("X-Missing"),
        Err(MimeError::NoSuchField(_))
    ));
}

#[test]
fn generated_lines_stay_within_budget() {
    let ctx = MailContext::new();
    let mut value = String::from("To: ");
    for i in 0..8 {
        if i > 0 {
            value.push_str(", ");
        }
        value.push_str(&format!("<recipient-number-{}@some-long-domain.example.org>", i));
    }
    let msg = format!(
        "{}\r\nSubject: a subject that is long enough to need folding across \
         several header lines to stay in budget\r\n\r\nbody\r\n",
        value
    );
    let part = BodyPart::parse(&ctx, msg.as_bytes());
    let out = part.generate_to_vec(ctx.max_line_length());
    let text = String::from_utf8(out).unwrap();
    let header_end = text.find("\r\n\r\n").unwrap();
    for line in text[..header_end].split("\r\n") {
        assert!(line.len() <= 76, "overlong header line: {:?}", line);
    }
}

#[test]
fn encoded_subject_survives() {
    let ctx = MailContext::new();
    let msg = b"Subject: =?utf-8?B?ZMOpamV1bmVyIGRlbWFpbiA/?=\r\n\r\nx";
    let (part, bytes) = roundtrip(&ctx, msg);
    let text = part.header().field("Subject").unwrap().text().unwrap();
    assert_eq!(text.decoded_text(), "déjeuner demain ?");
    let regenerated = String::from_utf8(bytes).unwrap();
    assert!(regenerated.contains("=?utf-8?"));
}

#[test]
fn truncated_encoded_word_still_generates() {
    // A subject whose B-word decodes to a lone UTF-8 lead byte must not
    // stall generation.
    let ctx = MailContext::new();
    let msg = b"Subject: =?utf-8?B?ww==?=\r\n\r\nx";
    let part = BodyPart::parse(&ctx, msg);
    let out = part.generate_to_vec(ctx.max_line_length());
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Subject: =?utf-8?Q?=C3?="), "{}", text);
}

#[test]
fn unknown_charset_degrades_not_fails() {
    // Conversion to an unavailable charset reports an error; the model
    // itself never refuses to hold the value.
    let word = plico::Word::new(b"text".to_vec(), Charset::new("x-klingon"));
    assert!(matches!(
        word.converted(&Charset::utf_8()),
        Err(MimeError::ConversionUnavailable { .. })
    ));
}

#[test]
fn built_message_parses_back() {
    let ctx = MailContext::new();
    let boundary = ctx.generate_boundary();

    let mut raw = Vec::new();
    raw.extend_from_slice(b"From: <sender@example.org>\r\n");
    raw.extend_from_slice(
        format!("Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n", boundary).as_bytes(),
    );
    raw.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    raw.extend_from_slice(b"Content-Type: text/plain; charset=utf-8\r\n\r\nhello\r\n");
    raw.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    let (part, _) = roundtrip(&ctx, &raw);
    assert_eq!(part.body().parts().len(), 1);
    let leaf = &part.body().parts()[0];
    match leaf.body() {
        Body::Contents { data, charset, .. } => {
            assert_eq!(&data[..], b"hello");
            assert_eq!(charset, &Charset::utf_8());
        }
        other => panic!("expected leaf, got {:?}", other),
    }
}

#[test]
fn date_field_survives_roundtrip() {
    let ctx = MailContext::new();
    let msg = b"Date: Fri, 21 Nov 1997 09:55:06 -0600\r\n\r\nx";
    let (part, _) = roundtrip(&ctx, msg);
    match part.header().field("Date").unwrap().value() {
        FieldValue::Date(dt) => {
            assert_eq!(dt.to_rfc2822(), "Fri, 21 Nov 1997 09:55:06 -0600");
        }
        other => panic!("expected date, got {:?}", other),
    }
}
