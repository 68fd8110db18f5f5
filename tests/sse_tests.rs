use bytes::Bytes;
use switchyard::body::sse::{self, SseEvent};
use switchyard::stream::Stream;

fn frame_all(events: Vec<SseEvent>) -> Vec<u8> {
    sse::frame_events(Stream::from_iter(events)).fold(Vec::new(), |mut acc, chunk| {
        acc.extend_from_slice(&chunk);
        acc
    })
}

/// Minimal conformant SSE client: reassembles `{id, event, comment, data}`
/// tuples from the wire form.
#[derive(Debug, Default, PartialEq)]
struct ParsedEvent {
    id: Option<String>,
    event: Option<String>,
    comment: Option<String>,
    data: Option<Vec<u8>>,
}

fn parse_frames(wire: &[u8]) -> Vec<ParsedEvent> {
    let text = std::str::from_utf8(wire).unwrap();
    let mut events = Vec::new();
    for block in text.split("\r\n\r\n").filter(|block| !block.is_empty()) {
        let mut event = ParsedEvent::default();
        let mut data_lines: Vec<&str> = Vec::new();
        let mut comment_lines: Vec<&str> = Vec::new();
        for line in block.split(|c| c == '\r' || c == '\n').filter(|l| !l.is_empty()) {
            if let Some(value) = line.strip_prefix("id:") {
                event.id = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("event:") {
                event.event = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                data_lines.push(value);
            } else if let Some(value) = line.strip_prefix(":") {
                comment_lines.push(value);
            }
        }
        if !data_lines.is_empty() {
            event.data = Some(data_lines.join("\n").into_bytes());
        }
        if !comment_lines.is_empty() {
            event.comment = Some(comment_lines.join("\n"));
        }
        events.push(event);
    }
    events
}

#[test]
fn test_full_event_layout() {
    let wire = frame_all(vec![SseEvent::new().id("42").event("tick").data("a\nb")]);
    assert_eq!(wire, b"id:42\nevent:tick\ndata:a\r\ndata:b\r\n\r\n");
}

#[test]
fn test_round_trip_recovers_tuples() {
    let originals = vec![
        SseEvent::new().id("1").event("tick").data("plain"),
        SseEvent::new().data("line1\nline2\r\nline3\rline4"),
        SseEvent::new().id("2").comment("keep\nalive").data("x"),
        SseEvent::new().event("ping"),
    ];
    let wire = frame_all(originals);
    let parsed = parse_frames(&wire);

    assert_eq!(
        parsed,
        vec![
            ParsedEvent {
                id: Some("1".into()),
                event: Some("tick".into()),
                comment: None,
                data: Some(b"plain".to_vec()),
            },
            ParsedEvent {
                id: None,
                event: None,
                comment: None,
                data: Some(b"line1\nline2\nline3\nline4".to_vec()),
            },
            ParsedEvent {
                id: Some("2".into()),
                event: None,
                comment: Some("keep\nalive".into()),
                data: Some(b"x".to_vec()),
            },
            ParsedEvent {
                id: None,
                event: Some("ping".into()),
                comment: None,
                data: None,
            },
        ]
    );
}

#[test]
fn test_utf8_payload_survives() {
    let wire = frame_all(vec![SseEvent::new().data("héllo\n世界")]);
    let parsed = parse_frames(&wire);
    assert_eq!(parsed[0].data.as_deref(), Some("héllo\n世界".as_bytes()));
}

#[test]
fn test_channel_feeds_ordered_events() {
    let (sender, events) = sse::channel();
    let producer = std::thread::spawn(move || {
        for i in 0..3 {
            sender.send(SseEvent::new().data(format!("tick {i}")));
        }
    });
    producer.join().unwrap();

    let wire: Vec<Bytes> = sse::frame_events(events).collect();
    let text = wire.iter().fold(Vec::new(), |mut acc, chunk| {
        acc.extend_from_slice(chunk);
        acc
    });
    assert_eq!(
        text,
        b"data:tick 0\r\n\r\ndata:tick 1\r\n\r\ndata:tick 2\r\n\r\n"
    );
}

#[test]
fn test_sse_body_sets_content_type() {
    let mut response = switchyard::Response::new();
    response
        .body()
        .sse(Stream::once(SseEvent::new().data("x")))
        .unwrap();
    let assembled = switchyard::body::assemble(response.take_body(), None).unwrap();
    assert!(assembled
        .headers
        .iter()
        .any(|(name, value)| *name == "content-type"
            && value == "text/event-stream;charset=utf-8"));
}
