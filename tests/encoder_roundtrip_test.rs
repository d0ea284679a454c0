use trace_transport::encoder::{Encoder, EncoderFormat, EncoderPool};
use trace_transport::{Span, Trace};

fn batches() -> Vec<Vec<Trace>> {
    vec![
        vec![],
        vec![vec![]],
        vec![vec![Span::new("a", "b", "c")]],
        vec![
            vec![
                Span::new("http.request", "web", "POST /orders")
                    .with_ids(u64::MAX, u64::MAX - 1, 0)
                    .with_timing(-5, i64::MAX)
                    .with_type("web")
                    .with_meta("http.url", "/orders?id=42")
                    .with_meta("unicode", "注文 ✓")
                    .with_metric("_sample_rate", 0.5)
                    .with_metric("items", 1234.25)
                    .with_error(1),
                Span::new("db.query", "postgres", "INSERT INTO orders")
                    .with_ids(u64::MAX, 3, u64::MAX - 1),
            ],
            vec![Span::new("", "", "")],
        ],
    ]
}

#[test]
fn test_roundtrip_both_formats() {
    for format in [EncoderFormat::Msgpack, EncoderFormat::Json] {
        let mut encoder = Encoder::new(0, format);

        for batch in batches() {
            let payload = encoder.encode(&batch).unwrap();
            let decoded = format.decode(&payload).unwrap();
            assert_eq!(decoded, batch, "{format} round trip");
            encoder.reset();
        }
    }
}

#[test]
fn test_formats_are_not_interchangeable() {
    let batch = batches().pop().unwrap();
    let mut encoder = Encoder::new(0, EncoderFormat::Msgpack);
    let payload = encoder.encode(&batch).unwrap();

    assert!(EncoderFormat::Json.decode(&payload).is_err());
}

#[test]
fn test_msgpack_spans_are_keyed_maps() {
    let batch = vec![vec![Span::new("op", "svc", "res")]];
    let mut encoder = Encoder::new(0, EncoderFormat::Msgpack);
    let payload = encoder.encode(&batch).unwrap();

    // fixarray(1) -> fixarray(1) -> fixmap
    assert_eq!(payload[0], 0x91);
    assert_eq!(payload[1], 0x91);
    assert_eq!(payload[2] & 0xf0, 0x80);
}

#[tokio::test]
async fn test_pooled_encoders_roundtrip() {
    let pool = EncoderPool::new(EncoderFormat::Json, 2);

    for batch in batches() {
        let mut encoder = pool.borrow().await.unwrap();
        let payload = encoder.encode(&batch).unwrap();
        assert_eq!(pool.format().decode(&payload).unwrap(), batch);
    }

    let stats = pool.stats();
    assert_eq!(stats.borrowed, stats.returned);
    assert_eq!(stats.idle, 2);
}
