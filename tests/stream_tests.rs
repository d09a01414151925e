//! Stream entry-point behavior
//!
//! Lenient vs strict semantics, multiplexed streams, file-backed streams,
//! and the async path.

use std::io::{Cursor, Read, Seek, SeekFrom};

use packforge::{
    deserialize_from, deserialize_from_async, deserialize_from_strict, serialize,
    serialize_to_async, serialize_to_writer,
};

#[test]
fn test_lenient_and_strict_agree_on_single_value() {
    let value = (vec![1u32, 2, 3], Some("tail".to_string()));
    let bytes = serialize(&value).unwrap();

    let lenient: (Vec<u32>, Option<String>) =
        deserialize_from(&mut Cursor::new(bytes.clone())).unwrap();
    let strict: (Vec<u32>, Option<String>) =
        deserialize_from_strict(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(lenient, value);
    assert_eq!(strict, value);
}

#[test]
fn test_strict_cursor_sits_at_start_of_next_value() {
    let first = vec!["a".to_string(), "bb".to_string()];
    let second = 987_654u32;

    let mut bytes = serialize(&first).unwrap();
    let second_bytes = serialize(&second).unwrap();
    let first_len = bytes.len();
    bytes.extend(&second_bytes);

    let mut stream = Cursor::new(bytes);
    let decoded: Vec<String> = deserialize_from_strict(&mut stream).unwrap();
    assert_eq!(decoded, first);
    // Exactly the first value's span was consumed.
    assert_eq!(stream.position() as usize, first_len);

    let decoded: u32 = deserialize_from_strict(&mut stream).unwrap();
    assert_eq!(decoded, second);
}

#[test]
fn test_three_values_multiplexed() {
    let mut stream = Cursor::new(Vec::new());
    serialize_to_writer(&mut stream.get_mut(), &1i32).unwrap();
    serialize_to_writer(&mut stream.get_mut(), &"middle".to_string()).unwrap();
    serialize_to_writer(&mut stream.get_mut(), &vec![true, false]).unwrap();

    let a: i32 = deserialize_from_strict(&mut stream).unwrap();
    let b: String = deserialize_from_strict(&mut stream).unwrap();
    let c: Vec<bool> = deserialize_from_strict(&mut stream).unwrap();
    assert_eq!((a, b.as_str(), c), (1, "middle", vec![true, false]));

    // The stream is exhausted; another strict read hits end-of-stream.
    assert!(deserialize_from_strict::<i32, _>(&mut stream).is_err());
}

#[test]
fn test_file_backed_strict_stream() {
    let mut file = tempfile::tempfile().unwrap();
    serialize_to_writer(&mut file, &("on disk".to_string(), 1u8)).unwrap();
    serialize_to_writer(&mut file, &(String::new(), 2u8)).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let first: (String, u8) = deserialize_from_strict(&mut file).unwrap();
    let second: (String, u8) = deserialize_from_strict(&mut file).unwrap();
    assert_eq!(first, ("on disk".to_string(), 1));
    assert_eq!(second, (String::new(), 2));
}

#[test]
fn test_file_backed_lenient_stream() {
    let mut file = tempfile::tempfile().unwrap();
    let value: Vec<i64> = (-500..500).collect();
    serialize_to_writer(&mut file, &value).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let decoded: Vec<i64> = deserialize_from(&mut file).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn test_lenient_consumes_trailing_data() {
    // Lenient mode drains the stream; trailing bytes are gone afterwards.
    let mut bytes = serialize(&5i32).unwrap();
    bytes.extend(serialize(&6i32).unwrap());
    let mut stream = Cursor::new(bytes);

    let decoded: i32 = deserialize_from(&mut stream).unwrap();
    assert_eq!(decoded, 5);
    let mut rest = Vec::new();
    stream.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn test_truncated_stream_errors() {
    let mut bytes = serialize(&"truncated well before the end".to_string()).unwrap();
    bytes.truncate(bytes.len() / 2);

    assert!(deserialize_from::<String, _>(&mut Cursor::new(bytes.clone())).is_err());
    assert!(deserialize_from_strict::<String, _>(&mut Cursor::new(bytes)).is_err());
}

#[test]
fn test_io_error_propagates_unchanged() {
    struct FailingReader;
    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "transport down",
            ))
        }
    }

    let err = deserialize_from::<i32, _>(&mut FailingReader).unwrap_err();
    match err {
        packforge::Error::Io(io) => {
            assert_eq!(io.kind(), std::io::ErrorKind::ConnectionReset)
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_async_stream_roundtrip() {
    let value = (0..10_000u32).map(|n| n.to_string()).collect::<Vec<_>>();
    let mut sink = Vec::new();
    let written = serialize_to_async(&mut sink, &value).await.unwrap();
    assert_eq!(written, sink.len());

    let mut stream = Cursor::new(sink);
    let decoded: Vec<String> = deserialize_from_async(&mut stream).await.unwrap();
    assert_eq!(decoded, value);
}

#[tokio::test]
async fn test_async_duplex_pipe() {
    let (mut client, mut server) = tokio::io::duplex(1024);
    let value = vec![(1u16, true), (2, false)];

    let expected = value.clone();
    let writer = tokio::spawn(async move {
        serialize_to_async(&mut client, &value).await.unwrap();
        drop(client); // signal end-of-stream to the lenient reader
    });

    let decoded: Vec<(u16, bool)> = deserialize_from_async(&mut server).await.unwrap();
    writer.await.unwrap();
    assert_eq!(decoded, expected);
}
