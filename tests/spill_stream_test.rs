use nodewire::{parse_response, SpillOptions, SpillReader, WireConfig};
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

/// Byte source fed through a channel; counts reads and drops
struct ChannelSource {
    chunks: Receiver<Vec<u8>>,
    reads: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl Read for ChannelSource {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.chunks.recv() {
            Ok(chunk) => {
                let n = chunk.len().min(out.len());
                out[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            Err(_) => Ok(0),
        }
    }
}

impl Drop for ChannelSource {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_spilled_bytes_arrive_in_order() {
    let body: Vec<u8> = (0..250_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let options = SpillOptions {
        threshold: 4096,
        dir: None,
        buffer_size: 1000,
    };
    let mut reader = SpillReader::open(io::Cursor::new(body.clone()), &options).unwrap();
    assert!(reader.is_spilling());

    let mut out = Vec::new();
    let mut chunk = [0u8; 333];
    loop {
        let n = reader.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        out.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(out, body);
}

#[test]
fn test_early_close_drops_source_once_and_stops_writing() {
    let (tx, rx) = mpsc::channel();
    let reads = Arc::new(AtomicUsize::new(0));
    let drops = Arc::new(AtomicUsize::new(0));
    let source = ChannelSource {
        chunks: rx,
        reads: reads.clone(),
        drops: drops.clone(),
    };

    tx.send(vec![1u8; 8]).unwrap();
    tx.send(vec![2u8; 8]).unwrap();
    let options = SpillOptions {
        threshold: 8,
        dir: None,
        buffer_size: 8,
    };
    let mut reader = SpillReader::open(source, &options).unwrap();
    assert!(reader.is_spilling());
    let drain = reader.drain_handle();

    let mut prefix = [0u8; 8];
    reader.read_exact(&mut prefix).unwrap();
    assert_eq!(prefix, [1u8; 8]);
    let mut spilled = [0u8; 8];
    reader.read_exact(&mut spilled).unwrap();
    assert_eq!(spilled, [2u8; 8]);

    // The drain is now blocked on a read that has no data yet
    reader.close();
    tx.send(vec![3u8; 8]).unwrap();
    drain.wait_finished();

    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert_eq!(drain.bytes_spilled(), 8);
    let reads_at_close = reads.load(Ordering::SeqCst);

    let _ = tx.send(vec![4u8; 8]);
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(reads.load(Ordering::SeqCst), reads_at_close);
    assert_eq!(reader.read(&mut spilled).unwrap(), 0);

    drop(reader);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_abandoned_response_stops_drain() {
    let (tx, rx) = mpsc::channel();
    let drops = Arc::new(AtomicUsize::new(0));
    let source = ChannelSource {
        chunks: rx,
        reads: Arc::new(AtomicUsize::new(0)),
        drops: drops.clone(),
    };
    let head = br#"{"head":{"vars":["x"]},"results":{"bindings":["#;
    tx.send(head.to_vec()).unwrap();
    tx.send(br#"{"x":{"type":"uri","value":"http://example.org/1"}},"#.to_vec()).unwrap();

    let config = WireConfig::default().with_spill_threshold(Some(head.len()));
    let mut response = parse_response("application/sparql-results+json", source, &config).unwrap();
    assert!(response.rows().unwrap().next().unwrap().is_ok());

    response.close();
    tx.send(b"{}".to_vec()).unwrap();
    drop(tx);
    for _ in 0..200 {
        if drops.load(Ordering::SeqCst) == 1 {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(response.cleanup().is_closed());
}
