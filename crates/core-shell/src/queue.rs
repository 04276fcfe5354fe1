//! Bounded single-producer single-consumer stage queues.
//!
//! Channel policy: every stage writes through a bounded mpsc channel sized
//! by `STAGE_QUEUE_CAP`. Stage tasks run on the blocking pool and use
//! `blocking_send`, which parks the producer when the consumer lags rather
//! than dropping items: pipeline fidelity beats lossy throughput here, and
//! the bound keeps a fast upstream stage from buffering a whole file ahead
//! of a slow downstream one. Completion is an explicit, one-shot signal:
//! the writer drops its sender half exactly once, and any send attempted
//! afterwards is dropped with a warning and a telemetry tick.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::value::PipelineItem;

/// Default bound for stage queues; a deliberate small value so memory per
/// statement stays proportional to stage count, not stream length.
pub const STAGE_QUEUE_CAP: usize = 64;

/// Successful blocking sends across all queues.
pub static QUEUE_BLOCKING_SENDS: AtomicU64 = AtomicU64::new(0);
/// Items dropped because the producer already signalled completion.
pub static QUEUE_POST_COMPLETE_DROPS: AtomicU64 = AtomicU64::new(0);
/// Sends that failed because the consumer went away (downstream fault).
pub static QUEUE_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Producer half of a stage queue.
#[derive(Debug)]
pub struct QueueWriter {
    tx: Option<mpsc::Sender<PipelineItem>>,
}

/// Consumer half of a stage queue.
#[derive(Debug)]
pub struct QueueReader {
    rx: mpsc::Receiver<PipelineItem>,
}

/// Create a bounded stage queue.
pub fn stage_queue(capacity: usize) -> (QueueWriter, QueueReader) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (QueueWriter { tx: Some(tx) }, QueueReader { rx })
}

impl QueueWriter {
    /// Enqueue one item, parking the calling thread while the queue is
    /// full. After [`complete`](Self::complete) the item is dropped with a
    /// warning; a vanished consumer only gets a telemetry tick because the
    /// producing stage still needs to drain its own work.
    pub fn send(&mut self, item: PipelineItem) {
        match &self.tx {
            Some(tx) => match tx.blocking_send(item) {
                Ok(()) => {
                    QUEUE_BLOCKING_SENDS.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    QUEUE_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                    trace!(target: "exec.queue", "send_after_consumer_gone");
                }
            },
            None => {
                QUEUE_POST_COMPLETE_DROPS.fetch_add(1, Ordering::Relaxed);
                warn!(target: "exec.queue", "item_dropped_after_completion");
            }
        }
    }

    /// Signal end-of-stream. Idempotent; the first call wins.
    pub fn complete(&mut self) {
        if self.tx.take().is_some() {
            trace!(target: "exec.queue", "queue_completed");
        }
    }

    pub fn is_completed(&self) -> bool {
        self.tx.is_none()
    }
}

impl Drop for QueueWriter {
    fn drop(&mut self) {
        // Backstop: a stage that unwinds without calling complete() still
        // delivers end-of-stream to its consumer.
        self.complete();
    }
}

impl QueueReader {
    /// Take the next item, parking until one arrives or the producer
    /// completes. `None` is end-of-stream.
    pub fn blocking_take(&mut self) -> Option<PipelineItem> {
        self.rx.blocking_recv()
    }

    /// Async variant used by the executor's final drain.
    pub async fn take(&mut self) -> Option<PipelineItem> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn item(n: i64) -> PipelineItem {
        PipelineItem::output(Value::Int(n))
    }

    #[test]
    fn fifo_order_is_preserved() {
        let (mut writer, mut reader) = stage_queue(8);
        std::thread::spawn(move || {
            for n in 0..20 {
                writer.send(item(n));
            }
            writer.complete();
        });
        let mut seen = Vec::new();
        while let Some(received) = reader.blocking_take() {
            seen.push(received.value);
        }
        let expected: Vec<Value> = (0..20).map(Value::Int).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn bounded_queue_blocks_then_drains() {
        let (mut writer, mut reader) = stage_queue(2);
        let producer = std::thread::spawn(move || {
            for n in 0..10 {
                writer.send(item(n));
            }
            writer.complete();
        });
        // Drain slowly; the producer must park on the bound, not drop.
        let mut count = 0;
        while let Some(_received) = reader.blocking_take() {
            count += 1;
            std::thread::yield_now();
        }
        producer.join().unwrap();
        assert_eq!(count, 10);
    }

    #[test]
    fn complete_is_one_shot_and_post_complete_sends_drop() {
        let before = QUEUE_POST_COMPLETE_DROPS.load(Ordering::Relaxed);
        let (mut writer, mut reader) = stage_queue(4);
        writer.send(item(1));
        writer.complete();
        assert!(writer.is_completed());
        writer.complete();
        writer.send(item(2));
        assert_eq!(
            QUEUE_POST_COMPLETE_DROPS.load(Ordering::Relaxed),
            before + 1
        );
        assert_eq!(reader.blocking_take(), Some(item(1)));
        assert_eq!(reader.blocking_take(), None, "end-of-stream after complete");
    }

    #[test]
    fn drop_signals_completion() {
        let (writer, mut reader) = stage_queue(4);
        drop(writer);
        assert_eq!(reader.blocking_take(), None);
    }

    #[test]
    fn send_to_vanished_consumer_is_counted_not_fatal() {
        let before = QUEUE_SEND_FAILURES.load(Ordering::Relaxed);
        let (mut writer, reader) = stage_queue(1);
        drop(reader);
        writer.send(item(1));
        assert_eq!(QUEUE_SEND_FAILURES.load(Ordering::Relaxed), before + 1);
    }
}
