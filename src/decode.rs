//! Background decoding of user-supplied images.
//!
//! Each request runs on its own worker thread and reports back through a
//! one-shot channel. The part the image belongs to is captured when the
//! request is submitted, never re-read when the result arrives.

use crate::error::ConfigError;
use crate::parts::PartId;
use crate::textures::{decode_image, TextureResource};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecodeTicket(u64);

pub type DecodeResult = Result<TextureResource, ConfigError>;

pub struct CompletedDecode {
    pub ticket: DecodeTicket,
    pub part: PartId,
    pub result: DecodeResult,
}

struct PendingDecode {
    ticket: DecodeTicket,
    part: PartId,
    receiver: oneshot::Receiver<DecodeResult>,
}

#[derive(Default)]
pub struct DecodeQueue {
    next_ticket: u64,
    pending: Vec<PendingDecode>,
}

impl DecodeQueue {
    pub fn new() -> Self {
        Self {
            next_ticket: 0,
            pending: Vec::new(),
        }
    }

    pub fn submit(&mut self, part: PartId, label: String, bytes: Vec<u8>) -> DecodeTicket {
        let ticket = DecodeTicket(self.next_ticket);
        self.next_ticket += 1;
        let (sender, receiver) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name(format!("image-decode-{}", ticket.0))
            .spawn(move || {
                let result = decode_image(&label, &bytes);
                // Receiver is gone when the request was cancelled.
                let _ = sender.send(result);
            });
        match spawned {
            Ok(_) => {
                self.pending.push(PendingDecode {
                    ticket,
                    part,
                    receiver,
                });
            }
            Err(err) => {
                log::warn!("Could not start image decode worker: {}", err);
            }
        }
        log::debug!("Decode {:?} submitted for part {:?}", ticket, part);
        ticket
    }

    /// Collects finished decodes without blocking.
    pub fn poll(&mut self) -> Vec<CompletedDecode> {
        let mut completed = Vec::new();
        self.pending.retain(|pending| match pending.receiver.try_recv() {
            Ok(result) => {
                completed.push(CompletedDecode {
                    ticket: pending.ticket,
                    part: pending.part,
                    result,
                });
                false
            }
            Err(oneshot::TryRecvError::Empty) => true,
            Err(oneshot::TryRecvError::Disconnected) => {
                log::warn!("Decode {:?} worker exited without a result", pending.ticket);
                false
            }
        });
        completed
    }

    /// Blocks until every outstanding decode has finished.
    pub fn wait_all(&mut self) -> Vec<CompletedDecode> {
        let mut completed = Vec::new();
        for pending in self.pending.drain(..) {
            match pending.receiver.recv() {
                Ok(result) => completed.push(CompletedDecode {
                    ticket: pending.ticket,
                    part: pending.part,
                    result,
                }),
                Err(_) => {
                    log::warn!("Decode {:?} worker exited without a result", pending.ticket);
                }
            }
        }
        completed
    }

    pub fn cancel(&mut self, ticket: DecodeTicket) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| pending.ticket != ticket);
        before != self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending decodes", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, ticket: DecodeTicket) -> bool {
        self.pending.iter().any(|pending| pending.ticket == ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialCapabilities;
    use crate::parts::{Bounds, PartRegistry};
    use crate::textures::tests::png_bytes;
    use glam::Vec3;

    fn part() -> PartId {
        let mut registry = PartRegistry::new();
        registry.register(
            Some("toe"),
            Bounds::new(Vec3::ZERO, Vec3::ONE),
            MaterialCapabilities::default(),
        )
    }

    #[test]
    fn completed_decode_keeps_captured_part() {
        let part = part();
        let mut queue = DecodeQueue::new();
        let ticket = queue.submit(part, "a.png".to_string(), png_bytes(4, 4));
        let done = queue.wait_all();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].ticket, ticket);
        assert_eq!(done[0].part, part);
        assert_eq!(done[0].result.as_ref().unwrap().width(), 4);
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn failed_decode_reports_error() {
        let mut queue = DecodeQueue::new();
        queue.submit(part(), "bad.bin".to_string(), vec![1, 2, 3]);
        let done = queue.wait_all();
        assert!(matches!(
            done[0].result,
            Err(ConfigError::ImageDecode { .. })
        ));
    }

    #[test]
    fn cancelled_decode_is_dropped() {
        let mut queue = DecodeQueue::new();
        let ticket = queue.submit(part(), "a.png".to_string(), png_bytes(2, 2));
        assert!(queue.is_pending(ticket));
        assert!(queue.cancel(ticket));
        assert!(!queue.cancel(ticket));
        assert!(queue.wait_all().is_empty());
    }

    #[test]
    fn poll_eventually_yields_result() {
        let mut queue = DecodeQueue::new();
        queue.submit(part(), "a.png".to_string(), png_bytes(2, 2));
        let mut done = Vec::new();
        for _ in 0..500 {
            done.extend(queue.poll());
            if !done.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(done.len(), 1);
    }
}
