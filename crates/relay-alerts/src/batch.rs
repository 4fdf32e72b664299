//! Size-bounded packing of alerts into outbound messages.

use std::ops::Range;

use tracing::{debug, warn};

use crate::render::Renderer;
use crate::types::Alert;

/// One outbound message produced by [`MessageBatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Position of this message in the batch, starting at zero.
    pub ordinal: usize,
    /// Rendered text.
    pub text: String,
    /// Indices of the input alerts packed into this message.
    pub alerts: Range<usize>,
}

impl Message {
    /// Rendered size in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns true if the message has no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Greedily packs consecutive alerts into messages no longer than a limit.
///
/// A single alert whose own rendering exceeds the limit is emitted alone;
/// alert text is never split.
#[derive(Debug, Clone)]
pub struct MessageBatcher<R> {
    renderer: R,
    limit: usize,
}

impl<R: Renderer> MessageBatcher<R> {
    /// Creates a batcher with the given renderer and size ceiling.
    pub const fn new(renderer: R, limit: usize) -> Self {
        Self { renderer, limit }
    }

    /// Returns the size ceiling.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Packs `alerts` into messages, preserving order.
    ///
    /// An empty input yields no messages.
    pub fn batch(&self, alerts: &[Alert]) -> Vec<Message> {
        let mut messages = Vec::new();
        let mut current = Pending::default();

        for (index, alert) in alerts.iter().enumerate() {
            let text = self.renderer.render(alert);
            let candidate_len = text.chars().count();
            let tentative = current.len_with(candidate_len, self.separator_len());

            if tentative <= self.limit {
                current.push(index, text, candidate_len, self.separator_len());
                continue;
            }

            if current.len == 0 {
                warn!(
                    index,
                    len = candidate_len,
                    limit = self.limit,
                    "single alert exceeds message limit, sending oversized"
                );
                current.push(index, text, candidate_len, 0);
                let alone = std::mem::take(&mut current);
                self.flush(&mut messages, alone);
            } else {
                let full = std::mem::take(&mut current);
                self.flush(&mut messages, full);
                current.push(index, text, candidate_len, 0);
            }
        }

        if !current.is_empty() {
            self.flush(&mut messages, current);
        }

        debug!(alerts = alerts.len(), messages = messages.len(), "batched alerts");
        messages
    }

    fn separator_len(&self) -> usize {
        self.renderer.separator().chars().count()
    }

    fn flush(&self, messages: &mut Vec<Message>, pending: Pending) {
        let Some(range) = pending.range else {
            return;
        };
        if pending.len == 0 {
            // Nothing visible to send; keep coverage on the previous message.
            if let Some(last) = messages.last_mut() {
                last.alerts.end = range.end;
            }
            return;
        }
        let parts: Vec<String> = pending.parts.into_iter().filter(|p| !p.is_empty()).collect();
        messages.push(Message {
            ordinal: messages.len(),
            text: parts.join(self.renderer.separator()),
            alerts: range,
        });
    }
}

/// The batch being accumulated.
#[derive(Debug, Default)]
struct Pending {
    range: Option<Range<usize>>,
    parts: Vec<String>,
    len: usize,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    /// Rendered length if an alert of `candidate_len` were appended.
    fn len_with(&self, candidate_len: usize, separator_len: usize) -> usize {
        if self.len == 0 || candidate_len == 0 {
            self.len + candidate_len
        } else {
            self.len + separator_len + candidate_len
        }
    }

    fn push(&mut self, index: usize, text: String, text_len: usize, separator_len: usize) {
        self.len = self.len_with(text_len, separator_len);
        self.parts.push(text);
        self.range = Some(match self.range.take() {
            Some(range) => range.start..index + 1,
            None => index..index + 1,
        });
    }
}
