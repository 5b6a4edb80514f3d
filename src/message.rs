//! Bounded queue of short on-screen messages.
//!
//! Each message carries a priority and a lifetime in frames. The frontend
//! pulls once per frame and shows whatever comes back.

/// Default number of queued messages.
pub const DEFAULT_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Message {
    text: String,
    priority: u32,
    frames: u32,
    seq: u64,
}

/// Priority queue of messages with per-message frame lifetimes.
#[derive(Debug, Clone)]
pub struct MessageQueue {
    messages: Vec<Message>,
    capacity: usize,
    next_seq: u64,
    current: Option<String>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MessageQueue {
    /// Create a queue holding at most `capacity` messages.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: Vec::with_capacity(capacity),
            capacity,
            next_seq: 0,
            current: None,
        }
    }

    /// Queue `text` for `frames` pulls. Dropped when the queue is full or
    /// `frames` is 0.
    pub fn push(&mut self, text: impl Into<String>, priority: u32, frames: u32) {
        if self.messages.len() >= self.capacity || frames == 0 {
            return;
        }
        self.messages.push(Message {
            text: text.into(),
            priority,
            frames,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Highest-priority message for this frame.
    ///
    /// Earliest pushed wins ties. Each pull consumes one frame of the
    /// message's lifetime.
    pub fn pull(&mut self) -> Option<&str> {
        let index = self
            .messages
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| b.seq.cmp(&a.seq))
            })
            .map(|(i, _)| i)?;

        self.messages[index].frames -= 1;
        let text = if self.messages[index].frames == 0 {
            self.messages.swap_remove(index).text
        } else {
            self.messages[index].text.clone()
        };
        self.current = Some(text);
        self.current.as_deref()
    }

    /// Queued messages as `(text, priority, frames left)`, in push order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32, u32)> + '_ {
        self.messages
            .iter()
            .map(|m| (m.text.as_str(), m.priority, m.frames))
    }

    /// Drop every queued message.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.current = None;
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
