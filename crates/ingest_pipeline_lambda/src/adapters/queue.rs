/// Interval during which a received message stays hidden from other
/// consumers pending acknowledgement.
pub const RECEIVE_VISIBILITY_TIMEOUT_SECS: i32 = 60;
/// Long-poll wait applied to each receive call.
pub const RECEIVE_WAIT_TIME_SECS: i32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub body: String,
    pub receipt_handle: String,
}

pub trait QueueSource {
    /// Requests at most one message. An empty queue yields `Ok(None)`.
    fn receive_one(&self) -> Result<Option<QueueMessage>, String>;
    fn acknowledge(&self, receipt_handle: &str) -> Result<(), String>;
}
