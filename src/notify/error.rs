#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NotifyError {
    /// The destination could not be opened or resolved.
    #[error("Could not open notification channel for user {user_id}: {msg}")]
    ChannelUnavailable { user_id: u64, msg: String },

    /// The destination resolved but the transport rejected the send.
    #[error("Delivery to user {user_id} failed: {msg}")]
    DeliveryFailed { user_id: u64, msg: String },
}
