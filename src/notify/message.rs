//! Message body construction. Pure; the kill switch and transports live in
//! the dispatcher.

/// Builds the per-user message body from the missing-items list. An empty
/// list still produces a message so the user hears "nothing new" rather
/// than silence.
pub fn build_message(missing_items: &[String]) -> String {
    if missing_items.is_empty() {
        "Ada-1 is not selling any new shaders for you this week.".to_string()
    } else {
        format!(
            "Ada-1 is selling shaders you don't have: {}!",
            missing_items.join(", ")
        )
    }
}
