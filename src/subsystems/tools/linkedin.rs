//! LinkedIn "connect" stub. No request leaves the process; the reply is canned.

/// Returns the canned confirmation when `text` asks to connect, else `None`.
///
/// The named person in the text is ignored; the reply always names
/// `target_user`.
pub fn connect(text: &str, target_user: &str) -> Option<String> {
    text.to_lowercase()
        .contains("connect with")
        .then(|| format!("Connection request sent to {target_user} on LinkedIn."))
}

pub const NO_INSTRUCTION: &str = "No valid LinkedIn instruction found.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canned_reply_ignores_named_person() {
        let a = connect("I want to connect with Alice", "user").unwrap();
        let b = connect("Please CONNECT WITH Bob on LinkedIn", "user").unwrap();
        assert_eq!(a, "Connection request sent to user on LinkedIn.");
        assert_eq!(a, b);
    }

    #[test]
    fn other_text_is_none() {
        assert!(connect("send Alice a message", "user").is_none());
        assert!(connect("connectwith Alice", "user").is_none());
    }
}
