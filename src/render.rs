//! HTML/CSS fragment rendering
//!
//! Everything a session writes into its response body is built here. The
//! style fragments are the whole client protocol: pressing a control makes
//! the browser fetch the `url(...)` of the newly matching rule, and every
//! trigger URL carries a fresh nonce so identical presses are never served
//! from cache.

use uuid::Uuid;

use crate::types::{Key, RoomId, SenderId};

fn nonce() -> Uuid {
    Uuid::new_v4()
}

/// The one-time document shell, written before the session enters its loop
///
/// Wires both letter keys and the send button to their down-state trigger
/// URLs and seeds an empty current-message placeholder. Deliberately leaves
/// `<body>` unterminated - the connection stays open and fragments keep
/// getting appended.
pub fn document_shell(room: RoomId, sender: SenderId) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
	<head>
		<title>CSS Chat</title>
		<style>
			#messages {{
				margin-top: 1rem;
				display: flex;
				flex-direction: column-reverse;
			}}
			#messages p {{
				margin: 0;
			}}
			.current {{
				margin-bottom: 1rem;
				order: 1;
			}}
			.current:has(~ .current) {{
				display: none;
			}}
			#cowboy:active {{
				background: url("/key-down/{room}/{sender}/cowboy/{n1}");
			}}
			#hacker:active {{
				background: url("/key-down/{room}/{sender}/hacker/{n2}");
			}}
			#send:active {{
				background: url("/send-down/{room}/{sender}/{n3}");
			}}
		</style>
	</head>
	<body>
		<h1>This is a CSS-only chat!</h1>
		<p>Inspired by <a href="https://github.com/kkuchta/css-only-chat/">github.com/kkuchta/css-only-chat</a>.</p>
		<p>Please disable JavaScript, or not, you don't have to, but you could.</p>
		<p>Currently we only have two "letters".</p>

		<div id="keyboard">
			<button id="cowboy">&#129312;</button>
			<button id="hacker">&#128105;&#8205;&#128187;</button>
			<button id="send">Send</button>
		</div>

		<div id="messages">
			<p class="current"><strong>Message: </strong></p>
"#,
        room = room,
        sender = sender,
        n1 = nonce(),
        n2 = nonce(),
        n3 = nonce(),
    )
}

/// Re-arm the release trigger after a key press
pub fn key_up_armed(room: RoomId, sender: SenderId, key: Key) -> String {
    format!(
        "<style>\n\t#{key}:not(:active) {{\n\t\tbackground: url(\"/key-up/{room}/{sender}/{key}/{nonce}\");\n\t}}\n</style>\n",
        key = key,
        room = room,
        sender = sender,
        nonce = nonce(),
    )
}

/// Re-arm the press trigger after a key release
pub fn key_down_armed(room: RoomId, sender: SenderId, key: Key) -> String {
    format!(
        "<style>\n\t#{key}:active {{\n\t\tbackground: url(\"/key-down/{room}/{sender}/{key}/{nonce}\");\n\t}}\n</style>\n",
        key = key,
        room = room,
        sender = sender,
        nonce = nonce(),
    )
}

/// Re-arm the send-release trigger after the send button goes down
pub fn send_up_armed(room: RoomId, sender: SenderId) -> String {
    format!(
        "<style>\n\t#send:not(:active) {{\n\t\tbackground: url(\"/send-up/{room}/{sender}/{nonce}\");\n\t}}\n</style>\n",
        room = room,
        sender = sender,
        nonce = nonce(),
    )
}

/// Re-arm the send-press trigger after the send button comes back up
pub fn send_down_armed(room: RoomId, sender: SenderId) -> String {
    format!(
        "<style>\n\t#send:active {{\n\t\tbackground: url(\"/send-down/{room}/{sender}/{nonce}\");\n\t}}\n</style>\n",
        room = room,
        sender = sender,
        nonce = nonce(),
    )
}

/// The in-progress message line
///
/// Thanks to `.current:has(~ .current)` in the shell, only the newest of
/// these stays visible.
pub fn current_line(buffer: &str) -> String {
    format!("<p class=\"current\"><strong>Message: </strong>{buffer}</p>\n")
}

/// A committed message line, `sender: text`
pub fn message_line(sender: SenderId, text: &str) -> String {
    format!("<p><strong>{sender}: </strong>{text}</p>\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_arms_all_initial_triggers() {
        let room = RoomId::new();
        let sender = SenderId::new();
        let shell = document_shell(room, sender);

        assert!(shell.contains(&format!("/key-down/{}/{}/cowboy/", room, sender)));
        assert!(shell.contains(&format!("/key-down/{}/{}/hacker/", room, sender)));
        assert!(shell.contains(&format!("/send-down/{}/{}/", room, sender)));
        assert!(shell.contains("<p class=\"current\">"));
        // The shell stays open for streamed fragments.
        assert!(!shell.contains("</html>"));
    }

    #[test]
    fn test_trigger_urls_carry_fresh_nonces() {
        let room = RoomId::new();
        let sender = SenderId::new();

        let first = key_up_armed(room, sender, Key::Cowboy);
        let second = key_up_armed(room, sender, Key::Cowboy);
        assert_ne!(first, second);
    }

    #[test]
    fn test_fragment_selectors() {
        let room = RoomId::new();
        let sender = SenderId::new();

        assert!(key_up_armed(room, sender, Key::Hacker).contains("#hacker:not(:active)"));
        assert!(key_down_armed(room, sender, Key::Hacker).contains("#hacker:active"));
        assert!(send_up_armed(room, sender).contains("#send:not(:active)"));
        assert!(send_down_armed(room, sender).contains("#send:active"));
    }

    #[test]
    fn test_message_lines() {
        let sender = SenderId::new();
        let line = message_line(sender, "cowboyhacker");
        assert_eq!(
            line,
            format!("<p><strong>{}: </strong>cowboyhacker</p>\n", sender)
        );

        assert!(current_line("cowboy").contains(">cowboy</p>"));
    }
}
