//! Builders for the synthetic DOM events the host apps react to.
//!
//! Each builder returns JS statements that dispatch on an element already
//! bound to the given identifier, so callers can splice them into a larger
//! snippet.

use super::eval::js_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Move,
    Over,
    Down,
    Up,
    Click,
    Out,
}

impl MouseKind {
    pub fn event_name(self) -> &'static str {
        match self {
            MouseKind::Move => "mousemove",
            MouseKind::Over => "mouseover",
            MouseKind::Down => "mousedown",
            MouseKind::Up => "mouseup",
            MouseKind::Click => "click",
            MouseKind::Out => "mouseout",
        }
    }
}

/// The full pointer pass some host widgets need instead of a bare click.
pub const POINTER_SEQUENCE: [MouseKind; 6] = [
    MouseKind::Move,
    MouseKind::Over,
    MouseKind::Down,
    MouseKind::Up,
    MouseKind::Click,
    MouseKind::Out,
];

pub fn mouse_events_js(target: &str, kinds: &[MouseKind]) -> String {
    kinds
        .iter()
        .map(|kind| {
            format!(
                "{target}.dispatchEvent(new MouseEvent('{name}', {{ view: window, bubbles: true, cancelable: true }}));",
                target = target,
                name = kind.event_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Press,
    Up,
}

impl KeyPhase {
    pub fn event_name(self) -> &'static str {
        match self {
            KeyPhase::Down => "keydown",
            KeyPhase::Press => "keypress",
            KeyPhase::Up => "keyup",
        }
    }
}

pub fn key_events_js(target: &str, key: &str, phases: &[KeyPhase]) -> String {
    let (code, key_code) = key_to_code(key);
    phases
        .iter()
        .map(|phase| {
            format!(
                "{target}.dispatchEvent(new KeyboardEvent('{name}', {{ key: {key}, code: {code}, keyCode: {key_code}, which: {key_code}, view: window, bubbles: true, cancelable: true }}));",
                target = target,
                name = phase.event_name(),
                key = js_str(key),
                code = js_str(&code),
                key_code = key_code,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `input` (and optionally `change`) so framework bindings pick up a value
/// written directly to the element.
pub fn input_events_js(target: &str, with_change: bool) -> String {
    let mut js = format!(
        "{target}.dispatchEvent(new Event('input', {{ bubbles: true, cancelable: true }}));",
        target = target
    );
    if with_change {
        js.push_str(&format!(
            "\n{target}.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            target = target
        ));
    }
    js
}

/// Map a key name to its `code` and legacy `keyCode`.
pub fn key_to_code(key: &str) -> (String, u32) {
    match key {
        "Enter" => ("Enter".into(), 13),
        "Escape" => ("Escape".into(), 27),
        "Tab" => ("Tab".into(), 9),
        "Backspace" => ("Backspace".into(), 8),
        "ArrowUp" => ("ArrowUp".into(), 38),
        "ArrowDown" => ("ArrowDown".into(), 40),
        _ => (
            key.to_string(),
            key.chars().next().map(|c| c as u32).unwrap_or(0),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(key_to_code("Enter"), ("Enter".to_string(), 13));
        assert_eq!(key_to_code("Escape"), ("Escape".to_string(), 27));
        assert_eq!(key_to_code("a"), ("a".to_string(), 97));
        assert_eq!(key_to_code(""), ("".to_string(), 0));
    }

    #[test]
    fn test_pointer_sequence_order() {
        let js = mouse_events_js("tab", &POINTER_SEQUENCE);
        let order: Vec<usize> = ["mousemove", "mouseover", "mousedown", "mouseup", "'click'", "mouseout"]
            .iter()
            .map(|name| js.find(name).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(js.lines().count(), 6);
        assert!(js.lines().all(|l| l.starts_with("tab.dispatchEvent")));
    }

    #[test]
    fn test_key_events_escape_key_text() {
        let js = key_events_js("el", "Enter", &[KeyPhase::Down, KeyPhase::Press]);
        assert!(js.contains("'keydown'"));
        assert!(js.contains("'keypress'"));
        assert!(!js.contains("'keyup'"));
        assert!(js.contains("keyCode: 13"));
        assert!(js.contains(r#"key: "Enter""#));
    }

    #[test]
    fn test_input_events() {
        assert!(!input_events_js("box", false).contains("change"));
        assert!(input_events_js("box", true).contains("'change'"));
    }
}
