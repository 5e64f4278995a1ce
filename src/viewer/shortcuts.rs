use super::messages::{Key, KeyPress, Message};

/// Message bound to a key press, if any. Keys typed into a text field are
/// never shortcuts.
pub fn message_for_key(press: &KeyPress) -> Option<Message> {
    if press.in_text_input {
        return None;
    }

    match press.key {
        Key::ArrowLeft => Some(Message::PreviousPage),
        Key::ArrowRight => Some(Message::NextPage),
        Key::Home => Some(Message::FirstPage),
        Key::End => Some(Message::LastPage),
        Key::Escape => Some(Message::CloseChapterPanel),
        Key::Char('+' | '=') => Some(Message::ZoomIn),
        Key::Char('-') => Some(Message::ZoomOut),
        Key::Char('0') if press.modifiers.ctrl || press.modifiers.meta => {
            Some(Message::FitToWidth)
        }
        Key::Char(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::messages::Modifiers;

    #[test]
    fn arrows_navigate() {
        assert_eq!(
            message_for_key(&KeyPress::plain(Key::ArrowLeft)),
            Some(Message::PreviousPage)
        );
        assert_eq!(
            message_for_key(&KeyPress::plain(Key::ArrowRight)),
            Some(Message::NextPage)
        );
    }

    #[test]
    fn zero_needs_ctrl_or_cmd() {
        assert_eq!(message_for_key(&KeyPress::plain(Key::Char('0'))), None);
        assert_eq!(
            message_for_key(&KeyPress::ctrl(Key::Char('0'))),
            Some(Message::FitToWidth)
        );
        let cmd = KeyPress {
            modifiers: Modifiers {
                ctrl: false,
                meta: true,
            },
            ..KeyPress::plain(Key::Char('0'))
        };
        assert_eq!(message_for_key(&cmd), Some(Message::FitToWidth));
    }

    #[test]
    fn equals_is_zoom_in() {
        assert_eq!(
            message_for_key(&KeyPress::plain(Key::Char('='))),
            Some(Message::ZoomIn)
        );
    }

    #[test]
    fn typing_in_search_box_is_ignored() {
        let press = KeyPress {
            in_text_input: true,
            ..KeyPress::plain(Key::Escape)
        };
        assert_eq!(message_for_key(&press), None);
    }
}
