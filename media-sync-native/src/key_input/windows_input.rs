use windows::Win32::UI::Input::KeyboardAndMouse::{
    INPUT, INPUT_0, INPUT_KEYBOARD, KEYBD_EVENT_FLAGS, KEYBDINPUT, KEYEVENTF_KEYUP, SendInput,
    VIRTUAL_KEY, keybd_event,
};

use super::{InputSink, KeyDirection, KeyEvent};

fn flags(direction: KeyDirection) -> KEYBD_EVENT_FLAGS {
    match direction {
        KeyDirection::Down => KEYBD_EVENT_FLAGS(0),
        KeyDirection::Up => KEYEVENTF_KEYUP,
    }
}

/// Injects through `SendInput`, which reports how many records it inserted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendInputSink;

impl InputSink for SendInputSink {
    fn send_inputs(&self, events: &[KeyEvent]) -> u32 {
        let inputs = events
            .iter()
            .map(|event| INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: VIRTUAL_KEY(event.key.virtual_key()),
                        wScan: 0,
                        dwFlags: flags(event.direction),
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            })
            .collect::<Vec<_>>();

        unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) }
    }
}

/// Injects through the older `keybd_event`. It has no way to report a
/// rejected event, so every event counts as accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyKeybdEventSink;

impl InputSink for LegacyKeybdEventSink {
    fn send_inputs(&self, events: &[KeyEvent]) -> u32 {
        for event in events {
            unsafe {
                keybd_event(
                    event.key.virtual_key() as u8,
                    0,
                    flags(event.direction),
                    0,
                );
            }
        }

        events.len() as u32
    }
}
