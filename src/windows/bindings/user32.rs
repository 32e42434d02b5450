//! User32.dll bindings for asynchronous keyboard state

use ::windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

/// Whether the key with this virtual-key code is physically down right now
pub fn is_key_down(virtual_key: u16) -> bool {
    let state = unsafe { GetAsyncKeyState(i32::from(virtual_key)) } as u16;
    state & 0x8000 != 0
}
