//! Winit event adapter.
//!
//! Translates winit window events into the platform-agnostic [`Input`] state
//! and the [`ViewerEvent`]s the viewer reacts to.

use glam::Vec2;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};

use crate::resources::input::{ButtonState, Input, MouseButton};
use crate::viewer::ViewerEvent;

#[must_use]
pub fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Back,
        winit::event::MouseButton::Forward => MouseButton::Forward,
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[must_use]
pub fn translate_element_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

/// Updates `input` from `event` and returns the viewer event it maps to.
///
/// A click is a left-button release at the last known cursor position.
pub fn process_window_event(input: &mut Input, event: &WindowEvent) -> Option<ViewerEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let pointer = Vec2::new(position.x as f32, position.y as f32);
            input.inject_mouse_position(pointer.x, pointer.y);
            Some(ViewerEvent::PointerMove(pointer))
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let button = translate_mouse_button(*button);
            let state = translate_element_state(*state);
            input.inject_mouse_button(button, state);

            if button == MouseButton::Left && state == ButtonState::Released {
                input.cursor().map(ViewerEvent::Click)
            } else {
                None
            }
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => {
                    const PIXEL_SCALE: f32 = 0.01;
                    (pos.x as f32 * PIXEL_SCALE, pos.y as f32 * PIXEL_SCALE)
                }
            };
            input.inject_scroll(dx, dy);
            None
        }

        WindowEvent::Resized(size) => {
            input.inject_resize(size.width, size.height);
            Some(ViewerEvent::Resize(size.width, size.height))
        }

        _ => None,
    }
}
