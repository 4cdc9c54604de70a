use obj_viewer::controls::DragRotation;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent},
};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

fn device() -> DeviceId {
    // SAFETY: only used to build synthetic events, never handed to winit
    unsafe { DeviceId::dummy() }
}

fn cursor_moved(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: device(),
        position: PhysicalPosition::new(x, y),
    }
}

fn mouse(button: MouseButton, state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: device(),
        state,
        button,
    }
}

fn left_button(state: ElementState) -> WindowEvent {
    mouse(MouseButton::Left, state)
}

#[test]
fn should_rotate_while_dragging() {
    let mut drag = DragRotation::default();
    drag.press(100.0, 100.0);
    drag.motion(110.0, 95.0);

    assert!(approx(drag.rotation_y(), 0.1), "{}", drag.rotation_y());
    assert!(approx(drag.rotation_x(), -0.05), "{}", drag.rotation_x());
}

#[test]
fn should_ignore_motion_after_release() {
    let mut drag = DragRotation::default();
    drag.press(100.0, 100.0);
    drag.motion(110.0, 95.0);
    drag.release();
    drag.motion(300.0, 300.0);

    assert!(!drag.is_dragging());
    assert!(approx(drag.rotation_y(), 0.1));
    assert!(approx(drag.rotation_x(), -0.05));
}

#[test]
fn should_measure_from_the_press_position() {
    let mut drag = DragRotation::default();
    drag.motion(10.0, 10.0);
    drag.press(50.0, 50.0);
    drag.motion(60.0, 50.0);

    assert!(approx(drag.rotation_y(), 0.1));
    assert!(approx(drag.rotation_x(), 0.0));
}

#[test]
fn should_scale_by_sensitivity() {
    let mut drag = DragRotation::new(0.5);
    drag.press(0.0, 0.0);
    drag.motion(2.0, 4.0);

    assert!(approx(drag.rotation_y(), 1.0));
    assert!(approx(drag.rotation_x(), 2.0));
}

#[test]
fn should_pause_and_resume_spin() {
    let mut drag = DragRotation::default();
    assert!(drag.animation_running());

    drag.pause();
    assert!(!drag.animation_running());
    drag.resume();
    assert!(drag.animation_running());
    drag.toggle_animation();
    assert!(!drag.animation_running());
    drag.toggle_animation();
    assert!(drag.animation_running());
}

#[test]
fn should_drag_from_window_events() {
    let mut drag = DragRotation::default();

    assert!(drag.handle_window_event(&cursor_moved(100.0, 100.0)));
    assert!(drag.handle_window_event(&left_button(ElementState::Pressed)));
    assert!(drag.handle_window_event(&cursor_moved(110.0, 95.0)));
    assert!(drag.handle_window_event(&left_button(ElementState::Released)));
    drag.handle_window_event(&cursor_moved(0.0, 0.0));

    assert!(approx(drag.rotation_y(), 0.1));
    assert!(approx(drag.rotation_x(), -0.05));
}

#[test]
fn should_drag_with_any_mouse_button() {
    for button in [MouseButton::Right, MouseButton::Middle] {
        let mut drag = DragRotation::default();

        drag.handle_window_event(&cursor_moved(100.0, 100.0));
        assert!(drag.handle_window_event(&mouse(button, ElementState::Pressed)));
        assert!(drag.is_dragging());
        drag.handle_window_event(&cursor_moved(110.0, 95.0));
        drag.handle_window_event(&mouse(button, ElementState::Released));

        assert!(!drag.is_dragging());
        assert!(approx(drag.rotation_y(), 0.1), "{button:?}");
        assert!(approx(drag.rotation_x(), -0.05), "{button:?}");
    }
}

#[test]
fn should_consume_wheel_without_effect() {
    let mut drag = DragRotation::default();
    let before = drag.clone();
    let wheel = WindowEvent::MouseWheel {
        device_id: device(),
        delta: MouseScrollDelta::LineDelta(0.0, 3.0),
        phase: TouchPhase::Moved,
    };

    assert!(drag.handle_window_event(&wheel));
    assert_eq!(drag, before);
}

#[test]
fn should_ignore_unrelated_events() {
    let mut drag = DragRotation::default();
    assert!(!drag.handle_window_event(&WindowEvent::Focused(true)));
}
