#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use std::thread;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn buffer_captures_text_and_lines() {
    let handler = buffer_handler();
    handler.write("a");
    handler.write(" b");
    handler.write_line("!");
    assert_eq!(handler.captured(), "a b!\n");
}

#[test]
fn take_drains_the_buffer() {
    let handler = buffer_handler();
    handler.write_line("first");
    assert_eq!(handler.take(), "first\n");
    assert!(handler.captured().is_empty());
}

#[test]
fn silent_and_stdout_capture_nothing() {
    for handler in [silent_handler(), handler_for(OutputMode::Silent)] {
        handler.write_line("dropped");
        assert_eq!(handler.captured(), "");
        assert_eq!(handler.take(), "");
    }
    assert_eq!(stdout_handler().captured(), "");
}

#[test]
fn mode_selects_the_handler() {
    assert!(matches!(*handler_for(OutputMode::Buffer), OutputHandler::Buffer(_)));
    assert!(matches!(*handler_for(OutputMode::Stdout), OutputHandler::Stdout));
}

#[test]
fn shared_buffer_is_thread_safe() {
    let handler = buffer_handler();
    let other = Arc::clone(&handler);
    let writer = thread::spawn(move || {
        for _ in 0..100 {
            other.write_line("a");
        }
    });
    for _ in 0..100 {
        handler.write_line("b");
    }
    writer.join().unwrap();
    assert_eq!(handler.captured().lines().count(), 200);
}
