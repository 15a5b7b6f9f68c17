mod common;

use std::sync::Arc;

use common::{executor, parse, TouchOnPress};
use touchdeck_core::action::RELEASE_KEYS_NAME;
use touchdeck_core::keys::{KEY_F1, KEY_LEFT_CTRL, KEY_LEFT_SHIFT, KEY_RIGHT_ALT};
use touchdeck_core::{
    run_until_idle, ActionKind, ExecutionQueue, KeyCode, KeyTable, LoggingTransport, NeverCancel,
    ParseError, StrokeMode, TouchSignal, TransportEvent,
};

use TransportEvent::{Press, Release, ReleaseAll, Write};

#[test]
fn text_and_tokens_interleave_in_source_order() {
    let outcome = parse("ab{F1}cd{MENU,home}ef");
    assert!(outcome.success());
    let names: Vec<_> = outcome
        .sequence
        .actions()
        .iter()
        .map(|action| (action.kind(), action.name().to_string()))
        .collect();
    assert_eq!(
        names,
        vec![
            (ActionKind::Keyboard, "ab".to_string()),
            (ActionKind::Keyboard, "F1".to_string()),
            (ActionKind::Keyboard, "cd".to_string()),
            (ActionKind::Local, "MENU".to_string()),
            (ActionKind::Keyboard, "ef".to_string()),
        ]
    );
}

#[test]
fn one_release_action_collects_every_modifier() {
    let outcome = parse("{LEFT_SHIFT}x{RIGHT_ALT}{F1}{LEFT_CTRL}");
    let actions = outcome.sequence.actions();
    let release = actions.last().expect("release action");
    assert_eq!(release.name(), RELEASE_KEYS_NAME);
    assert_eq!(
        release.values(),
        &[KEY_LEFT_SHIFT, KEY_RIGHT_ALT, KEY_LEFT_CTRL]
    );
    let releases = actions
        .iter()
        .filter(|action| action.name() == RELEASE_KEYS_NAME)
        .count();
    assert_eq!(releases, 1);
}

#[test]
fn one_bad_token_among_valid_ones() {
    let outcome = parse("{F1}{NOT_A_KEY}{F2}");
    assert!(!outcome.success());
    assert_eq!(outcome.sequence.len(), 2);
    assert!(matches!(
        outcome.errors.as_slice(),
        [ParseError::Token { token, .. }] if token == "NOT_A_KEY"
    ));
}

#[test]
fn key_classification_does_not_depend_on_context() {
    let keys = KeyTable::standard();
    for text in ["{LEFT_CTRL}", "a{LEFT_CTRL,10}", "{MUTE}{LEFT_CTRL}"] {
        let outcome = parse(text);
        let ctrl = outcome
            .sequence
            .actions()
            .iter()
            .find(|action| action.name() == "LEFT_CTRL")
            .expect("ctrl action");
        assert_eq!(ctrl.needs_release(), keys.needs_release("LEFT_CTRL"));
        assert!(!ctrl.needs_double_byte());
    }
    assert!(keys.is_double_byte("MUTE"));
    assert!(!keys.needs_release("MUTE"));
}

#[test]
fn definition_examples() {
    let hello = parse("Hello{F1}");
    assert!(hello.success());
    assert_eq!(hello.sequence.actions()[0].values(), b"Hello");
    assert_eq!(hello.sequence.actions()[1].values(), &[KEY_F1]);

    let copy = parse("{LEFT_CTRL}{c}");
    assert!(!copy.success());
    let names: Vec<_> = copy.sequence.actions().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["LEFT_CTRL", RELEASE_KEYS_NAME]);

    let empty = parse("");
    assert_eq!(empty.errors, vec![ParseError::Empty]);
    assert!(empty.sequence.is_empty());

    let unknown = parse("{unknownKey}");
    assert!(!unknown.success());
    assert!(unknown.sequence.is_empty());

    let mute = parse("{MUTE}");
    let action = &mute.sequence.actions()[0];
    assert!(action.needs_double_byte());
    assert_eq!(action.values().len(), 2);
}

#[tokio::test]
async fn queued_button_runs_in_order() {
    let transport = Arc::new(LoggingTransport::new());
    let exec = executor(transport.clone(), Arc::new(NeverCancel));
    let outcome = parse("{LEFT_CTRL}{MENU,home}{VOLUME_UP}k");
    assert!(outcome.sequence.execute(exec.queue()).await);
    assert_eq!(exec.queue().size().await, 5);

    assert_eq!(run_until_idle(&exec).await, 5);
    assert_eq!(
        transport.events(),
        vec![
            Press(KeyCode::Key(KEY_LEFT_CTRL)),
            Write(KeyCode::Media([32, 0])),
            Press(KeyCode::Key(b'k')),
            Release(KeyCode::Key(b'k')),
            Release(KeyCode::Key(KEY_LEFT_CTRL)),
        ]
    );
}

#[tokio::test]
async fn touch_mid_sequence_releases_held_keys_and_drops_the_rest() {
    let signal = Arc::new(TouchSignal::new());
    let transport = Arc::new(TouchOnPress::new(signal.clone(), 2));
    let exec = executor(transport.clone(), signal);
    let outcome = parse("{LEFT_CTRL}{LEFT_SHIFT}abc");
    assert!(outcome.sequence.execute(exec.queue()).await);

    assert_eq!(run_until_idle(&exec).await, 2);
    assert_eq!(
        transport.recorder.events(),
        vec![
            Press(KeyCode::Key(KEY_LEFT_CTRL)),
            Press(KeyCode::Key(KEY_LEFT_SHIFT)),
            ReleaseAll,
        ]
    );
    assert_eq!(exec.queue().size().await, 0);
}

#[tokio::test]
async fn pressing_a_button_twice_queues_it_twice() {
    let queue = ExecutionQueue::default();
    let outcome = parse("hi");
    assert!(outcome.sequence.execute(&queue).await);
    assert!(outcome.sequence.execute(&queue).await);
    assert_eq!(queue.size().await, 2);
    let first = queue.dequeue_keyboard().await.expect("action");
    match first.payload() {
        touchdeck_core::Payload::Keyboard(strokes) => assert_eq!(strokes.mode, StrokeMode::Tap),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_tap_leaves_earlier_modifier_pressed() {
    let signal = Arc::new(TouchSignal::new());
    let transport = Arc::new(TouchOnPress::new(signal.clone(), 2));
    let exec = executor(transport.clone(), signal);
    let outcome = parse("{LEFT_CTRL}abc");
    assert!(outcome.sequence.execute(exec.queue()).await);

    assert_eq!(run_until_idle(&exec).await, 2);
    // Tap actions do not trigger release_all and the trailing release was
    // dropped with the rest of the keyboard queue.
    assert_eq!(
        transport.recorder.events(),
        vec![
            Press(KeyCode::Key(KEY_LEFT_CTRL)),
            Press(KeyCode::Key(b'a')),
            Release(KeyCode::Key(b'a')),
        ]
    );
    assert_eq!(exec.queue().size().await, 0);
}
