//! Property-based tests
//!
//! Uses proptest to check the invariants that must hold for every reachable
//! state: scroll clamping under arbitrary move sequences, carousel wrap
//! laws, text field bounds, and line-wrap width guarantees.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;

use nodesmith::{Carousel, ChoiceList, Control, Dispatcher, StaticText, TextField, Verdict};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// =============================================================================
// ScrollingChoiceList invariants
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Move {
    Up,
    Down,
    PageUp,
    PageDown,
}

impl Move {
    fn code(self) -> KeyCode {
        match self {
            Move::Up => KeyCode::Up,
            Move::Down => KeyCode::Down,
            Move::PageUp => KeyCode::PageUp,
            Move::PageDown => KeyCode::PageDown,
        }
    }
}

fn move_strategy() -> impl Strategy<Value = Move> {
    prop_oneof![
        Just(Move::Up),
        Just(Move::Down),
        Just(Move::PageUp),
        Just(Move::PageDown),
    ]
}

fn choices(n: usize) -> Vec<(String, String)> {
    (0..n).map(|i| (format!("row {i}"), format!("k{i}"))).collect()
}

proptest! {
    /// After any move sequence: 0 <= cursor < viewport, top + cursor in
    /// range, and the viewport never reads past the end of the list.
    #[test]
    fn choice_list_clamping_invariants(
        len in 1usize..30,
        height in 3u16..10,
        moves in prop::collection::vec(move_strategy(), 0..100),
    ) {
        let viewport = (height - 2) as usize;
        let mut list = ChoiceList::new(0, 0, "L", choices(len), None, 40, height);
        for mv in moves {
            list.handle_key(key(mv.code()));
            prop_assert!(list.cursor() < viewport);
            prop_assert!(list.top() + list.cursor() < len);
            if len >= viewport {
                prop_assert!(list.top() + viewport <= len);
            } else {
                prop_assert_eq!(list.top(), 0);
            }
        }
    }

    /// The selected index is stable under down-then-up.
    #[test]
    fn choice_list_down_up_identity_away_from_edges(
        len in 5usize..30,
        height in 3u16..6,
    ) {
        let mut list = ChoiceList::new(0, 0, "L", choices(len), None, 40, height);
        list.handle_key(key(KeyCode::Down));
        let mid = list.selected_index();
        list.handle_key(key(KeyCode::Down));
        list.handle_key(key(KeyCode::Up));
        prop_assert_eq!(list.selected_index(), mid);
    }
}

// =============================================================================
// DropDownCarousel wrap laws
// =============================================================================

fn carousel(k: usize) -> Carousel {
    let choices: Vec<(String, String)> =
        (0..k).map(|i| (format!("opt {i}"), format!("h{i}"))).collect();
    Carousel::new(0, 0, "x: ", choices, 0)
}

proptest! {
    /// k consecutive "next" operations return the selection to its start.
    #[test]
    fn carousel_full_cycle_is_identity(k in 1usize..9, start in 0usize..9) {
        let mut c = carousel(k);
        let start = start % k;
        for _ in 0..start {
            c.handle_key(key(KeyCode::Right));
        }
        let origin = c.selected_index();
        for _ in 0..k {
            c.handle_key(key(KeyCode::Right));
        }
        prop_assert_eq!(c.selected_index(), origin);
    }

    /// One "next" followed by one "previous" is the identity.
    #[test]
    fn carousel_next_prev_is_identity(k in 1usize..9, steps in 0usize..20) {
        let mut c = carousel(k);
        for _ in 0..steps {
            c.handle_key(key(KeyCode::Right));
        }
        let origin = c.selected_index();
        c.handle_key(key(KeyCode::Right));
        c.handle_key(key(KeyCode::Left));
        prop_assert_eq!(c.selected_index(), origin);
    }

    /// The selection always names a real choice.
    #[test]
    fn carousel_selection_in_bounds(
        k in 1usize..9,
        moves in prop::collection::vec(prop::bool::ANY, 0..40),
    ) {
        let mut c = carousel(k);
        for right in moves {
            let code = if right { KeyCode::Right } else { KeyCode::Left };
            c.handle_key(key(code));
            prop_assert!(c.selected_index() < k);
        }
    }
}

// =============================================================================
// TextField bounds
// =============================================================================

proptest! {
    /// The buffer never exceeds its limit, whatever gets typed.
    #[test]
    fn text_field_respects_max_len(
        max_len in 1usize..20,
        input in prop::collection::vec(proptest::char::range('!', '~'), 0..60),
    ) {
        let mut field = TextField::new(0, 0, "x:", "", max_len);
        for c in input {
            field.handle_key(key(KeyCode::Char(c)));
            prop_assert!(field.text().len() <= max_len);
        }
    }

    /// Numeric mode admits digits only.
    #[test]
    fn numeric_field_holds_digits_only(
        input in prop::collection::vec(proptest::char::range(' ', '~'), 0..40),
    ) {
        let mut field = TextField::new(0, 0, "x:", "", 30).numeric();
        for c in input {
            field.handle_key(key(KeyCode::Char(c)));
        }
        prop_assert!(field.text().chars().all(|c| c.is_ascii_digit()));
    }

    /// Backspace after insert restores the previous buffer.
    #[test]
    fn text_field_insert_backspace_identity(
        prefix in "[a-z0-9]{0,8}",
        c in proptest::char::range('a', 'z'),
    ) {
        let mut field = TextField::new(0, 0, "x:", prefix.clone(), 20);
        field.handle_key(key(KeyCode::Char(c)));
        field.handle_key(key(KeyCode::Backspace));
        prop_assert_eq!(field.text(), prefix.as_str());
    }
}

// =============================================================================
// Focus traversal
// =============================================================================

proptest! {
    /// Repeated "next" over n focusable controls returns to the first after
    /// exactly n steps, never landing on a non-focusable one.
    #[test]
    fn focus_rotation_order(n in 1usize..8, gaps in prop::collection::vec(prop::bool::ANY, 1..8)) {
        let mut d = Dispatcher::new();
        let mut focusable = Vec::new();
        let mut row = 0u16;
        for (i, gap) in gaps.iter().enumerate() {
            if *gap {
                d.add(StaticText::new(row, 0, format!("gap {i}")));
                row += 1;
            }
            if focusable.len() < n {
                focusable.push(d.add(TextField::new(row, 0, "f:", "", 4)));
                row += 1;
            }
        }
        while focusable.len() < n {
            focusable.push(d.add(TextField::new(row, 0, "f:", "", 4)));
            row += 1;
        }
        d.focus_first().unwrap();
        prop_assert_eq!(d.focused_id(), Some(focusable[0]));
        for step in 0..n {
            let outcome = d.dispatch(key(KeyCode::Tab)).unwrap();
            prop_assert_eq!(outcome.verdict, Verdict::NotHandled);
            let expect = focusable[(step + 1) % n];
            prop_assert_eq!(d.focused_id(), Some(expect));
        }
    }
}

// =============================================================================
// Line wrapping
// =============================================================================

proptest! {
    /// Wrapped lines stay within the width, and no non-space content is lost.
    #[test]
    fn wrap_line_respects_width(
        text in "[ -~]{0,200}",
        width in 10usize..80,
    ) {
        let lines = nodesmith::review::wrap_line(&text, width, 0);
        prop_assert!(!lines.is_empty());
        for line in &lines {
            prop_assert!(line.len() <= width, "line {:?} wider than {}", line, width);
        }
        let joined: String = lines.concat().split_whitespace().collect::<Vec<_>>().join("");
        let original: String = text.split_whitespace().collect::<Vec<_>>().join("");
        prop_assert_eq!(joined, original);
    }
}
