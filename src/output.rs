use std::cell::RefCell;
use std::fmt;

use colored::Colorize;

thread_local! {
    static IS_MINIMAL: RefCell<bool> = const { RefCell::new(false) };
}

/// Suppress status messages and colors, for blackbox tests.
///
/// Returns the previous value.
pub fn set_minimal(new_value: bool) -> bool {
    if new_value {
        colored::control::set_override(false);
    } else {
        colored::control::unset_override();
    }
    IS_MINIMAL.with(|value| value.replace(new_value))
}

pub fn is_minimal() -> bool {
    IS_MINIMAL.with(|value| *value.borrow())
}

#[derive(Clone, Copy, Debug)]
pub enum MsgColor {
    Green,
    Cyan,
    Red,
}

/// Print a status line to stderr, as `    Assembling target foo.as`.
///
/// Silent if minimal.
pub fn message(color: MsgColor, left: &str, right: impl fmt::Display) {
    if is_minimal() {
        return;
    }
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}
