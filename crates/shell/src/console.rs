//! Console front-end.
//!
//! Stands in for a native window toolkit: each stdin line becomes user
//! input posted to the UI dispatch queue. A line is either a key chord
//! such as `ctrl+t` or a `:command`.

use std::fmt::Write as _;
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use common::Poster;
use thiserror::Error;
use tracing::{debug, warn};
use ui::{ChromeAction, ChromeControl, FocusState, Key, KeyCombo, UiTask, UserInput, Window};

/// Console commands, for help output.
pub const COMMANDS: &[(&str, &str)] = &[
    (":open <text>", "navigate the selected tab"),
    (":type <text>", "type into the focused chrome control"),
    (":back", "go back"),
    (":forward", "go forward"),
    (":reload", "reload"),
    (":new-tab", "open a tab"),
    (":close-tab", "close the selected tab"),
    (":select <n>", "select tab n, counting from 1"),
    (":focus-page", "give keyboard focus to the page"),
    (":focus-address", "give keyboard focus to the address field"),
    (":quit", "close the window"),
];

/// Console input errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid tab number: {0}")]
    InvalidTabNumber(String),

    #[error("invalid key chord: {0}")]
    InvalidKey(String),
}

/// Parse one console line into user input.
pub fn parse_line(line: &str) -> Result<Vec<UserInput>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let Some(command) = line.strip_prefix(':') else {
        return KeyCombo::parse(line)
            .map(|combo| vec![UserInput::Key(combo)])
            .map_err(|_| ConsoleError::InvalidKey(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let input = match name {
        "open" => {
            if arg.is_empty() {
                return Err(ConsoleError::MissingArgument(":open"));
            }
            UserInput::Submit(arg.to_string())
        }
        "type" => {
            if arg.is_empty() {
                return Err(ConsoleError::MissingArgument(":type"));
            }
            return Ok(arg
                .chars()
                .map(|c| {
                    let key = if c == ' ' { Key::Space } else { Key::Char(c) };
                    UserInput::Key(KeyCombo::plain(key))
                })
                .collect());
        }
        "back" => UserInput::Click(ChromeControl::Back),
        "forward" => UserInput::Click(ChromeControl::Forward),
        "reload" => UserInput::Click(ChromeControl::Reload),
        "new-tab" => UserInput::Action(ChromeAction::NewTab),
        "close-tab" => UserInput::Action(ChromeAction::CloseTab),
        "select" => {
            if arg.is_empty() {
                return Err(ConsoleError::MissingArgument(":select"));
            }
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 => UserInput::SelectTab(n - 1),
                _ => return Err(ConsoleError::InvalidTabNumber(arg.to_string())),
            }
        }
        "focus-page" => UserInput::FocusSurface,
        "focus-address" => UserInput::Action(ChromeAction::FocusAddressBar),
        "quit" => UserInput::Close,
        _ => return Err(ConsoleError::UnknownCommand(name.to_string())),
    };
    Ok(vec![input])
}

/// Post every line of `reader` to the dispatch queue, then a close request.
///
/// Stops early once the queue is gone.
pub fn read_commands<R: BufRead>(reader: R, poster: &Poster<UiTask>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("console read failed: {}", e);
                break;
            }
        };

        match parse_line(&line) {
            Ok(inputs) => {
                for input in inputs {
                    if !poster.post(UiTask::Input(input)) {
                        return;
                    }
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    debug!("console input closed");
    poster.post(UiTask::Input(UserInput::Close));
}

/// Read stdin on its own thread.
pub fn spawn_reader(poster: Poster<UiTask>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || read_commands(io::stdin().lock(), &poster))
}

/// Help text.
pub fn help() -> String {
    let mut out = String::from("key chords (e.g. ctrl+t) or commands:\n");
    for (command, description) in COMMANDS {
        let _ = writeln!(out, "  {:<16} {}", command, description);
    }
    out
}

/// One-screen summary of the window.
pub fn describe(window: &Window) -> String {
    let focus = match window.focus_state() {
        FocusState::HostFocused => "chrome".to_string(),
        FocusState::EngineFocused(browser) => browser.to_string(),
    };

    let mut out = format!("tabs: {} | focus: {}\n", window.tabs().count(), focus);
    let selected = window.tabs().selected_id();
    for (index, tab) in window.tabs().tabs().iter().enumerate() {
        let marker = if Some(tab.id()) == selected { '>' } else { ' ' };
        let _ = writeln!(out, "{} {} {} {}", marker, index + 1, tab.title(), tab.url());
    }
    out
}
