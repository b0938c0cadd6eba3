// UI layer: the static menu, choice parsing and the read-eval loop.
// Input goes through the `Prompt` trait (backed by `dialoguer` in the real
// binary) and output through any `io::Write`, so the loop can be driven
// from tests.

use crate::actions::{Request, Session};
use crate::api::ApiError;
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::num::IntErrorKind;
use std::time::Duration;
use tracing::debug;

const FIRST_PROMPT: &str = "Enter your choice, or 'exit' to quit";
const NEXT_PROMPT: &str = "Enter your choice (or type 'menu' to see options, 'exit' to quit)";

/// Source of user input lines.
pub trait Prompt {
    /// Show `prompt` and return the line the user typed (may be empty).
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Interactive prompt on the terminal, using `dialoguer`.
pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        TerminalPrompt {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let line: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(line)
    }
}

/// Every operation reachable from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListAssistants,
    ListThreads,
    CreateThread,
    DeleteThread,
    ListMessages,
    ListFiles,
    UploadFile,
    DeleteFile,
}

impl Action {
    /// Ask for whatever argument the action needs and build the request.
    /// No remote call happens here.
    pub fn collect(self, input: &mut dyn Prompt) -> Result<Request> {
        let request = match self {
            Action::ListAssistants => Request::ListAssistants,
            Action::ListThreads => Request::ListThreads,
            Action::CreateThread => Request::CreateThread,
            Action::DeleteThread => {
                Request::DeleteThread(ask(input, "Enter the thread ID to delete")?)
            }
            Action::ListMessages => Request::ListMessages(ask(input, "Enter the thread ID")?),
            Action::ListFiles => Request::ListFiles,
            Action::UploadFile => Request::UploadFile(ask(
                input,
                "Enter the RELATIVE path of the file to upload",
            )?),
            Action::DeleteFile => {
                let id = ask(input, "Enter the file ID to delete")?;
                Request::DeleteFile(Some(id).filter(|id| !id.is_empty()))
            }
        };
        Ok(request)
    }
}

/// Read a line and trim surrounding whitespace.
pub(crate) fn ask(input: &mut dyn Prompt, prompt: &str) -> Result<String> {
    Ok(input.read_line(prompt)?.trim().to_string())
}

/// A line of the menu: either a section title or a selectable action.
#[derive(Debug, Clone, Copy)]
pub enum MenuEntry {
    Header(&'static str),
    Item(&'static str, Action),
}

/// Display order of the menu. Selectable entries are numbered from 1 in
/// this order, skipping headers, and the same order drives dispatch.
pub const MENU: &[MenuEntry] = &[
    MenuEntry::Header("🤖 Assistants"),
    MenuEntry::Item("List Assistants", Action::ListAssistants),
    MenuEntry::Header("🧵 Threads"),
    MenuEntry::Item("List Threads", Action::ListThreads),
    MenuEntry::Item("Create a Thread", Action::CreateThread),
    MenuEntry::Item("Delete a Thread", Action::DeleteThread),
    MenuEntry::Item("List Messages For Thread", Action::ListMessages),
    MenuEntry::Header("📄 Files"),
    MenuEntry::Item("List Files", Action::ListFiles),
    MenuEntry::Item("Upload a File", Action::UploadFile),
    MenuEntry::Item("Delete a File", Action::DeleteFile),
];

/// Selectable entries only, in dispatch order.
pub fn actions() -> Vec<(&'static str, Action)> {
    MENU.iter()
        .filter_map(|entry| match *entry {
            MenuEntry::Item(label, action) => Some((label, action)),
            MenuEntry::Header(_) => None,
        })
        .collect()
}

pub fn display_menu(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "\n{}", "OpenAI API Tools:".bold())?;
    let mut number = 0;
    for entry in MENU {
        match entry {
            MenuEntry::Header(title) => writeln!(out, "\n{}", format!("{}:", title).bold())?,
            MenuEntry::Item(label, _) => {
                number += 1;
                writeln!(out, "   {}. {}", number, label)?;
            }
        }
    }
    Ok(())
}

/// What the user asked for at the main prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Menu,
    Exit,
    Run(Action),
    OutOfRange,
    NotANumber,
}

pub fn parse_choice(input: &str) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("menu") {
        return Choice::Menu;
    }
    if input.eq_ignore_ascii_case("exit") {
        return Choice::Exit;
    }
    let actions = actions();
    match pick_number(input, actions.len()) {
        Pick::Index(i) => Choice::Run(actions[i].1),
        Pick::OutOfRange => Choice::OutOfRange,
        Pick::NotANumber => Choice::NotANumber,
    }
}

/// Result of reading a 1-based list number typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pick {
    /// Zero-based index into the list.
    Index(usize),
    OutOfRange,
    NotANumber,
}

/// Any integer counts as a number, however large; only integers in
/// `1..=len` pick an entry.
pub(crate) fn pick_number(input: &str, len: usize) -> Pick {
    match input.trim().parse::<i64>() {
        Ok(n) => match usize::try_from(n) {
            Ok(n) if (1..=len).contains(&n) => Pick::Index(n - 1),
            _ => Pick::OutOfRange,
        },
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Pick::OutOfRange
        }
        Err(_) => Pick::NotANumber,
    }
}

/// Main interactive loop. Shows the menu once, then keeps prompting until
/// the user types `exit`.
///
/// Errors reported by the remote service are printed and the loop goes on.
/// Anything else (unreadable upload file, corrupt thread store, broken
/// terminal) is returned and ends the program.
pub fn main_menu(session: &mut Session) -> Result<()> {
    display_menu(session.out)?;
    let mut prompt = FIRST_PROMPT;
    loop {
        let line = session.input.read_line(prompt)?;
        prompt = NEXT_PROMPT;

        match parse_choice(&line) {
            Choice::Menu => display_menu(session.out)?,
            Choice::Exit => {
                writeln!(session.out, "Have a nice day! 😃")?;
                break;
            }
            Choice::OutOfRange => writeln!(session.out, "Invalid choice. Please try again.")?,
            Choice::NotANumber => {
                writeln!(session.out, "Invalid choice. Please enter a number.")?
            }
            Choice::Run(action) => {
                debug!(?action, "running menu action");
                let result = action
                    .collect(session.input)
                    .and_then(|request| session.execute(request));
                if let Err(err) = result {
                    match err.downcast_ref::<ApiError>() {
                        Some(api_err) => writeln!(session.out, "Error: {}", api_err)?,
                        None => return Err(err),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Run a blocking call behind a transient spinner on stderr. The spinner
/// stays hidden when stderr is not a terminal.
pub fn with_spinner<T>(message: &str, call: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = call();
    spinner.finish_and_clear();
    result
}
