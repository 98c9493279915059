use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use fakemig::PasswordPrompt;

/// Reads a password from the terminal without echoing it.
///
/// Falls back to reading one line from stdin when stdin is not a terminal.
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn prompt(&self, message: &str) -> io::Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{message}")?;
        stderr.flush()?;

        if !io::stdin().is_terminal() {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;

            return Ok(line.trim_end_matches(['\r', '\n']).to_owned());
        }

        enable_raw_mode()?;
        let res = read_hidden();
        disable_raw_mode()?;

        writeln!(stderr)?;

        res
    }
}

fn read_hidden() -> io::Result<String> {
    let mut value = String::new();

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };

        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Enter => return Ok(value),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Esc => return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled")),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Char(c) => value.push(c),
            _ => {}
        }
    }
}
