//! Terminal implementations of the host collaborators.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use calnote_core::format::format_date;
use calnote_core::{Locale, Result};
use calnote_resolver::labels::{HeaderLabel, LabelDecorator, WeekRow};
use calnote_resolver::{Confirm, Decision, Notifier, OpenState, OpenTarget, PaneId, Prompt, Workspace};
use calnote_vault::NoteFile;

/// Marker printed next to periods that already have a note.
const NOTE_MARK: &str = "•";

/// Reports opened notes on stderr. A terminal has one pane; a split
/// request still gets its own id so callers can tell them apart.
#[derive(Debug)]
pub struct TerminalWorkspace {
    root: PathBuf,
    panes: u32,
}

impl TerminalWorkspace {
    pub fn new(root: PathBuf) -> Self {
        Self { root, panes: 0 }
    }
}

impl Workspace for TerminalWorkspace {
    fn acquire_pane(&mut self, target: OpenTarget) -> PaneId {
        if target == OpenTarget::Split || self.panes == 0 {
            self.panes += 1;
        }
        PaneId(self.panes)
    }

    fn open_file(&mut self, pane: PaneId, file: &NoteFile, state: OpenState) -> Result<()> {
        let absolute = file
            .path
            .as_str()
            .split('/')
            .fold(self.root.clone(), |acc, seg| acc.join(seg));
        tracing::info!(pane = pane.0, active = state.active, path = %file.path, "opened note");
        eprintln!("Opened {}", absolute.display());
        Ok(())
    }
}

/// Asks on stderr and reads the answer from stdin. End of input counts
/// as closing the prompt.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &Prompt) -> Decision {
        eprint!("{}: {} [{}? y/N] ", prompt.title, prompt.message, prompt.cta);
        let _ = io::stderr().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => Decision::Dismiss,
            Ok(_) => match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => Decision::Accept,
                _ => Decision::Decline,
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Collects header labels into a single printable line.
#[derive(Debug, Default)]
pub struct HeaderLine {
    pub labels: Vec<HeaderLabel>,
}

impl LabelDecorator for HeaderLine {
    fn decorate(&mut self, label: &HeaderLabel) {
        self.labels.push(label.clone());
    }
}

impl HeaderLine {
    pub fn render(&self) -> String {
        self.labels
            .iter()
            .map(|label| {
                if label.has_note {
                    format!("{} {NOTE_MARK}", label.text)
                } else {
                    label.text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Month grid with week numbers; notes are marked after the day number.
pub fn render_grid(rows: &[WeekRow], locale: &Locale) -> String {
    let mut out = String::new();
    let Some(first) = rows.first() else {
        return out;
    };

    out.push_str("  Wk ");
    for day in &first.days {
        out.push_str(&format!(" {:<3}", format_date(day.date, "dd", locale)));
    }
    out.push('\n');

    for row in rows {
        let mark = if row.has_note { NOTE_MARK } else { " " };
        out.push_str(&format!("{:>3}{mark} ", row.number));
        for day in &row.days {
            if !day.in_month {
                out.push_str("    ");
                continue;
            }
            let mark = if day.has_note { NOTE_MARK } else { " " };
            out.push_str(&format!(" {:>2}{mark}", format_date(day.date, "D", locale)));
        }
        out.push('\n');
    }
    out
}
