use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use records_core::{
    FieldValue, Msg, RecordId, RecordPatch, SortDirection, SortSpec, StatusFilter,
};
use records_engine::report::ReportColumn;
use serde_json::Value;

use crate::render::{render_chart, render_notice, render_table};
use crate::session::Session;

const CONFIRM_PROMPT: &str = "Are you sure you want to delete this record? (yes/no)";

const HELP: &str = "\
commands:
  show                          print the visible records
  search [text]                 filter on any field (empty clears)
  status all|in progress|completed
  sort <field> [asc|desc|none]  without a direction, cycles like a header click
  delete <id>                   asks for confirmation, answer yes or no
  edit <id>                     prompts for field=value pairs
  update <id> field=value...    submits an edit directly
  tally                         status chart over all records
  export                        write the visible records to a PDF report
  refresh                       reload from the service
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Show,
    Search(String),
    Status(StatusFilter),
    Sort {
        field: String,
        direction: Option<SortDirection>,
    },
    Delete(RecordId),
    Confirm,
    Cancel,
    Edit(RecordId),
    Update {
        id: RecordId,
        patch: RecordPatch,
    },
    Tally,
    Export,
    Refresh,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_ascii_lowercase().as_str() {
        "show" | "list" | "ls" => Ok(ConsoleCommand::Show),
        "search" | "find" => Ok(ConsoleCommand::Search(rest.to_string())),
        "status" => StatusFilter::parse(rest)
            .map(ConsoleCommand::Status)
            .ok_or_else(|| format!("unknown status '{rest}'")),
        "sort" => parse_sort(rest),
        "delete" | "rm" => required_id(rest).map(ConsoleCommand::Delete),
        "yes" | "y" => Ok(ConsoleCommand::Confirm),
        "no" | "n" => Ok(ConsoleCommand::Cancel),
        "edit" => required_id(rest).map(ConsoleCommand::Edit),
        "update" => {
            let mut parts = rest.split_whitespace();
            let id = required_id(parts.next().unwrap_or(""))?;
            let assignments: Vec<String> = parts.map(str::to_string).collect();
            let patch = parse_patch(&assignments)?;
            Ok(ConsoleCommand::Update { id, patch })
        }
        "tally" | "chart" => Ok(ConsoleCommand::Tally),
        "export" | "report" => Ok(ConsoleCommand::Export),
        "refresh" | "reload" => Ok(ConsoleCommand::Refresh),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

fn parse_sort(rest: &str) -> Result<ConsoleCommand, String> {
    let mut parts = rest.split_whitespace();
    let field = parts
        .next()
        .ok_or_else(|| "sort needs a field name".to_string())?
        .to_string();
    let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None => None,
        Some("asc" | "ascending") => Some(SortDirection::Ascending),
        Some("desc" | "descending") => Some(SortDirection::Descending),
        Some("none" | "off") => Some(SortDirection::Unsorted),
        Some(other) => return Err(format!("unknown sort direction '{other}'")),
    };
    Ok(ConsoleCommand::Sort { field, direction })
}

fn required_id(raw: &str) -> Result<RecordId, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        Err("missing record id".to_string())
    } else {
        Ok(RecordId::new(raw))
    }
}

/// Builds a patch from `field=value` pairs. Values that read as JSON
/// numbers, booleans or null keep that type; everything else is text.
pub fn parse_patch(assignments: &[String]) -> Result<RecordPatch, String> {
    let mut patch = RecordPatch::new();
    for assignment in assignments {
        let (field, raw) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected field=value, got '{assignment}'"))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(format!("missing field name in '{assignment}'"));
        }
        let value = match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
            _ => Value::String(raw.to_string()),
        };
        patch.set(field, FieldValue::from_json(&value));
    }
    Ok(patch)
}

/// Interactive line-oriented front end over a [`Session`].
pub struct Console<'a> {
    session: &'a mut Session,
    columns: Vec<ReportColumn>,
    settle_timeout: Duration,
}

impl<'a> Console<'a> {
    pub fn new(
        session: &'a mut Session,
        columns: Vec<ReportColumn>,
        settle_timeout: Duration,
    ) -> Self {
        Self {
            session,
            columns,
            settle_timeout,
        }
    }

    /// Reads commands until `quit` or end of input. Reports are written in
    /// the background; their outcome is printed at the next prompt, and
    /// any still running are waited for before returning.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        self.session.dispatch(Msg::RefreshRequested);
        self.wait(output, false)?;
        self.report(output, true)?;

        let mut lines = input.lines();
        loop {
            while self.session.try_step() {
                self.print_notice(output)?;
            }
            write!(output, "> ")?;
            output.flush()?;
            let Some(line) = lines.next().transpose()? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(output, "{message}")?;
                    continue;
                }
            };
            if command == ConsoleCommand::Quit {
                break;
            }
            self.execute(command, &mut lines, output)?;
        }
        if self.session.reports_pending() > 0 {
            writeln!(output, "waiting for the report to finish")?;
            self.wait(output, true)?;
        }
        Ok(())
    }

    fn execute<I, W>(&mut self, command: ConsoleCommand, lines: &mut I, output: &mut W) -> io::Result<()>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        let show_table = match command {
            ConsoleCommand::Show => true,
            ConsoleCommand::Help => {
                writeln!(output, "{HELP}")?;
                false
            }
            ConsoleCommand::Tally => {
                write!(output, "{}", render_chart(&self.session.view().chart))?;
                false
            }
            ConsoleCommand::Search(text) => {
                self.session.dispatch(Msg::SearchChanged(text));
                true
            }
            ConsoleCommand::Status(filter) => {
                self.session.dispatch(Msg::StatusFilterChanged(filter));
                true
            }
            ConsoleCommand::Sort { field, direction } => {
                let msg = match direction {
                    None => Msg::ColumnClicked(field),
                    Some(direction) => Msg::SortRequested(SortSpec::by(field, direction)),
                };
                self.session.dispatch(msg);
                true
            }
            ConsoleCommand::Delete(id) => {
                self.session.dispatch(Msg::DeleteClicked(id.clone()));
                if self.session.view().pending_delete.as_ref() == Some(&id) {
                    writeln!(output, "{CONFIRM_PROMPT}")?;
                } else {
                    writeln!(output, "no record with id {id}")?;
                }
                false
            }
            ConsoleCommand::Confirm => {
                self.session.dispatch(Msg::DeleteConfirmed);
                false
            }
            ConsoleCommand::Cancel => {
                self.session.dispatch(Msg::DeleteCancelled);
                false
            }
            ConsoleCommand::Edit(id) => {
                let edits = self.session.dispatch(Msg::EditClicked(id));
                match edits.into_iter().next() {
                    Some(id) => self.prompt_edit(id, lines, output)?,
                    None => writeln!(output, "no such record")?,
                }
                false
            }
            ConsoleCommand::Update { id, patch } => {
                self.session.dispatch(Msg::UpdateSubmitted { id, patch });
                false
            }
            ConsoleCommand::Export => {
                self.session.dispatch(Msg::ExportClicked);
                false
            }
            ConsoleCommand::Refresh => {
                self.session.dispatch(Msg::RefreshRequested);
                true
            }
            ConsoleCommand::Quit => false,
        };
        self.wait(output, false)?;
        self.report(output, show_table)
    }

    /// Applies engine results as they arrive, printing each notice, until
    /// no record request is outstanding (and no report, when asked) or the
    /// settle timeout passes.
    fn wait<W: Write>(&mut self, output: &mut W, include_reports: bool) -> io::Result<()> {
        let deadline = Instant::now() + self.settle_timeout;
        loop {
            let mut pending = self.session.requests_pending();
            if include_reports {
                pending += self.session.reports_pending();
            }
            if pending == 0 {
                return Ok(());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return writeln!(output, "still waiting on {pending} request(s), giving up");
            }
            if self.session.step(remaining) {
                self.print_notice(output)?;
            }
        }
    }

    fn prompt_edit<I, W>(&mut self, id: RecordId, lines: &mut I, output: &mut W) -> io::Result<()>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        writeln!(output, "editing {id}: enter field=value pairs (blank to cancel)")?;
        write!(output, "edit> ")?;
        output.flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let assignments: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if assignments.is_empty() {
            return writeln!(output, "edit cancelled");
        }
        match parse_patch(&assignments) {
            Ok(patch) => {
                self.session.dispatch(Msg::UpdateSubmitted { id, patch });
                Ok(())
            }
            Err(message) => writeln!(output, "{message}"),
        }
    }

    /// Prints the latest notice (once) and, when asked, the table.
    fn report<W: Write>(&mut self, output: &mut W, show_table: bool) -> io::Result<()> {
        self.print_notice(output)?;
        if show_table {
            write!(output, "{}", render_table(&self.session.view(), &self.columns))?;
        }
        self.session.consume_dirty();
        Ok(())
    }

    fn print_notice<W: Write>(&mut self, output: &mut W) -> io::Result<()> {
        if let Some(notice) = self.session.view().notice {
            writeln!(output, "{}", render_notice(&notice))?;
            self.session.dispatch(Msg::NoticeDismissed);
        }
        Ok(())
    }
}
