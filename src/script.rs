use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

use crate::models::{Filter, Priority, TaskId};
use crate::state::{reduce, Action, TodoState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        text: String,
        due_date: String,
        priority: Priority,
    },
    Toggle(usize),
    Delete(usize),
    Edit(usize, String),
    Due(usize, String),
    SetPriority(usize, Priority),
    Clear,
    Filter(Filter),
    Show,
}

fn position(arg: Option<&str>) -> Result<usize> {
    let arg = arg.context("missing task position")?;
    let n: usize = arg
        .parse()
        .with_context(|| format!("'{}' is not a task position", arg))?;
    if n == 0 {
        bail!("task positions start at 1");
    }
    Ok(n)
}

impl Command {
    /// Parses one script line. Returns `None` for blank lines and comments.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let command = match verb {
            "add" => {
                let mut text = Vec::new();
                let mut due_date = String::new();
                let mut priority = Priority::Low;
                while let Some(word) = words.next() {
                    match word {
                        "--due" => {
                            due_date = words.next().context("--due needs a date")?.to_string();
                        }
                        "--priority" => {
                            priority = words.next().context("--priority needs a value")?.parse()?;
                        }
                        _ => text.push(word),
                    }
                }
                Command::Add {
                    text: text.join(" "),
                    due_date,
                    priority,
                }
            }
            "toggle" => Command::Toggle(position(words.next())?),
            "delete" => Command::Delete(position(words.next())?),
            "edit" => {
                let n = position(words.next())?;
                Command::Edit(n, words.collect::<Vec<_>>().join(" "))
            }
            "due" => {
                let n = position(words.next())?;
                Command::Due(n, words.next().unwrap_or_default().to_string())
            }
            "priority" => {
                let n = position(words.next())?;
                let priority = words.next().context("missing priority")?.parse()?;
                Command::SetPriority(n, priority)
            }
            "clear" => Command::Clear,
            "filter" => Command::Filter(words.next().context("missing filter")?.parse()?),
            "show" => Command::Show,
            other => bail!("unknown command '{}'", other),
        };
        Ok(Some(command))
    }
}

/// Drives a [`TodoState`] from text commands, printing the list on `show`.
pub struct ScriptRunner<W: Write> {
    pub state: TodoState,
    out: W,
}

impl<W: Write> ScriptRunner<W> {
    pub fn new(state: TodoState, out: W) -> Self {
        ScriptRunner { state, out }
    }

    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            let command = Command::parse(&line).with_context(|| format!("line {}", i + 1))?;
            if let Some(command) = command {
                self.execute(command)?;
            }
        }
        Ok(())
    }

    /// Id of the task at 1-based position `n` in the visible list.
    fn id_at(&self, n: usize) -> Option<TaskId> {
        let i = n.checked_sub(1)?;
        self.state.visible().get(i).map(|task| task.id)
    }

    pub fn execute(&mut self, command: Command) -> Result<()> {
        let action = match command {
            Command::Add {
                text,
                due_date,
                priority,
            } => {
                self.state.apply(Action::SetDraftText(text));
                self.state.apply(Action::SetDraftDueDate(due_date));
                self.state.apply(Action::SetDraftPriority(priority));
                Some(Action::Add)
            }
            Command::Toggle(n) => self.id_at(n).map(Action::ToggleComplete),
            Command::Delete(n) => self.id_at(n).map(Action::Delete),
            Command::Edit(n, text) => self.id_at(n).map(|id| Action::EditText(id, text)),
            Command::Due(n, date) => self.id_at(n).map(|id| Action::ChangeDueDate(id, date)),
            Command::SetPriority(n, p) => self.id_at(n).map(|id| Action::ChangePriority(id, p)),
            Command::Clear => Some(Action::ClearCompleted),
            Command::Filter(filter) => Some(Action::SetFilter(filter)),
            Command::Show => {
                self.show()?;
                None
            }
        };
        match action {
            Some(action) => self.state = reduce(&self.state, action),
            None => log::debug!("nothing to apply"),
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        for (i, task) in self.state.visible().iter().enumerate() {
            let check = if task.completed { "x" } else { " " };
            write!(
                self.out,
                "{}. [{}] {} (Priority: {})",
                i + 1,
                check,
                task.text,
                task.priority
            )?;
            if !task.due_date.is_empty() {
                write!(self.out, " Due: {}", task.due_date)?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, "{} [{}]", self.state.status_line(), self.state.filter)?;
        Ok(())
    }
}
