//! The `table_of_comments` command and the table hosts register it in.
//!
//! Every anticipated failure degrades to "do nothing": missing settings, no
//! outline block, an ambiguous selection, a cancelled pick. Internal errors are
//! logged and swallowed here; nothing escapes `execute`.

use serde::{Deserialize, Serialize};

use crate::config::{Config, SettingsStore};
use crate::error::TocError;
use crate::host::{Editor, QuickPanel};
use crate::navigate;
use crate::outline::{self, SyncOutcome};
use crate::scan;
use crate::types::{Direction, Title};

/// Everything a command invocation may touch.
pub struct Context<'a> {
    pub editor: &'a mut dyn Editor,
    pub panel: &'a mut dyn QuickPanel,
    pub settings: &'a dyn SettingsStore,
}

/// Command arguments. No direction means full-outline mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Args {
    #[serde(rename = "move", default)]
    pub movement: Option<Direction>,
}

impl Args {
    #[must_use]
    pub fn outline() -> Self {
        Self { movement: None }
    }

    #[must_use]
    pub fn moving(direction: Direction) -> Self {
        Self {
            movement: Some(direction),
        }
    }
}

/// What an invocation did, for hosts that want to report it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Outline block state after sync; `None` in move mode or when sync failed.
    pub sync: Option<SyncOutcome>,
    /// Titles listed to the user (full-outline mode only).
    pub listed: Vec<Title>,
    /// Title the cursor landed on.
    pub jumped: Option<Title>,
}

pub trait Command {
    fn name(&self) -> &'static str;

    fn execute(&self, ctx: &mut Context<'_>, args: &Args) -> Outcome;
}

/// Commands registered by name. Ids are indices into the table.
#[derive(Default)]
pub struct CommandTable {
    commands: Vec<Box<dyn Command>>,
}

impl CommandTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in commands registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(Box::new(TableOfComments));
        table
    }

    /// Register `command`, replacing any command of the same name. Returns its id.
    pub fn register(&mut self, command: Box<dyn Command>) -> usize {
        if let Some(id) = self.id(command.name()) {
            self.commands[id] = command;
            return id;
        }
        self.commands.push(command);
        self.commands.len() - 1
    }

    #[must_use]
    pub fn id(&self, name: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.name() == name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Run the command called `name`. `None` when no such command is registered.
    pub fn run(&self, name: &str, ctx: &mut Context<'_>, args: &Args) -> Option<Outcome> {
        let id = self.id(name)?;
        Some(self.commands[id].execute(ctx, args))
    }
}

/// Index reported by a quick panel, with `-1` (or anything negative) as cancel.
#[must_use]
pub fn picked_index(raw: i64) -> Option<usize> {
    usize::try_from(raw).ok()
}

pub struct TableOfComments;

impl TableOfComments {
    pub const NAME: &'static str = "table_of_comments";

    /// Sync the outline block, list titles, jump to the pick.
    fn show_outline(ctx: &mut Context<'_>, cfg: &Config) -> Outcome {
        let sync = match outline::sync(ctx.editor, cfg) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(error = %e, "outline sync failed");
                None
            }
        };
        let listed = scan_or_empty(&*ctx.editor, cfg);
        let picked = ctx.panel.show(&scan::labels(&listed));
        let jumped = Self::on_selected(ctx.editor, cfg, picked);
        Outcome {
            sync,
            listed,
            jumped,
        }
    }

    /// Jump to title `picked` of a fresh scan. `None` or out of range is a no-op.
    pub fn on_selected(editor: &mut dyn Editor, cfg: &Config, picked: Option<usize>) -> Option<Title> {
        let picked = picked?;
        let titles = scan_or_empty(&*editor, cfg);
        let Some(title) = titles.into_iter().nth(picked) else {
            tracing::debug!(picked, "selection out of range");
            return None;
        };
        navigate::jump_to_line(editor, title.line);
        Some(title)
    }

    /// Jump to the neighbouring title. Needs exactly one selection.
    fn traverse(editor: &mut dyn Editor, cfg: &Config, direction: Direction) -> Option<Title> {
        let [selection] = editor.selections() else {
            tracing::debug!(count = editor.selections().len(), "move needs a single cursor");
            return None;
        };
        let (current_line, _) = editor.rowcol(selection.head);
        let titles = scan_or_empty(&*editor, cfg);
        let index = navigate::next_title(&titles, current_line, direction)?;
        let title = titles.into_iter().nth(index)?;
        navigate::jump_to_line(editor, title.line);
        Some(title)
    }
}

impl Command for TableOfComments {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&self, ctx: &mut Context<'_>, args: &Args) -> Outcome {
        let cfg = Config::resolve(ctx.settings);
        match args.movement {
            Some(direction) => Outcome {
                jumped: Self::traverse(ctx.editor, &cfg, direction),
                ..Outcome::default()
            },
            None => Self::show_outline(ctx, &cfg),
        }
    }
}

fn scan_or_empty(editor: &dyn Editor, cfg: &Config) -> Vec<Title> {
    scan::scan(editor.text(), editor, cfg).unwrap_or_else(|e: TocError| {
        tracing::warn!(error = %e, "title scan failed");
        Vec::new()
    })
}
