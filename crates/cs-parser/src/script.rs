use std::collections::BTreeMap;

use cs_core::{ChatScriptError, Command};
use serde::{Deserialize, Serialize};

pub const SCRIPT_SYNTAX_ERROR: &str = "SCRIPT_SYNTAX_ERROR";

/// The parsed form of one chat scene: the commands in source-line order
/// (insertion order is execution order) plus the label table resolving jump
/// targets to command indexes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatScript {
    commands: Vec<Command>,
    label_indexes: BTreeMap<String, usize>,
}

impl ChatScript {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn label_index(&self, label_name: &str) -> Option<usize> {
        self.label_indexes.get(label_name).copied()
    }

    pub fn labels(&self) -> &BTreeMap<String, usize> {
        &self.label_indexes
    }
}

/// Parses raw script text into a [`ChatScript`].
///
/// Blank lines and lines starting with `#` are skipped; every other line is
/// comma-split and validated as a command, tagged with its 0-based line
/// number. The first invalid line aborts parsing. An empty result is not an
/// error; a scene with no commands simply ends on its first advance.
pub fn parse_chat_script(raw_text: &str) -> Result<ChatScript, ChatScriptError> {
    let mut commands = Vec::new();
    for (index, raw_line) in raw_text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let args: Vec<&str> = line.split(',').collect();
        let command = Command::from_args(index, &args)
            .map_err(|error| ChatScriptError::with_line(SCRIPT_SYNTAX_ERROR, error.message, index))?;
        commands.push(command);
    }

    // The first definition of a label wins; later duplicates are ignored.
    let mut label_indexes = BTreeMap::new();
    for (position, command) in commands.iter().enumerate() {
        if let Command::Label(label) = command {
            label_indexes
                .entry(label.label_name.clone())
                .or_insert(position);
        }
    }

    Ok(ChatScript {
        commands,
        label_indexes,
    })
}
