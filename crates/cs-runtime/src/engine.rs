use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use cs_core::{ChatScriptError, Command, CommandKind, IfCommand};
use cs_parser::{parse_chat_script, ChatScript};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{error, warn};

use crate::listener::ChatEventListener;

/// Pacing pause inserted after a text or image effect completes, so that
/// back-to-back bubbles stay readable.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Kinds that close the current batch during collection. A goto is not one
/// of them: collection walks linearly past a goto line, and the jump only
/// takes effect once the batch executes.
const BATCH_BREAK_KINDS: [CommandKind; 3] = [CommandKind::Text, CommandKind::If, CommandKind::Wait];

#[derive(Clone)]
pub struct ChatEngineOptions {
    pub listener: Arc<dyn ChatEventListener>,
    pub settle_delay: Option<Duration>,
}

/// Interprets a parsed chat script against a listener, one batch at a time.
///
/// `setup` parses a scene and resets all execution state; `advance` then
/// plays batches in script order until the script ends or a batch ends on a
/// choice, at which point the engine waits for `set_variable` and another
/// `advance`.
pub struct ChatEngine {
    listener: Arc<dyn ChatEventListener>,
    settle_delay: Duration,
    script: ChatScript,
    cursor: usize,
    variables: BTreeMap<String, String>,
    advance_depth: u32,
    waiting_choice: bool,
    ended: bool,
}

impl ChatEngine {
    pub fn new(options: ChatEngineOptions) -> Self {
        Self {
            listener: options.listener,
            settle_delay: options.settle_delay.unwrap_or(DEFAULT_SETTLE_DELAY),
            script: ChatScript::default(),
            cursor: 0,
            variables: BTreeMap::new(),
            advance_depth: 0,
            waiting_choice: false,
            ended: false,
        }
    }

    /// Parses a scene and resets the cursor, variables and guard state.
    /// Fails on the first invalid script line; an empty script is accepted
    /// and ends on the first `advance`.
    pub fn setup(&mut self, raw_text: &str) -> Result<(), ChatScriptError> {
        let script = parse_chat_script(raw_text)?;
        if script.is_empty() {
            warn!("no chat commands parsed from the provided text");
        }

        self.script = script;
        self.cursor = 0;
        self.variables.clear();
        self.advance_depth = 0;
        self.waiting_choice = false;
        self.ended = false;
        Ok(())
    }

    /// True when no advance traversal is in flight; hosts should gate their
    /// "next" control on this.
    pub fn can_advance(&self) -> bool {
        self.advance_depth == 0
    }

    /// True while the engine is paused on a choice and has not yet received
    /// `set_variable`.
    pub fn waiting_choice(&self) -> bool {
        self.waiting_choice
    }

    /// True once the end-of-chat callback has fired for the current scene.
    pub fn finished(&self) -> bool {
        self.ended
    }

    /// Records a choice result and releases a pending choice pause. Never
    /// moves the cursor by itself.
    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
        self.waiting_choice = false;
    }

    /// Plays batches in script order until the script ends or a batch ends
    /// on a choice. While paused on a choice this is a no-op; the cursor
    /// does not move until `set_variable` arrives.
    pub async fn advance(&mut self) {
        if self.waiting_choice {
            return;
        }

        self.advance_depth += 1;
        loop {
            let batch = self.next_batch();
            if batch.is_empty() {
                self.advance_depth = 0;
                if !self.ended {
                    self.ended = true;
                    self.listener.on_end_chat().await;
                }
                return;
            }

            self.execute_batch(&batch).await;

            if batch.last().map(Command::kind) == Some(CommandKind::Choice) {
                self.waiting_choice = true;
                break;
            }
        }
        self.advance_depth -= 1;
    }

    /// Collects the next batch: successive commands from the cursor, ending
    /// right after the first batch-closing kind, or at the end of the
    /// script.
    fn next_batch(&mut self) -> Vec<Command> {
        let mut batch = Vec::new();
        while let Some(command) = self.script.get(self.cursor) {
            batch.push(command.clone());
            self.cursor += 1;
            if BATCH_BREAK_KINDS.contains(&command.kind()) {
                break;
            }
        }
        batch
    }

    /// Runs one batch. Jump effects apply inline, in batch order; the
    /// listener-visible effects are spawned together and joined, so a batch
    /// takes as long as its slowest member, not the sum.
    async fn execute_batch(&mut self, batch: &[Command]) {
        let mut effects: JoinSet<()> = JoinSet::new();

        for command in batch {
            match command {
                Command::Text(text) => {
                    let listener = Arc::clone(&self.listener);
                    let command = text.clone();
                    let settle = self.settle_delay;
                    effects.spawn(async move {
                        listener.show_text(&command).await;
                        sleep(settle).await;
                    });
                }
                Command::Image(image) => {
                    let listener = Arc::clone(&self.listener);
                    let command = image.clone();
                    let settle = self.settle_delay;
                    effects.spawn(async move {
                        listener.show_image(&command).await;
                        sleep(settle).await;
                    });
                }
                Command::Wait(wait) => {
                    let seconds = wait.seconds;
                    effects.spawn(async move {
                        sleep(Duration::from_secs_f32(seconds)).await;
                    });
                }
                Command::Choice(choice) => {
                    self.listener.show_choice(choice);
                }
                Command::If(condition) => {
                    self.execute_if(condition);
                }
                Command::Goto(goto) => {
                    self.jump_to_label(&goto.goto_label);
                }
                Command::Label(_) => {}
            }
        }

        while let Some(result) = effects.join_next().await {
            if let Err(join_error) = result {
                error!("batch effect task failed: {join_error}");
            }
        }
    }

    fn execute_if(&mut self, condition: &IfCommand) {
        let Some(actual_value) = self.variables.get(&condition.variable_name) else {
            warn!(
                "variable '{}' not found, condition evaluates to false",
                condition.variable_name
            );
            return;
        };

        if condition.evaluate(actual_value) {
            self.jump_to_label(&condition.goto_label);
        }
    }

    fn jump_to_label(&mut self, label_name: &str) {
        match self.script.label_index(label_name) {
            Some(index) => self.cursor = index,
            None => error!("label '{}' not found, cannot jump", label_name),
        }
    }
}
