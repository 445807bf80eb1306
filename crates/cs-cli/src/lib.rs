use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use cs_core::{ChoiceCommand, ImageCommand, TextCommand};
use cs_parser::parse_chat_script;
use cs_runtime::{ChatEngine, ChatEngineOptions, ChatEventListener};

/// Renders chat events as terminal lines and keeps the most recent choice
/// around so the play loop can resolve it from stdin.
#[derive(Default)]
pub struct ConsoleListener {
    pending_choice: Mutex<Option<ChoiceCommand>>,
}

impl ConsoleListener {
    pub fn take_pending_choice(&self) -> Option<ChoiceCommand> {
        self.pending_choice
            .lock()
            .expect("pending choice lock")
            .take()
    }
}

#[async_trait]
impl ChatEventListener for ConsoleListener {
    async fn show_text(&self, command: &TextCommand) {
        println!("{}", command.text);
    }

    async fn show_image(&self, command: &ImageCommand) {
        println!("[image: {}]", command.image_name);
    }

    fn show_choice(&self, command: &ChoiceCommand) {
        for (position, choice) in command.choices.iter().enumerate() {
            println!("  {}) {}", position + 1, choice);
        }
        *self.pending_choice.lock().expect("pending choice lock") = Some(command.clone());
    }

    async fn on_end_chat(&self) {
        println!("(chat ended)");
    }
}

/// Parses a 1-based menu selection against the number of offered choices.
pub fn parse_selection(input: &str, choice_count: usize) -> Option<usize> {
    let selection: usize = input.trim().parse().ok()?;
    if selection >= 1 && selection <= choice_count {
        Some(selection - 1)
    } else {
        None
    }
}

fn prompt_selection(choice: &ChoiceCommand) -> Result<String> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read a choice from stdin")?;
        if read == 0 {
            bail!("input closed before a choice was made");
        }

        match parse_selection(&line, choice.choices.len()) {
            Some(index) => return Ok(choice.choices[index].clone()),
            None => println!("enter a number between 1 and {}", choice.choices.len()),
        }
    }
}

pub async fn run_play(script_path: &Path, settle_delay: Option<Duration>) -> Result<i32> {
    let raw_text = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;

    let listener = Arc::new(ConsoleListener::default());
    let mut engine = ChatEngine::new(ChatEngineOptions {
        listener: Arc::clone(&listener) as Arc<dyn ChatEventListener>,
        settle_delay,
    });

    if let Err(error) = engine.setup(&raw_text) {
        eprintln!("{error}");
        return Ok(1);
    }

    engine.advance().await;
    while engine.waiting_choice() {
        let Some(choice) = listener.take_pending_choice() else {
            bail!("engine is waiting on a choice that was never presented");
        };
        let selected = prompt_selection(&choice)?;
        engine.set_variable(&choice.variable_name, &selected);
        engine.advance().await;
    }

    Ok(0)
}

pub fn run_check(script_path: &Path) -> Result<i32> {
    let raw_text = fs::read_to_string(script_path)
        .with_context(|| format!("failed to read {}", script_path.display()))?;

    match parse_chat_script(&raw_text) {
        Ok(script) => {
            println!(
                "ok: {} commands, {} labels",
                script.len(),
                script.labels().len()
            );
            Ok(0)
        }
        Err(error) => {
            eprintln!("{error}");
            Ok(1)
        }
    }
}
