use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ChatScriptError;

pub const MAX_WAIT_SECONDS: f32 = 5.0;
pub const NUMERIC_EQUALITY_TOLERANCE: f64 = 0.0001;

pub const COMMAND_UNKNOWN: &str = "COMMAND_UNKNOWN";
pub const COMMAND_ARITY: &str = "COMMAND_ARITY";
pub const COMMAND_EMPTY_ARG: &str = "COMMAND_EMPTY_ARG";
pub const COMMAND_NUMERIC_EXPECTED: &str = "COMMAND_NUMERIC_EXPECTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Unknown,
    Text,
    Image,
    Choice,
    If,
    Label,
    Wait,
    Goto,
}

impl CommandKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "@text" => CommandKind::Text,
            "@image" => CommandKind::Image,
            "@choice" => CommandKind::Choice,
            "@if" => CommandKind::If,
            "@label" => CommandKind::Label,
            "@wait" => CommandKind::Wait,
            "@goto" => CommandKind::Goto,
            _ => CommandKind::Unknown,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::Unknown => "unknown",
            CommandKind::Text => "@text",
            CommandKind::Image => "@image",
            CommandKind::Choice => "@choice",
            CommandKind::If => "@if",
            CommandKind::Label => "@label",
            CommandKind::Wait => "@wait",
            CommandKind::Goto => "@goto",
        }
    }
}

/// One parsed script instruction. A command is built from the comma-split,
/// trimmed tokens of a single source line (keyword at position 0) and is
/// validated exactly once, at construction; an invalid line never produces
/// a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    Text(TextCommand),
    Image(ImageCommand),
    Choice(ChoiceCommand),
    If(IfCommand),
    Label(LabelCommand),
    Wait(WaitCommand),
    Goto(GotoCommand),
}

impl Command {
    pub fn from_args(source_index: usize, args: &[&str]) -> Result<Self, ChatScriptError> {
        let raw_args: Vec<String> = args.iter().map(|arg| arg.trim().to_string()).collect();
        let keyword = raw_args.first().map(String::as_str).unwrap_or_default();

        match CommandKind::from_keyword(keyword) {
            CommandKind::Text => TextCommand::from_raw(source_index, raw_args).map(Command::Text),
            CommandKind::Image => {
                ImageCommand::from_raw(source_index, raw_args).map(Command::Image)
            }
            CommandKind::Choice => {
                ChoiceCommand::from_raw(source_index, raw_args).map(Command::Choice)
            }
            CommandKind::If => IfCommand::from_raw(source_index, raw_args).map(Command::If),
            CommandKind::Label => {
                LabelCommand::from_raw(source_index, raw_args).map(Command::Label)
            }
            CommandKind::Wait => WaitCommand::from_raw(source_index, raw_args).map(Command::Wait),
            CommandKind::Goto => GotoCommand::from_raw(source_index, raw_args).map(Command::Goto),
            CommandKind::Unknown => Err(invalid_command(
                source_index,
                CommandKind::Unknown,
                COMMAND_UNKNOWN,
                format!("\"{keyword}\" is not a recognized command keyword."),
            )),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Text(_) => CommandKind::Text,
            Command::Image(_) => CommandKind::Image,
            Command::Choice(_) => CommandKind::Choice,
            Command::If(_) => CommandKind::If,
            Command::Label(_) => CommandKind::Label,
            Command::Wait(_) => CommandKind::Wait,
            Command::Goto(_) => CommandKind::Goto,
        }
    }

    pub fn source_index(&self) -> usize {
        match self {
            Command::Text(command) => command.source_index,
            Command::Image(command) => command.source_index,
            Command::Choice(command) => command.source_index,
            Command::If(command) => command.source_index,
            Command::Label(command) => command.source_index,
            Command::Wait(command) => command.source_index,
            Command::Goto(command) => command.source_index,
        }
    }

    pub fn raw_args(&self) -> &[String] {
        match self {
            Command::Text(command) => &command.raw_args,
            Command::Image(command) => &command.raw_args,
            Command::Choice(command) => &command.raw_args,
            Command::If(command) => &command.raw_args,
            Command::Label(command) => &command.raw_args,
            Command::Wait(command) => &command.raw_args,
            Command::Goto(command) => &command.raw_args,
        }
    }
}

/// `@text, <text to display>` — the text may itself contain commas; every
/// argument after the keyword is rejoined with ", ".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub text: String,
}

impl TextCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() < 2 {
            return Err(invalid_command(
                source_index,
                CommandKind::Text,
                COMMAND_ARITY,
                "Missing required arguments. ex: @text, <text to display>",
            ));
        }

        let text = raw_args[1..].join(", ");
        if text.trim().is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::Text,
                COMMAND_EMPTY_ARG,
                "The text to display is empty. ex: @text, <text to display>",
            ));
        }

        Ok(Self {
            source_index,
            raw_args,
            text,
        })
    }
}

/// `@image, <image name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub image_name: String,
}

impl ImageCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() != 2 {
            return Err(invalid_command(
                source_index,
                CommandKind::Image,
                COMMAND_ARITY,
                "Expected exactly one argument. ex: @image, <image name>",
            ));
        }

        if raw_args[1].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::Image,
                COMMAND_EMPTY_ARG,
                "The image name is empty. ex: @image, <image name>",
            ));
        }

        Ok(Self {
            image_name: raw_args[1].clone(),
            source_index,
            raw_args,
        })
    }
}

/// `@choice, <variable>, <choice 1>, <choice 2>[, <choice 3>]` — between two
/// and three choices; the selected text is stored under the variable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub variable_name: String,
    pub choices: Vec<String>,
}

impl ChoiceCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() < 3 || raw_args.len() > 5 {
            return Err(invalid_command(
                source_index,
                CommandKind::Choice,
                COMMAND_ARITY,
                "Expected a variable name and 2 to 3 choices. ex: @choice, <variable>, <choice 1>, <choice 2>",
            ));
        }

        if raw_args[1].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::Choice,
                COMMAND_EMPTY_ARG,
                "The variable name is empty. ex: @choice, <variable>, <choice 1>, <choice 2>",
            ));
        }

        for (position, choice) in raw_args[2..].iter().enumerate() {
            if choice.is_empty() {
                return Err(invalid_command(
                    source_index,
                    CommandKind::Choice,
                    COMMAND_EMPTY_ARG,
                    format!(
                        "Choice {} is empty. ex: @choice, <variable>, <choice 1>, <choice 2>",
                        position + 1
                    ),
                ));
            }
        }

        Ok(Self {
            variable_name: raw_args[1].clone(),
            choices: raw_args[2..].to_vec(),
            source_index,
            raw_args,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalType {
    String,
    Numeric,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Greater,
    Less,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericComparison {
    pub op: CompareOp,
    pub operand: f64,
}

/// `@if, <variable>, <expected value>, <jump label>` — jumps when the
/// variable's value matches the expectation. How the expectation is compared
/// is inferred once, at construction: `true`/`false` compare as booleans,
/// `20`, `=20`, `>20`, `<20` compare as numbers, anything else compares as
/// an exact string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub variable_name: String,
    pub expected_value: String,
    pub goto_label: String,
    pub eval_type: EvalType,
    pub comparison: Option<NumericComparison>,
}

static NUMERIC_COMPARE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn numeric_compare_pattern() -> &'static Regex {
    NUMERIC_COMPARE_PATTERN
        .get_or_init(|| Regex::new(r"^(>|<|=)(.+)$").expect("numeric compare regex must compile"))
}

impl IfCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() != 4 {
            return Err(invalid_command(
                source_index,
                CommandKind::If,
                COMMAND_ARITY,
                "Expected exactly three arguments. ex: @if, <variable>, <expected value>, <jump label>",
            ));
        }

        if raw_args[1].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::If,
                COMMAND_EMPTY_ARG,
                "The variable name is empty. ex: @if, <variable>, <expected value>, <jump label>",
            ));
        }

        if raw_args[2].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::If,
                COMMAND_EMPTY_ARG,
                "The expected value is empty. ex: @if, <variable>, <expected value>, <jump label>",
            ));
        }

        if raw_args[3].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::If,
                COMMAND_EMPTY_ARG,
                "The jump label is empty. ex: @if, <variable>, <expected value>, <jump label>",
            ));
        }

        let expected_value = raw_args[2].clone();
        let (eval_type, comparison) = infer_evaluation(source_index, &expected_value)?;

        Ok(Self {
            variable_name: raw_args[1].clone(),
            goto_label: raw_args[3].clone(),
            expected_value,
            eval_type,
            comparison,
            source_index,
            raw_args,
        })
    }

    pub fn evaluate(&self, actual_value: &str) -> bool {
        match self.eval_type {
            EvalType::String => self.expected_value == actual_value,
            EvalType::Boolean => match actual_value.parse::<bool>() {
                Ok(actual) => actual == (self.expected_value == "true"),
                Err(_) => false,
            },
            EvalType::Numeric => {
                let Some(comparison) = self.comparison else {
                    return false;
                };
                let Ok(actual) = actual_value.trim().parse::<f64>() else {
                    return false;
                };
                match comparison.op {
                    CompareOp::Greater => actual > comparison.operand,
                    CompareOp::Less => actual < comparison.operand,
                    CompareOp::Equal => {
                        (actual - comparison.operand).abs() <= NUMERIC_EQUALITY_TOLERANCE
                    }
                }
            }
        }
    }
}

fn infer_evaluation(
    source_index: usize,
    expected_value: &str,
) -> Result<(EvalType, Option<NumericComparison>), ChatScriptError> {
    if expected_value == "true" || expected_value == "false" {
        return Ok((EvalType::Boolean, None));
    }

    if let Some(captures) = numeric_compare_pattern().captures(expected_value) {
        let op = match &captures[1] {
            ">" => CompareOp::Greater,
            "<" => CompareOp::Less,
            _ => CompareOp::Equal,
        };
        let Ok(operand) = captures[2].trim().parse::<f64>() else {
            return Err(invalid_command(
                source_index,
                CommandKind::If,
                COMMAND_NUMERIC_EXPECTED,
                "The expected value of a numeric comparison is invalid. ex: 20, =20, >20, <20",
            ));
        };
        return Ok((
            EvalType::Numeric,
            Some(NumericComparison { op, operand }),
        ));
    }

    if let Ok(operand) = expected_value.parse::<f64>() {
        return Ok((
            EvalType::Numeric,
            Some(NumericComparison {
                op: CompareOp::Equal,
                operand,
            }),
        ));
    }

    Ok((EvalType::String, None))
}

/// `@label, <label name>` — jump target; has no effect of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub label_name: String,
}

impl LabelCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() != 2 {
            return Err(invalid_command(
                source_index,
                CommandKind::Label,
                COMMAND_ARITY,
                "Expected exactly one argument. ex: @label, <label name>",
            ));
        }

        if raw_args[1].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::Label,
                COMMAND_EMPTY_ARG,
                "The label name is empty. ex: @label, <label name>",
            ));
        }

        Ok(Self {
            label_name: raw_args[1].clone(),
            source_index,
            raw_args,
        })
    }
}

/// `@wait, <seconds>` — at most 5 seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub seconds: f32,
}

impl WaitCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() != 2 {
            return Err(invalid_command(
                source_index,
                CommandKind::Wait,
                COMMAND_ARITY,
                "Expected exactly one argument. ex: @wait, <seconds>",
            ));
        }

        let seconds = match raw_args[1].parse::<f32>() {
            Ok(seconds) if seconds > 0.0 && seconds <= MAX_WAIT_SECONDS => seconds,
            _ => {
                return Err(invalid_command(
                    source_index,
                    CommandKind::Wait,
                    COMMAND_NUMERIC_EXPECTED,
                    "Specify a number greater than 0 and at most 5 seconds. ex: @wait, 2.5",
                ));
            }
        };

        Ok(Self {
            seconds,
            source_index,
            raw_args,
        })
    }
}

/// `@goto, <label name>` — unconditional jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoCommand {
    pub source_index: usize,
    pub raw_args: Vec<String>,
    pub goto_label: String,
}

impl GotoCommand {
    fn from_raw(source_index: usize, raw_args: Vec<String>) -> Result<Self, ChatScriptError> {
        if raw_args.len() != 2 {
            return Err(invalid_command(
                source_index,
                CommandKind::Goto,
                COMMAND_ARITY,
                "Expected exactly one argument. ex: @goto, <label name>",
            ));
        }

        if raw_args[1].is_empty() {
            return Err(invalid_command(
                source_index,
                CommandKind::Goto,
                COMMAND_EMPTY_ARG,
                "The label name is empty. ex: @goto, <label name>",
            ));
        }

        Ok(Self {
            goto_label: raw_args[1].clone(),
            source_index,
            raw_args,
        })
    }
}

fn invalid_command(
    source_index: usize,
    kind: CommandKind,
    code: &str,
    message: impl Into<String>,
) -> ChatScriptError {
    ChatScriptError::with_line(
        code,
        format!(
            "Invalid {} command at line {}: {}",
            kind.keyword(),
            source_index,
            message.into()
        ),
        source_index,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_from_line(line: &str) -> Result<Command, ChatScriptError> {
        let args: Vec<&str> = line.split(',').collect();
        Command::from_args(0, &args)
    }

    fn expect_failure(line: &str, code: &str) -> ChatScriptError {
        let error = command_from_line(line).expect_err("command should fail validation");
        assert_eq!(error.code, code);
        assert_eq!(error.line, Some(0));
        error
    }

    #[test]
    fn text_command_rejoins_comma_split_arguments() {
        let command = command_from_line("@text, Hello, world!").expect("text should parse");
        assert_eq!(command.kind(), CommandKind::Text);
        let Command::Text(text) = command else {
            unreachable!("kind already asserted");
        };
        assert_eq!(text.text, "Hello, world!");
        assert_eq!(text.source_index, 0);
        assert_eq!(text.raw_args[0], "@text");
    }

    #[test]
    fn text_command_requires_an_argument() {
        expect_failure("@text", COMMAND_ARITY);
    }

    #[test]
    fn text_command_rejects_whitespace_only_text() {
        expect_failure("@text,   ", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn image_command_parses_trimmed_name() {
        let command = command_from_line("@image, MyImage").expect("image should parse");
        let Command::Image(image) = command else {
            unreachable!("image line must parse as image");
        };
        assert_eq!(image.image_name, "MyImage");
    }

    #[test]
    fn image_command_arity_is_exact() {
        expect_failure("@image", COMMAND_ARITY);
        expect_failure("@image, MyImage, Extra", COMMAND_ARITY);
    }

    #[test]
    fn image_command_rejects_empty_name() {
        expect_failure("@image,   ", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn choice_command_parses_variable_and_choices() {
        let command =
            command_from_line("@choice, user_choice, Option1, Option2").expect("choice parses");
        let Command::Choice(choice) = command else {
            unreachable!("choice line must parse as choice");
        };
        assert_eq!(choice.variable_name, "user_choice");
        assert_eq!(choice.choices, vec!["Option1", "Option2"]);
    }

    #[test]
    fn choice_command_accepts_three_choices() {
        let command = command_from_line("@choice, my_var, Option1, Option2, Option3")
            .expect("choice parses");
        let Command::Choice(choice) = command else {
            unreachable!("choice line must parse as choice");
        };
        assert_eq!(choice.choices.len(), 3);
    }

    #[test]
    fn choice_command_requires_two_to_three_choices() {
        expect_failure("@choice", COMMAND_ARITY);
        expect_failure("@choice, var_name", COMMAND_ARITY);
        expect_failure("@choice, var_name, Option1", COMMAND_ARITY);
        expect_failure(
            "@choice, var_name, Option1, Option2, Option3, Option4",
            COMMAND_ARITY,
        );
    }

    #[test]
    fn choice_command_rejects_empty_variable_name() {
        expect_failure("@choice,   , Option1, Option2", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn choice_command_rejects_empty_choices() {
        expect_failure("@choice, var_name, Option1,   ", COMMAND_EMPTY_ARG);
        expect_failure("@choice, var_name,   , Option2", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn if_command_infers_string_comparison() {
        let command = command_from_line("@if, playerName, Alice, NextScene").expect("if parses");
        let Command::If(condition) = command else {
            unreachable!("if line must parse as if");
        };
        assert_eq!(condition.variable_name, "playerName");
        assert_eq!(condition.expected_value, "Alice");
        assert_eq!(condition.goto_label, "NextScene");
        assert_eq!(condition.eval_type, EvalType::String);
        assert!(condition.comparison.is_none());
    }

    #[test]
    fn if_command_infers_numeric_comparison_with_and_without_operator() {
        for (line, op) in [
            ("@if, score, 100, WinLabel", CompareOp::Equal),
            ("@if, score, =100, WinLabel", CompareOp::Equal),
            ("@if, score, >100, WinLabel", CompareOp::Greater),
            ("@if, score, <100, LoseLabel", CompareOp::Less),
        ] {
            let Command::If(condition) = command_from_line(line).expect("if parses") else {
                unreachable!("if line must parse as if");
            };
            assert_eq!(condition.eval_type, EvalType::Numeric);
            let comparison = condition.comparison.expect("numeric comparison present");
            assert_eq!(comparison.op, op);
            assert_eq!(comparison.operand, 100.0);
        }
    }

    #[test]
    fn if_command_infers_boolean_comparison() {
        let Command::If(condition) =
            command_from_line("@if, hasKey, true, OpenDoor").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert_eq!(condition.eval_type, EvalType::Boolean);
    }

    #[test]
    fn if_command_arity_is_exact() {
        expect_failure("@if, varName", COMMAND_ARITY);
        expect_failure("@if, varName, value, label, extra", COMMAND_ARITY);
    }

    #[test]
    fn if_command_rejects_empty_arguments() {
        expect_failure("@if,   , value, label", COMMAND_EMPTY_ARG);
        expect_failure("@if, varName,   , label", COMMAND_EMPTY_ARG);
        expect_failure("@if, varName, value,   ", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn if_command_rejects_operator_with_non_numeric_remainder() {
        expect_failure("@if, score, >abc, label", COMMAND_NUMERIC_EXPECTED);
        expect_failure("@if, score, =1xyz, label", COMMAND_NUMERIC_EXPECTED);
        expect_failure("@if, score, <notanumber, label", COMMAND_NUMERIC_EXPECTED);
    }

    #[test]
    fn if_evaluate_compares_strings_exactly() {
        let Command::If(condition) =
            command_from_line("@if, playerName, Alice, NextScene").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert!(condition.evaluate("Alice"));
        assert!(!condition.evaluate("alice"));
        assert!(!condition.evaluate("Bob"));
    }

    #[test]
    fn if_evaluate_compares_booleans_and_defaults_to_false() {
        let Command::If(condition) =
            command_from_line("@if, hasKey, true, OpenDoor").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert!(condition.evaluate("true"));
        assert!(!condition.evaluate("false"));
        assert!(!condition.evaluate("not-a-bool"));
    }

    #[test]
    fn if_evaluate_numeric_default_operator_is_equality() {
        let Command::If(condition) =
            command_from_line("@if, score, 20, label").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert!(condition.evaluate("20"));
        assert!(!condition.evaluate("21"));
        assert!(!condition.evaluate("not-a-number"));
    }

    #[test]
    fn if_evaluate_numeric_ordering_operators() {
        let Command::If(greater) =
            command_from_line("@if, score, >20, label").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert!(greater.evaluate("21"));
        assert!(!greater.evaluate("20"));

        let Command::If(less) = command_from_line("@if, score, <20, label").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert!(less.evaluate("19.9999"));
        assert!(!less.evaluate("20"));
    }

    #[test]
    fn if_evaluate_numeric_equality_uses_absolute_tolerance() {
        let Command::If(condition) =
            command_from_line("@if, score, =20, label").expect("if parses")
        else {
            unreachable!("if line must parse as if");
        };
        assert!(condition.evaluate("20.00005"));
        assert!(!condition.evaluate("20.001"));
    }

    #[test]
    fn label_command_parses_name() {
        let Command::Label(label) =
            command_from_line("@label, StartPoint").expect("label parses")
        else {
            unreachable!("label line must parse as label");
        };
        assert_eq!(label.label_name, "StartPoint");
    }

    #[test]
    fn label_command_arity_and_content() {
        expect_failure("@label", COMMAND_ARITY);
        expect_failure("@label, StartPoint, Extra", COMMAND_ARITY);
        expect_failure("@label,   ", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn wait_command_parses_seconds() {
        let Command::Wait(wait) = command_from_line("@wait, 5").expect("wait parses") else {
            unreachable!("wait line must parse as wait");
        };
        assert_eq!(wait.seconds, 5.0);
    }

    #[test]
    fn wait_command_rejects_out_of_range_and_non_numeric_values() {
        expect_failure("@wait", COMMAND_ARITY);
        expect_failure("@wait, 2.5, Extra", COMMAND_ARITY);
        expect_failure("@wait, abc", COMMAND_NUMERIC_EXPECTED);
        expect_failure("@wait, -1", COMMAND_NUMERIC_EXPECTED);
        expect_failure("@wait, 0", COMMAND_NUMERIC_EXPECTED);
        expect_failure("@wait, 5.01", COMMAND_NUMERIC_EXPECTED);
    }

    #[test]
    fn goto_command_parses_label() {
        let Command::Goto(goto) = command_from_line("@goto, EndLabel").expect("goto parses")
        else {
            unreachable!("goto line must parse as goto");
        };
        assert_eq!(goto.goto_label, "EndLabel");
    }

    #[test]
    fn goto_command_arity_and_content() {
        expect_failure("@goto", COMMAND_ARITY);
        expect_failure("@goto, Label1, Label2", COMMAND_ARITY);
        expect_failure("@goto,   ", COMMAND_EMPTY_ARG);
    }

    #[test]
    fn unknown_keyword_fails_with_diagnostic_keyword() {
        let error = expect_failure("@dance, around", COMMAND_UNKNOWN);
        assert!(error.message.contains("@dance"));
    }

    #[test]
    fn commands_serialize_with_tagged_kind() {
        let command = command_from_line("@text, Hello, world!").expect("text parses");
        let value = serde_json::to_value(&command).expect("command serializes");
        assert_eq!(value["kind"], "text");
        assert_eq!(value["sourceIndex"], 0);
        assert_eq!(value["text"], "Hello, world!");
    }
}
