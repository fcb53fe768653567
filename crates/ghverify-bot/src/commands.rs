use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BotCommand {
    Start,
    Help,
    Verify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelegramCommandSpec {
    pub command: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommandDef {
    command: BotCommand,
    patterns: &'static [&'static str],
    telegram_spec: TelegramCommandSpec,
}

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        command: BotCommand::Start,
        patterns: &["/start"],
        telegram_spec: TelegramCommandSpec {
            command: "start",
            description: "How to verify a GitHub account",
        },
    },
    CommandDef {
        command: BotCommand::Help,
        patterns: &["/help"],
        telegram_spec: TelegramCommandSpec {
            command: "help",
            description: "Show usage",
        },
    },
    CommandDef {
        command: BotCommand::Verify,
        patterns: &["/verify"],
        telegram_spec: TelegramCommandSpec {
            command: "verify",
            description: "Verify ownership of a GitHub username",
        },
    },
];

/// What a text message asks the bot to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Incoming<'a> {
    /// A known command and its argument, if any.
    Command(BotCommand, Option<&'a str>),
    /// Plain text, taken as a GitHub username.
    Username(&'a str),
    /// Unknown commands and blank text.
    Ignored,
}

pub fn telegram_command_specs() -> Vec<TelegramCommandSpec> {
    COMMAND_DEFS.iter().map(|def| def.telegram_spec).collect()
}

pub(crate) fn classify(text: &str) -> Incoming<'_> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Incoming::Ignored;
    }
    if !trimmed.starts_with('/') {
        return Incoming::Username(trimmed);
    }
    match parse_command(trimmed) {
        Some((command, argument)) => Incoming::Command(command, argument),
        None => Incoming::Ignored,
    }
}

pub(crate) fn parse_command(text: &str) -> Option<(BotCommand, Option<&str>)> {
    let trimmed = text.trim();
    let (head, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let argument = Some(rest.trim()).filter(|arg| !arg.is_empty());

    COMMAND_DEFS.iter().find_map(|def| {
        def.patterns
            .iter()
            .any(|pattern| command_matches(head, pattern))
            .then_some((def.command, argument))
    })
}

fn command_matches(head: &str, command: &str) -> bool {
    if head == command {
        return true;
    }

    head.strip_prefix(command)
        .is_some_and(|stripped| stripped.starts_with('@'))
}
