//! Parsing of input lines into front-end commands.

use std::path::PathBuf;

pub const HELP: &str = "\
Type a message to send it. Commands:
  /new                     start a new chat
  /list                    list chats, newest first
  /open <n>                open chat n from /list
  /delete <n>              delete chat n from /list
  /rename <title>          rename the open chat
  /model <id>              switch model
  /models                  list available models
  /toggle <feature>        code_execution | thinking | vision | rich_text
  /image <path> <text>     send text with an image attached
  /run <message> <block>   run a code block (simulated)
  /quit                    exit
Press Ctrl-C while a reply streams to stop it.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    New,
    List,
    Open(usize),
    Delete(usize),
    Rename(String),
    Model(String),
    Models,
    Toggle(String),
    Image { path: PathBuf, text: String },
    Run { message: usize, block: usize },
    Help,
    Quit,
}

/// `Ok(None)` for a blank line; `Err` carries a usage message.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Send(line.to_string())));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name {
        "/new" => Command::New,
        "/list" => Command::List,
        "/models" => Command::Models,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        "/open" => Command::Open(position(rest, "/open <n>")?),
        "/delete" => Command::Delete(position(rest, "/delete <n>")?),
        "/rename" => Command::Rename(required(rest, "/rename <title>")?),
        "/model" => Command::Model(required(rest, "/model <id>")?),
        "/toggle" => Command::Toggle(required(rest, "/toggle <feature>")?),
        "/image" => {
            let usage = "/image <path> <text>";
            let (path, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| format!("usage: {usage}"))?;
            Command::Image {
                path: PathBuf::from(path),
                text: required(text, usage)?,
            }
        }
        "/run" => {
            let usage = "/run <message> <block>";
            let mut numbers = rest.split_whitespace();
            let message = position(numbers.next().unwrap_or(""), usage)?;
            let block = position(numbers.next().unwrap_or(""), usage)?;
            if numbers.next().is_some() {
                return Err(format!("usage: {usage}"));
            }
            Command::Run { message, block }
        }
        other => return Err(format!("unknown command {other}, try /help")),
    };
    Ok(Some(command))
}

fn required(value: &str, usage: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(value.to_string())
    }
}

/// A 1-based position as shown to the user.
fn position(value: &str, usage: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("usage: {usage} (numbers start at 1)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn plain_text_is_sent_trimmed() {
        assert_eq!(parse("  hello there "), Command::Send("hello there".into()));
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/new"), Command::New);
        assert_eq!(parse("/list"), Command::List);
        assert_eq!(parse("/models"), Command::Models);
        assert_eq!(parse("/exit"), Command::Quit);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse("/open 2"), Command::Open(2));
        assert_eq!(parse("/rename  Trip plans "), Command::Rename("Trip plans".into()));
        assert_eq!(parse("/model gemini-1.5-pro"), Command::Model("gemini-1.5-pro".into()));
        assert_eq!(parse("/run 3 1"), Command::Run { message: 3, block: 1 });
    }

    #[test]
    fn image_takes_path_then_text() {
        assert_eq!(
            parse("/image cat.png what breed is this?"),
            Command::Image {
                path: PathBuf::from("cat.png"),
                text: "what breed is this?".into(),
            }
        );
        assert!(parse_command("/image cat.png").is_err());
    }

    #[test]
    fn bad_positions_are_rejected() {
        assert!(parse_command("/open 0").is_err());
        assert!(parse_command("/delete x").is_err());
        assert!(parse_command("/run 1").is_err());
        assert!(parse_command("/run 1 2 3").is_err());
    }

    #[test]
    fn unknown_command_mentions_help() {
        let err = parse_command("/frobnicate").unwrap_err();
        assert!(err.contains("/help"));
    }
}
