//! Line-oriented terminal front end over the session controller.

mod commands;

use std::io::Write;
use std::path::PathBuf;

use gemchat_common::{ChatSession, Feature, ImageData, Message, Role, MODELS};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use crate::boot;
use crate::controller::{load_images, ChatError, ChatEvent, SessionController};

pub use commands::{parse_command, Command, HELP};

pub struct Terminal {
    controller: SessionController,
    events: UnboundedReceiver<ChatEvent>,
    config_path: Option<PathBuf>,
}

impl Terminal {
    pub fn new(
        controller: SessionController,
        events: UnboundedReceiver<ChatEvent>,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            controller,
            events,
            config_path,
        }
    }

    pub async fn run(mut self) -> std::io::Result<()> {
        self.banner().await;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
            };
            let Some(line) = line else { break };

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(usage) => {
                    println!("{usage}");
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                println!("error: {e}");
            }
        }
        Ok(())
    }

    async fn banner(&self) {
        let settings = self.controller.settings().await;
        println!(
            "gemchat {} | model {} | {} store | /help for commands",
            env!("CARGO_PKG_VERSION"),
            settings.model().id,
            self.controller.store_name()
        );
        if let Some(reason) = self.controller.client_error().await {
            println!("! chat unavailable: {reason}");
        }
        if let Some(session) = self.controller.current_session().await {
            println!("Opened \"{}\"", session.title);
            print_history(&self.controller.messages().await);
        }
    }

    async fn execute(&mut self, command: Command) -> Result<(), ChatError> {
        match command {
            Command::Send(text) => self.send(&text, Vec::new()).await,
            Command::Image { path, text } => {
                let loaded = load_images(&[path]);
                let mut text = text;
                for note in loaded.notes {
                    text.push('\n');
                    text.push_str(&note);
                }
                self.send(&text, loaded.images).await
            }
            Command::New => {
                self.controller.new_session().await?;
                println!("Started a new chat");
                Ok(())
            }
            Command::List => {
                let current = self.controller.current_session().await.map(|s| s.id);
                let sessions = self.controller.list_sessions().await;
                if sessions.is_empty() {
                    println!("No chats stored");
                }
                for (i, session) in sessions.iter().enumerate() {
                    let marker = if current.as_ref() == Some(&session.id) { "*" } else { " " };
                    println!("{marker}{:>3}. {}  ({})", i + 1, session.title, updated(session));
                }
                Ok(())
            }
            Command::Open(n) => {
                let session = self.nth_session(n).await?;
                let session = self.controller.select_session(&session.id).await?;
                println!("Opened \"{}\"", session.title);
                print_history(&self.controller.messages().await);
                Ok(())
            }
            Command::Delete(n) => {
                let session = self.nth_session(n).await?;
                self.controller.delete_session(&session.id).await?;
                println!("Deleted \"{}\"", session.title);
                Ok(())
            }
            Command::Rename(title) => {
                let current = self
                    .controller
                    .current_session()
                    .await
                    .ok_or_else(|| ChatError::NotInitialized("no open session".into()))?;
                self.controller.rename_session(&current.id, &title).await?;
                println!("Renamed to \"{}\"", title.trim());
                Ok(())
            }
            Command::Model(id) => {
                let model = self.controller.select_model(&id).await?;
                println!("Model: {}", model.display_name);
                self.report_client().await;
                self.save_settings().await;
                Ok(())
            }
            Command::Models => {
                let current = self.controller.settings().await.model().id;
                for model in MODELS {
                    let marker = if model.id == current { "*" } else { " " };
                    let vision = if model.supports_vision { "vision" } else { "text only" };
                    println!("{marker} {:<20} {} ({vision})", model.id, model.display_name);
                }
                Ok(())
            }
            Command::Toggle(name) => {
                let feature = Feature::from_name(&name).ok_or_else(|| {
                    ChatError::Settings(format!(
                        "unknown feature {name}; one of code_execution, thinking, vision, rich_text"
                    ))
                })?;
                let enabled = self.controller.toggle_feature(feature).await;
                println!("{}: {}", feature.name(), if enabled { "on" } else { "off" });
                self.report_client().await;
                self.save_settings().await;
                Ok(())
            }
            Command::Run { message, block } => {
                let outcome = self.controller.run_code(message - 1, block - 1).await?;
                println!("{}", outcome.result);
                Ok(())
            }
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => Ok(()),
        }
    }

    async fn send(&mut self, text: &str, images: Vec<ImageData>) -> Result<(), ChatError> {
        let cancel = CancellationToken::new();
        let reply = self.controller.send(text, images, cancel.clone());
        tokio::pin!(reply);

        let mut view = ReplyView::default();
        let result = loop {
            tokio::select! {
                result = &mut reply => break result,
                Some(event) = self.events.recv() => view.show(event),
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => cancel.cancel(),
            }
        };
        while let Ok(event) = self.events.try_recv() {
            view.show(event);
        }

        match result {
            Ok(outcome) => {
                if let Some(index) = outcome.reply_index {
                    let messages = self.controller.messages().await;
                    if let Some(reply) = messages.get(index) {
                        print_block_hints(index, reply);
                    }
                }
                Ok(())
            }
            // Already shown through ChatEvent::Error.
            Err(ChatError::Ai(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn nth_session(&self, n: usize) -> Result<ChatSession, ChatError> {
        self.controller
            .list_sessions()
            .await
            .into_iter()
            .nth(n - 1)
            .ok_or_else(|| ChatError::NoSuchSession(format!("#{n}")))
    }

    async fn report_client(&self) {
        if let Some(reason) = self.controller.client_error().await {
            println!("! chat unavailable: {reason}");
        }
    }

    async fn save_settings(&self) {
        let Some(ref path) = self.config_path else {
            return;
        };
        let settings = self.controller.settings().await;
        if let Err(e) = boot::save_settings(path, &settings) {
            tracing::warn!("Failed to save settings: {e}");
        }
    }
}

/// Prints streamed frames as deltas of the accumulated text.
#[derive(Debug, Default)]
struct ReplyView {
    printed: usize,
}

impl ReplyView {
    fn show(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Thinking(thinking) => println!("(thinking)\n{thinking}\n"),
            ChatEvent::Frame { text, .. } => {
                if let Some(delta) = self.delta(&text) {
                    print!("{delta}");
                    let _ = std::io::stdout().flush();
                }
            }
            ChatEvent::Done { cancelled } => {
                println!();
                if cancelled {
                    println!("[stopped]");
                }
            }
            ChatEvent::Error(message) => println!("\nerror: {message}"),
        }
    }

    /// New text since the last frame. Frames carry the whole reply so far.
    fn delta<'a>(&mut self, text: &'a str) -> Option<&'a str> {
        if text.len() <= self.printed || !text.is_char_boundary(self.printed) {
            return None;
        }
        let delta = &text[self.printed..];
        self.printed = text.len();
        Some(delta)
    }
}

fn print_history(messages: &[Message]) {
    for (i, message) in messages.iter().enumerate() {
        let who = match message.role {
            Role::User => "you",
            Role::Model => "gemini",
        };
        let image_note = if message.had_images { " [image]" } else { "" };
        println!("[{}] {who}{image_note}: {}", i + 1, message.text);
        if message.role == Role::Model {
            print_block_hints(i, message);
        }
    }
}

fn print_block_hints(index: usize, message: &Message) {
    for (b, block) in message.code_blocks.iter().enumerate() {
        let result = block
            .result
            .as_deref()
            .map(|r| format!(" -> {r}"))
            .unwrap_or_default();
        println!(
            "  code block {}.{} ({}): /run {} {}{result}",
            index + 1,
            b + 1,
            block.language,
            index + 1,
            b + 1
        );
    }
}

fn updated(session: &ChatSession) -> String {
    chrono::DateTime::from_timestamp_millis(session.updated_at)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".into())
}
