//! Simulated code execution.
//!
//! Nothing here runs code. [`SimulatedExecutor`] recognises the print
//! statements of a handful of languages with shallow patterns and echoes
//! their literal arguments back as if the program had produced them. Every
//! result is prefixed with [`SIMULATED_PREFIX`] so it can never be mistaken
//! for real output. A real sandbox would implement [`CodeExecutor`].

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use gemchat_common::ExecutionStatus;
use regex::Regex;

/// Prefix carried by every simulated result.
pub const SIMULATED_PREFIX: &str = "[simulated] ";

/// Result text when no print statement was recognised.
pub const NO_OUTPUT: &str = "Code executed successfully (simulated, no output)";

pub const DEFAULT_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub result: String,
    pub status: ExecutionStatus,
}

#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Always resolves; failures are reported through the outcome status.
    async fn run(&self, language: &str, source: &str) -> ExecutionOutcome;
}

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static PYTHON_PRINT: Pattern = LazyLock::new(|| Regex::new(r"\bprint\s*\(([^\n]*)\)"));
static CONSOLE_LOG: Pattern = LazyLock::new(|| Regex::new(r"\bconsole\.log\s*\(([^\n]*)\)"));
static SHELL_ECHO: Pattern = LazyLock::new(|| Regex::new(r"(?m)(?:^|[;&|]\s*)echo\s+([^\n;&|]*)"));
static RUST_PRINTLN: Pattern = LazyLock::new(|| Regex::new(r"\bprintln!\s*\(([^\n]*)\)"));

fn pattern_for(language: &str) -> Option<&'static Pattern> {
    match language.trim().to_ascii_lowercase().as_str() {
        "python" | "py" => Some(&PYTHON_PRINT),
        "javascript" | "js" | "typescript" | "ts" => Some(&CONSOLE_LOG),
        "bash" | "sh" | "shell" => Some(&SHELL_ECHO),
        "rust" | "rs" => Some(&RUST_PRINTLN),
        _ => None,
    }
}

/// Pattern-matching stand-in for a code runner.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    delay: Duration,
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl SimulatedExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The synchronous part of [`CodeExecutor::run`], without the delay.
    pub fn simulate(&self, language: &str, source: &str) -> ExecutionOutcome {
        let Some(pattern) = pattern_for(language) else {
            return success(NO_OUTPUT.to_string());
        };

        let regex = match pattern.as_ref() {
            Ok(regex) => regex,
            Err(e) => {
                return ExecutionOutcome {
                    result: format!("{SIMULATED_PREFIX}{e}"),
                    status: ExecutionStatus::Error,
                }
            }
        };

        let lines: Vec<String> = regex
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .map(|arg| render_argument(arg.as_str()))
            .collect();

        if lines.is_empty() {
            success(NO_OUTPUT.to_string())
        } else {
            success(lines.join("\n"))
        }
    }
}

#[async_trait]
impl CodeExecutor for SimulatedExecutor {
    async fn run(&self, language: &str, source: &str) -> ExecutionOutcome {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.simulate(language, source)
    }
}

fn success(text: String) -> ExecutionOutcome {
    ExecutionOutcome {
        result: format!("{SIMULATED_PREFIX}{text}"),
        status: ExecutionStatus::Success,
    }
}

/// A single quoted literal loses its quotes; anything else is kept as written.
fn render_argument(raw: &str) -> String {
    let arg = raw.trim();
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = arg
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            if !inner.contains(quote) {
                return inner.to_string();
            }
        }
    }
    arg.to_string()
}
