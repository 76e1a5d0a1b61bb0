//! Default TOML config template with documentation comments.

/// Generate the default TOML config content with comments.
pub(super) fn default_config_toml() -> String {
    r##"# gemchat configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[api]
# key = "..."            # or set GEMINI_API_KEY (takes precedence)
# model = "gemini-2.0-flash"   # gemini-2.0-flash, gemini-1.5-pro, gemini-1.5-flash, gemini-1.0-pro
# connect_timeout_secs = 10
# request_timeout_secs = 120   # whole reply when not streamed, silence between streamed chunks

[generation]
# temperature = 0.7      # 0.0-2.0
# top_k = 40             # 1-100
# top_p = 0.95           # 0.0-1.0
# max_output_tokens = 8192

[features]
# code_execution = true  # declare the run_code tool and add code guidance
# thinking = false       # ask for a reasoning pass before each answer
# vision = true          # send attached images (vision models only)
# rich_text = true       # ask for markdown formatting

[store]
# backend = "firebase"   # firebase, memory
# database_url = "https://<project>-default-rtdb.firebaseio.com"
# auth_token = "..."

[execution]
# simulated_delay_ms = 800

[logging]
# level = "info"         # trace, debug, info, warn, error
"##
    .to_string()
}
