//! Centralized defaults: model names, endpoints, and generation limits.

pub mod models {
    pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20240620";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
}

pub mod endpoints {
    /// Base URLs carry their API version segment; clients append only the
    /// operation path (`/messages`, `/chat/completions`).
    pub const CLAUDE_BASE_URL: &str = "https://api.anthropic.com/v1";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    /// Gemini's OpenAI-compatible surface (no extra version segment).
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
}

pub mod generation {
    pub const DEFAULT_MAX_TOKENS: u32 = 2000;
    pub const DEFAULT_TEMPERATURE: f32 = 0.5;
    pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str = "Respond accurately to user queries. \
        Be thorough but not repetitive. Be concise. Never start with a preamble. \
        Immediately address the ask or request. Do not add meta information about \
        your response. If there's nothing to do, answer with 'Not Applicable'.";
}
