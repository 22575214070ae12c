use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_style_suffix() -> String {
    "Dark moody aesthetic, cinematic lighting, ultra-realistic details, professional digital painting, high resolution.".to_string()
}

pub fn default_regenerate_min_description_len() -> usize {
    20
}

pub fn default_request_delay_ms() -> u64 {
    0
}

pub fn default_timeout_sec() -> u64 {
    300
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("gallery")
}

pub fn default_claude_binary() -> PathBuf {
    // Check common install location first
    if let Some(home) = std::env::var_os("HOME") {
        let local_path = PathBuf::from(home).join(".claude/local/claude");
        if local_path.exists() {
            return local_path;
        }
    }
    // Fall back to PATH lookup
    PathBuf::from("claude")
}

pub fn default_claude_model() -> String {
    "sonnet".to_string()
}

pub fn default_codex_binary() -> PathBuf {
    PathBuf::from("codex")
}

pub fn default_codex_model() -> String {
    "gpt-4.1".to_string()
}

pub fn default_image_args() -> Vec<String> {
    vec!["{prompt}".to_string(), "{output}".to_string()]
}

pub fn default_image_mime_type() -> String {
    "image/png".to_string()
}
