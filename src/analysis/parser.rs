use super::AnalysisResponse;
use serde::Deserialize;

const ANALYZE_PROMPT: &str = include_str!("../../prompts/analyze.md");

pub fn build_analysis_prompt(text: &str) -> String {
    ANALYZE_PROMPT.replace("{{TEXT}}", text.trim())
}

/// Parse an analysis response out of raw model output.
///
/// Returns `None` when no JSON object with `scenes` or `entities` can be found.
pub fn parse_analysis(raw: &str) -> Option<AnalysisResponse> {
    // Claude wraps result in {"result": "...", ...} JSON
    #[derive(Deserialize)]
    struct ClaudeOutput {
        result: String,
    }

    if let Ok(claude_out) = serde_json::from_str::<ClaudeOutput>(raw) {
        if let Some(response) = parse_response_json(&claude_out.result) {
            return Some(response);
        }
    }

    parse_response_json(raw)
}

fn parse_response_json(s: &str) -> Option<AnalysisResponse> {
    for candidate in json_candidates(s) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) else {
            continue;
        };

        let Some(object) = value.as_object() else {
            continue;
        };
        if !object.contains_key("scenes") && !object.contains_key("entities") {
            tracing::debug!("Skipping JSON object with neither scenes nor entities");
            continue;
        }

        match serde_json::from_value::<AnalysisResponse>(value) {
            Ok(response) => return Some(response),
            Err(e) => tracing::debug!("Failed to parse analysis JSON: {}", e),
        }
    }

    None
}

/// JSON objects that may hold the analysis, most likely first: the whole
/// output, fenced code blocks, then every balanced `{...}` in order.
fn json_candidates(s: &str) -> Vec<&str> {
    let mut candidates = Vec::new();

    let trimmed = s.trim();
    if trimmed.starts_with('{') {
        candidates.push(trimmed);
    }

    if let Ok(re) = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```") {
        candidates.extend(
            re.captures_iter(s)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str().trim()),
        );
    }

    for (start, _) in s.match_indices('{') {
        if let Some(len) = balanced_len(&s[start..]) {
            candidates.push(&s[start..start + len]);
        }
    }

    candidates
}

/// Byte length of the balanced object opening `s`; braces inside string
/// literals do not count
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
