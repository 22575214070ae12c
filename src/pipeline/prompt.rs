/// Image prompt: source text followed by the fixed style suffix
pub fn image_prompt(source: &str, style_suffix: &str) -> String {
    let source = source.trim();
    let suffix = style_suffix.trim();
    if suffix.is_empty() {
        source.to_string()
    } else {
        format!("{} {}", source, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_appended() {
        assert_eq!(
            image_prompt("a ruined city at dusk", "Cinematic lighting."),
            "a ruined city at dusk Cinematic lighting."
        );
    }

    #[test]
    fn test_empty_suffix() {
        assert_eq!(image_prompt(" a spear ", ""), "a spear");
    }
}
