use assert_cmd::Command;
use predicates::prelude::*;

fn chapterviz() -> Command {
    Command::cargo_bin("chapterviz").unwrap()
}

#[test]
fn schema_prints_config_schema() {
    chapterviz()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("style_suffix"))
        .stdout(predicate::str::contains("regenerate_min_description_len"));
}

#[test]
fn run_fails_on_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    chapterviz()
        .current_dir(dir.path())
        .args(["run", "no-such-chapter.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read chapter text"));
}

#[test]
fn run_rejects_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    chapterviz()
        .current_dir(dir.path())
        .args(["run", "-", "--no-export"])
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chapter text cannot be empty."));
}

#[test]
fn run_rejects_unknown_category_filter() {
    chapterviz()
        .args(["run", "--filter", "dragon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

#[cfg(unix)]
mod with_fake_models {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    const ANALYSIS: &str = r#"{
  "scenes": [
    {"id": "s1", "title": "Ruins", "summary": "Kaelen watches the horizon", "visualDescriptionPrompt": "broken towers at dusk"}
  ],
  "entities": [
    {"id": "e1", "name": "Kaelen", "category": "Personaje", "visualDescriptionPrompt": "a tired guardian"},
    {"id": "e2", "name": "Nulifier", "category": "Technology", "visualDescriptionPrompt": "a humming black engine"}
  ]
}"#;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn config(dir: &Path, analyzer: &Path, image: &Path) -> PathBuf {
        let path = dir.join("chapterviz.yaml");
        fs::write(
            &path,
            format!(
                "timeout_sec: 30\nproviders:\n  claude_cli:\n    binary: {}\n  image:\n    binary: {}\n",
                analyzer.display(),
                image.display()
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn full_run_writes_gallery() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = script(dir.path(), "fake-claude", &format!("cat <<'JSON'\n{}\nJSON", ANALYSIS));
        let image = script(dir.path(), "fake-render", "echo 'data:image/png;base64,AAAA'");
        let config = config(dir.path(), &analyzer, &image);
        let chapter = dir.path().join("chapter.txt");
        fs::write(&chapter, "Kaelen stood among the ruins while the Nulifier hummed.").unwrap();
        let out = dir.path().join("out");

        chapterviz()
            .current_dir(dir.path())
            .arg("run")
            .arg(&chapter)
            .arg("--config")
            .arg(&config)
            .arg("--out")
            .arg(&out)
            .args(["--sort", "title"])
            .assert()
            .success()
            .stdout(predicate::str::contains("3 of 3 shown"))
            .stdout(predicate::str::contains("[Character] Kaelen (e1) - ok"))
            .stdout(predicate::str::contains("Gallery written to"));

        let json = fs::read_to_string(out.join("gallery.json")).unwrap();
        let export: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = export["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["id"], "s1");
        assert_eq!(items[1]["category"], "Character");
        assert_eq!(items[2]["imageUrl"], "data:image/png;base64,AAAA");
        assert_eq!(export["phase"], "complete");

        let md = fs::read_to_string(out.join("gallery.md")).unwrap();
        assert!(md.contains("**Illustrated:** 3 of 3"));
    }

    #[test]
    fn failing_image_command_degrades_to_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = script(dir.path(), "fake-claude", &format!("cat <<'JSON'\n{}\nJSON", ANALYSIS));
        let image = script(dir.path(), "fake-render", "echo 'quota exceeded' >&2\nexit 3");
        let config = config(dir.path(), &analyzer, &image);

        chapterviz()
            .current_dir(dir.path())
            .args(["run", "-", "--no-export", "--filter", "scene"])
            .arg("--config")
            .arg(&config)
            .write_stdin("Kaelen stood among the ruins.")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 of 3 shown"))
            .stdout(predicate::str::contains("[Scene] Ruins (s1) - placeholder"))
            .stdout(predicate::str::contains(
                "Warnings: Unexpected error for Ruins.; Unexpected error for Kaelen.",
            ));
    }

    #[test]
    fn unusable_image_output_is_a_degraded_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = script(dir.path(), "fake-claude", &format!("cat <<'JSON'\n{}\nJSON", ANALYSIS));
        let image = script(dir.path(), "fake-render", "echo 'no image today'");
        let config = config(dir.path(), &analyzer, &image);

        chapterviz()
            .current_dir(dir.path())
            .args(["run", "-", "--no-export", "--search", "nulifier"])
            .arg("--config")
            .arg(&config)
            .write_stdin("Kaelen stood among the ruins.")
            .assert()
            .success()
            .stdout(predicate::str::contains("1 of 3 shown"))
            .stdout(predicate::str::contains("[Technology] Nulifier (e2) - placeholder"))
            .stdout(predicate::str::contains(
                "Image generation failed for \"Nulifier\", using placeholder.",
            ));
    }

    #[test]
    fn regenerate_after_describe_uses_new_description() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = script(dir.path(), "fake-claude", &format!("cat <<'JSON'\n{}\nJSON", ANALYSIS));
        let log = dir.path().join("prompts.log");
        let image = script(
            dir.path(),
            "fake-render",
            &format!("echo \"$1\" >> {}\necho 'data:image/png;base64,BBBB'", log.display()),
        );
        let config = config(dir.path(), &analyzer, &image);

        chapterviz()
            .current_dir(dir.path())
            .args(["run", "-", "--no-export"])
            .arg("--config")
            .arg(&config)
            .args([
                "--describe",
                "e1=Kaelen in a ragged star-woven cloak",
                "--regenerate",
                "e1,ghost",
            ])
            .write_stdin("Kaelen stood among the ruins.")
            .assert()
            .success()
            .stdout(predicate::str::contains("Regenerated Kaelen (e1): completed"))
            .stdout(predicate::str::contains("Regenerated ghost (ghost): not found"));

        let prompts = fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = prompts.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("a tired guardian "));
        assert!(lines[3].starts_with("Kaelen in a ragged star-woven cloak "));
    }

    #[test]
    fn unusable_analysis_output_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = script(dir.path(), "fake-claude", "echo 'I could not find any scenes.'");
        let image = script(dir.path(), "fake-render", "echo 'data:image/png;base64,AAAA'");
        let config = config(dir.path(), &analyzer, &image);

        chapterviz()
            .current_dir(dir.path())
            .args(["run", "-", "--no-export"])
            .arg("--config")
            .arg(&config)
            .write_stdin("Kaelen stood among the ruins.")
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Failed to analyze narrative text. The response was empty or invalid.",
            ));
    }
}
