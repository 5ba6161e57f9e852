#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::Path;

    fn np_release() -> Command {
        let mut cmd = Command::cargo_bin("np_release").expect("binary built");
        cmd.env_remove("NP_RELEASE_TAG").env("NO_COLOR", "1");
        cmd
    }

    fn write_package(dir: &Path, version: &str) {
        let manifest = serde_json::json!({ "name": "unicorn", "version": version });
        std::fs::write(dir.join("package.json"), manifest.to_string()).expect("write package.json");
    }

    #[test]
    fn test_help_lists_flags() {
        np_release()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--yolo"))
            .stdout(predicate::str::contains("--no-cleanup"))
            .stdout(predicate::str::contains("--preview"));
    }

    #[test]
    fn test_preview_prints_plan_without_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(dir.path(), "1.2.3");

        np_release()
            .args(["minor", "--preview", "--cwd"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("1.2.3 → 1.3.0"))
            .stdout(predicate::str::contains("Prerequisite check"))
            .stdout(predicate::str::contains("npm version minor --force"))
            .stdout(predicate::str::contains("git push --follow-tags"));

        // Nothing ran, so no lockfile or node_modules appeared
        assert!(!dir.path().join("node_modules").exists());
    }

    #[test]
    fn test_preview_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(dir.path(), "1.0.0");

        let assert = np_release()
            .args(["--yolo", "--no-publish", "--preview", "--json", "--cwd"])
            .arg(dir.path())
            .assert()
            .success();

        let report: serde_json::Value =
            serde_json::from_slice(&assert.get_output().stdout).expect("json on stdout");
        assert_eq!(report["current"], "1.0.0");
        assert_eq!(report["next"], "1.0.1");

        let titles: Vec<&str> = report["steps"]
            .as_array()
            .expect("steps array")
            .iter()
            .filter(|step| step["depth"] == 0)
            .filter_map(|step| step["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["Prerequisite check", "Git", "Bumping version"]);
    }

    #[test]
    fn test_preview_rejects_invalid_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_package(dir.path(), "1.0.0");

        np_release()
            .args(["bananas", "--preview", "--cwd"])
            .arg(dir.path())
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Got 'bananas'"));
    }

    #[test]
    fn test_json_requires_preview() {
        np_release().arg("--json").assert().failure();
    }

    #[test]
    fn test_empty_tag_is_rejected() {
        np_release()
            .args(["--tag", "", "--preview"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--tag must not be empty"));
    }
}
