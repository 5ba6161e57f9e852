#[cfg(all(test, unix))]
mod tests {
    use futures_lite::StreamExt;
    use np_release::error::{ReleaseError, SubprocessError};
    use np_release::process::{self, exec};
    use np_release::{Invocation, SystemRunner};

    fn sh(script: &str) -> Invocation {
        Invocation::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn test_merges_stdout_and_stderr() {
        let lines = process::output(&SystemRunner, &sh("echo out; echo err >&2"))
            .await
            .expect("command succeeds");

        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["err", "out"]);
    }

    #[tokio::test]
    async fn test_preserves_order_within_one_pipe() {
        let lines = process::output(&SystemRunner, &sh("echo one; echo two; echo three"))
            .await
            .expect("command succeeds");
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_drops_empty_lines() {
        let lines = process::output(&SystemRunner, &sh("echo a; echo; echo; echo b"))
            .await
            .expect("command succeeds");
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_failure_after_output() {
        let mut stream = exec(&sh("echo partial; exit 3")).expect("spawned");

        let first = stream.next().await.expect("a line").expect("ok line");
        assert_eq!(first, "partial");

        match stream.next().await {
            Some(Err(ReleaseError::Subprocess(SubprocessError::Failed { code, output, .. }))) => {
                assert_eq!(code, Some(3));
                assert_eq!(output, vec!["partial".to_string()]);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_silent_success_yields_nothing() {
        let mut stream = exec(&Invocation::new("true")).expect("spawned");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = exec(&Invocation::new("np-release-no-such-program")).expect_err("not on PATH");
        assert!(matches!(
            err,
            ReleaseError::Subprocess(SubprocessError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("marker.txt"), "here").expect("write marker");

        let lines = process::output(&SystemRunner, &Invocation::new("ls").current_dir(dir.path()))
            .await
            .expect("ls succeeds");
        assert_eq!(lines, vec!["marker.txt"]);
    }

    #[tokio::test]
    async fn test_succeeds_reports_exit_status() {
        assert!(process::succeeds(&SystemRunner, &sh("exit 0")).await.expect("ran"));
        assert!(!process::succeeds(&SystemRunner, &sh("exit 1")).await.expect("ran"));
    }

    #[tokio::test]
    async fn test_stdin_is_closed() {
        // `cat` would hang forever on an inherited terminal
        let lines = process::output(&SystemRunner, &Invocation::new("cat"))
            .await
            .expect("cat sees EOF");
        assert!(lines.is_empty());
    }
}
