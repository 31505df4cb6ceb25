// ABOUTME: Wrapper for the mysql client to replay dump files on the target
// ABOUTME: Feeds each produced artifact to mysql on stdin

use crate::config::Endpoint;
use crate::error::{MigrationError, Result};
use crate::migration::dump::DumpArtifact;
use crate::tool::{ExternalTool, Redirect, ToolInvocation};
use std::path::Path;

/// Build the mysql command line that loads `input` into the target.
///
/// ```text
/// mysql --host=H --port=P --user=U --password=PW DB < out/file
/// ```
pub fn build_restore_invocation(target: &Endpoint, input: &Path) -> ToolInvocation {
    ToolInvocation::new("mysql")
        .arg(format!("--host={}", target.host))
        .arg(format!("--port={}", target.port))
        .arg(format!("--user={}", target.user))
        .arg(format!("--password={}", target.password))
        .arg(target.database.as_str())
        .redirect(Redirect::StdinFrom(input.to_path_buf()))
}

/// Replay one dump artifact against the target database.
pub async fn restore_artifact<T: ExternalTool + ?Sized>(
    tool: &T,
    target: &Endpoint,
    artifact: &DumpArtifact,
) -> Result<()> {
    tracing::info!(
        "Restoring {} dump {} into {}",
        artifact.mode,
        artifact.path.display(),
        target.redacted()
    );

    let fail = |message: String| {
        tracing::error!("Error executing migration command: {}", message);
        MigrationError::Restore {
            file: artifact.path.clone(),
            message,
        }
    };

    let invocation = build_restore_invocation(target, &artifact.path);

    let output = tool
        .run(&invocation)
        .await
        .map_err(|e| fail(format!("{:#}", e)))?;

    if !output.success() {
        return Err(fail(output.failure_summary()));
    }

    tracing::info!(
        "✓ Migration from {} completed successfully",
        artifact.path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::dump::DumpMode;
    use crate::tool::ToolOutput;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::path::PathBuf;

    fn target() -> Endpoint {
        Endpoint {
            host: "dst.internal".to_string(),
            port: 3307,
            user: "writer".to_string(),
            password: "hunter2".to_string(),
            database: "shop_copy".to_string(),
        }
    }

    fn artifact() -> DumpArtifact {
        DumpArtifact {
            path: PathBuf::from("out/full.sql"),
            mode: DumpMode::Full,
        }
    }

    struct ExitWith(i32);

    #[async_trait]
    impl ExternalTool for ExitWith {
        async fn run(&self, _invocation: &ToolInvocation) -> anyhow::Result<ToolOutput> {
            Ok(ToolOutput {
                exit_code: Some(self.0),
                stdout: String::new(),
                stderr: "ERROR 1050 (42S01) at line 22: Table 'a' already exists".to_string(),
            })
        }
    }

    struct CannotSpawn;

    #[async_trait]
    impl ExternalTool for CannotSpawn {
        async fn run(&self, _invocation: &ToolInvocation) -> anyhow::Result<ToolOutput> {
            bail!("No such file or directory (os error 2)")
        }
    }

    #[test]
    fn restore_command_line() {
        let invocation = build_restore_invocation(&target(), Path::new("out/full.sql"));

        assert_eq!(invocation.program, "mysql");
        assert_eq!(
            invocation.args,
            vec![
                "--host=dst.internal",
                "--port=3307",
                "--user=writer",
                "--password=hunter2",
                "shop_copy",
            ]
        );
        assert_eq!(
            invocation.redirect,
            Some(Redirect::StdinFrom(PathBuf::from("out/full.sql")))
        );
        assert_eq!(
            invocation.display_masked(),
            "mysql --host=dst.internal --port=3307 --user=writer --password=*** shop_copy < out/full.sql"
        );
    }

    #[tokio::test]
    async fn successful_restore() {
        assert!(restore_artifact(&ExitWith(0), &target(), &artifact())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_restore_error() {
        let err = restore_artifact(&ExitWith(1), &target(), &artifact())
            .await
            .unwrap_err();

        match err {
            MigrationError::Restore { file, message } => {
                assert_eq!(file, PathBuf::from("out/full.sql"));
                assert!(message.starts_with("exit status 1"));
                assert!(message.contains("already exists"));
            }
            other => panic!("expected restore error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn spawn_failure_is_a_restore_error() {
        let err = restore_artifact(&CannotSpawn, &target(), &artifact())
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Restore { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
