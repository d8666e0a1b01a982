// tests/ssh_transport.rs

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ambari_playbook::errors::PlaybookError;
use ambari_playbook::exec::ssh::{split_exit_marker, wrap_command, EXIT_MARKER};
use ambari_playbook::exec::{RemoteTransport, SessionSpec, SshTransport};
use tempfile::TempDir;

/// Write an executable `sh` script standing in for the ssh binary.
fn fake_ssh(dir: &Path, body: &str) -> String {
    let path = dir.join("ssh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

/// Runs its last argument through `sh`, the way sshd hands it to the
/// login shell.
const SHELL_SSH: &str = "for last; do :; done\nexec /bin/sh -c \"$last\"";

fn session() -> SessionSpec {
    SessionSpec {
        host: "dn1.test".to_string(),
        user: "root".to_string(),
        key_path: PathBuf::from("/keys/id_rsa"),
        port: 2222,
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn ssh_arguments_are_passed_in_order() {
    // `echo` stands in for ssh and prints the argument vector.
    let transport = SshTransport::with_programs("echo", "echo");

    let result = transport.run(session(), "uptime".to_string()).await.unwrap();

    assert!(result.done);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(
        result.stdout.lines().next().unwrap(),
        "-i /keys/id_rsa -o BatchMode=yes -o StrictHostKeyChecking=no -o ConnectTimeout=5 \
         -p 2222 root@dn1.test uptime"
    );
}

#[test]
fn exit_marker_is_split_off_stdout() {
    assert_eq!(
        split_exit_marker(&format!("line one\nline two\n\n{EXIT_MARKER}255\n")),
        Some(("line one\nline two\n", 255))
    );
    assert_eq!(split_exit_marker(&format!("\n{EXIT_MARKER}0\n")), Some(("", 0)));
    assert_eq!(split_exit_marker("no trailer here\n"), None);
    assert_eq!(split_exit_marker(&format!("\n{EXIT_MARKER}x\n")), None);
    assert!(wrap_command("uptime").starts_with("uptime\n"));
}

#[tokio::test]
async fn remote_exit_255_keeps_its_output() {
    let dir = TempDir::new().unwrap();
    let transport = SshTransport::with_programs(fake_ssh(dir.path(), SHELL_SSH), "scp");

    let result = transport
        .run(session(), "(echo decommission output; exit 255)".to_string())
        .await
        .unwrap();

    assert!(!result.done);
    assert_eq!(result.exit_code, Some(255));
    assert_eq!(result.stdout, "decommission output\n");
}

#[tokio::test]
async fn command_that_exits_its_shell_reports_that_status() {
    let dir = TempDir::new().unwrap();
    let transport = SshTransport::with_programs(fake_ssh(dir.path(), SHELL_SSH), "scp");

    let result = transport
        .run(session(), "echo partial; exit 3".to_string())
        .await
        .unwrap();

    assert!(!result.done);
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.stdout, "partial\n");
}

#[tokio::test]
async fn ssh_255_without_trailer_is_a_transport_error_with_output() {
    let dir = TempDir::new().unwrap();
    let ssh = fake_ssh(
        dir.path(),
        "echo 'ssh: connect to host dn1.test port 2222: Connection refused' >&2\nexit 255",
    );
    let transport = SshTransport::with_programs(ssh, "scp");

    let err = transport
        .run(session(), "uptime".to_string())
        .await
        .unwrap_err();

    match err {
        PlaybookError::Transport { host, message } => {
            assert_eq!(host, "dn1.test");
            assert!(message.contains("status 255"), "{message}");
            assert!(message.contains("Connection refused"), "{message}");
        }
        other => panic!("expected Transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn scp_target_is_user_at_host_colon_path() {
    let transport = SshTransport::with_programs("echo", "echo");

    let result = transport
        .copy(session(), PathBuf::from("/tmp/a.xml"), "/etc/a.xml".to_string())
        .await
        .unwrap();

    assert!(result.stdout.trim().ends_with("-P 2222 /tmp/a.xml root@dn1.test:/etc/a.xml"));
}

#[tokio::test]
async fn failing_remote_command_is_not_a_transport_error() {
    let transport = SshTransport::with_programs("false", "false");

    let result = transport.run(session(), "uptime".to_string()).await.unwrap();

    assert!(!result.done);
    assert_eq!(result.exit_code, Some(1));
}

#[tokio::test]
async fn failing_copy_is_a_transport_error() {
    let transport = SshTransport::with_programs("false", "false");

    let err = transport
        .copy(session(), PathBuf::from("/tmp/a"), "/tmp/b".to_string())
        .await
        .unwrap_err();

    match err {
        PlaybookError::Transport { host, message } => {
            assert_eq!(host, "dn1.test");
            assert!(message.starts_with("scp failed"));
        }
        other => panic!("expected Transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn launch_failure_is_a_transport_error() {
    let transport = SshTransport::with_programs("no-such-ssh-binary-xyz", "scp");

    let err = transport
        .run(session(), "uptime".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, PlaybookError::Transport { .. }), "{err:?}");
}
