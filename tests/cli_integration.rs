//! CLI integration tests for venvup.
//!
//! The full lifecycle is driven against a fake interpreter: a shell script
//! that understands `-m venv DIR` (copying itself to `DIR/bin/python`) and
//! `-m pip ...`, logging every invocation. Installs of anything starting with
//! `foo` fail; everything else succeeds.

use std::fs;
use std::path::{Path, PathBuf};
use assert_cmd::Command;

#[allow(unused_imports)]
use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the venvup binary command, isolated from the caller's environment.
fn venvup() -> Command {
    let mut cmd = Command::cargo_bin("venvup").unwrap();
    cmd.env_remove("VENVUP_PYTHON").env("HOME", "/nonexistent-venvup-home");
    cmd
}

/// Create a temporary project directory with a manifest.
fn project(manifest: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("requirements.txt"), manifest).unwrap();
    tmp
}

/// An existing environment directory with a marker file inside.
fn existing_env(root: &Path, name: &str) -> PathBuf {
    let marker = root.join(name).join("marker");
    fs::create_dir_all(marker.parent().unwrap()).unwrap();
    fs::write(&marker, "keep").unwrap();
    marker
}

#[cfg(unix)]
const FAKE_PYTHON: &str = r#"#!/bin/sh
echo "$*" >> "$VENVUP_FAKE_LOG"
if [ "$1" = "-m" ] && [ "$2" = "venv" ]; then
    mkdir -p "$3/bin" && cp "$0" "$3/bin/python" && exit 0
    exit 1
fi
if [ "$1" = "-m" ] && [ "$2" = "pip" ]; then
    case "$3" in
        list)
            echo '[{"name": "requests", "version": "2.31.0"}, {"name": "pip", "version": "24.0"}]'
            exit 0
            ;;
        install)
            for arg in "$@"; do
                case "$arg" in
                    foo*) exit 1 ;;
                esac
            done
            exit 0
            ;;
    esac
fi
exit 9
"#;

/// Write the fake interpreter into `dir` and return its path.
#[cfg(unix)]
fn fake_python(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-python");
    fs::write(&path, FAKE_PYTHON).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn read_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

// ============================================================================
// argument handling
// ============================================================================

#[test]
fn test_help() {
    venvup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ENV_NAME"))
        .stdout(predicate::str::contains("--manifest"));
}

#[test]
fn test_rejects_path_as_env_name() {
    let tmp = project("requests\n");

    venvup()
        .arg("nested/env")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("single path segment"));
}

// ============================================================================
// existing environment
// ============================================================================

#[test]
fn test_declining_overwrite_and_verify_exits_one() {
    let tmp = project("requests\n");
    let marker = existing_env(tmp.path(), "venv");

    venvup()
        .current_dir(tmp.path())
        .write_stdin("n\nn\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("aborted"));

    assert_eq!(fs::read_to_string(marker).unwrap(), "keep");
    assert!(!tmp.path().join("failed_packages.txt").exists());
}

#[test]
fn test_invalid_overwrite_answer_exits_one() {
    let tmp = project("requests\n");
    let marker = existing_env(tmp.path(), "myenv");

    venvup()
        .arg("myenv")
        .current_dir(tmp.path())
        .write_stdin("maybe\ny\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid answer `maybe`"));

    assert!(marker.exists());
}

#[test]
fn test_closed_stdin_at_overwrite_exits_one() {
    let tmp = project("requests\n");
    existing_env(tmp.path(), "venv");

    venvup()
        .current_dir(tmp.path())
        .write_stdin("")
        .assert()
        .code(1);
}

#[cfg(unix)]
#[test]
fn test_verify_reports_missing_packages_and_exits_zero() {
    let tmp = project("# tools\nrequests==2.31.0\n\nnumpy\nFlask\n");
    let log = tmp.path().join("calls.log");
    let marker = existing_env(tmp.path(), "venv");

    // Put the fake interpreter where the environment's python lives.
    let bin = tmp.path().join("venv").join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::copy(fake_python(tmp.path()), bin.join("python")).unwrap();

    let assert = venvup()
        .current_dir(tmp.path())
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("n\ny\n")
        .assert()
        .success();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(stderr.matches("WARNING:").count(), 2, "{stderr}");
    assert!(stderr.contains("'numpy'"));
    assert!(stderr.contains("'Flask'"));

    let calls = read_log(&log);
    assert!(calls.contains("-m pip list"));
    assert!(!calls.contains("install"));
    assert!(marker.exists());
}

// ============================================================================
// fresh environment
// ============================================================================

#[cfg(unix)]
#[test]
fn test_missing_manifest_exits_one_before_pip() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("calls.log");
    let python = fake_python(tmp.path());

    venvup()
        .current_dir(tmp.path())
        .arg("--python")
        .arg(&python)
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requirements.txt"));

    assert!(!read_log(&log).contains("-m pip"));
}

#[cfg(unix)]
#[test]
fn test_env_creation_failure_propagates_exit_code() {
    let tmp = project("requests\n");
    let python = tmp.path().join("broken-python");
    fs::write(&python, "#!/bin/sh\nexit 4\n").unwrap();
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
    }

    venvup()
        .current_dir(tmp.path())
        .arg("--python")
        .arg(&python)
        .write_stdin("")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("failed to create environment"));
}

#[cfg(unix)]
#[test]
fn test_full_run_with_fallbacks() {
    let tmp = project("# pinned\nrequests==2.31.0\nfoo==9\n\nfoobar\nflask\n");
    let log = tmp.path().join("calls.log");
    let python = fake_python(tmp.path());

    venvup()
        .current_dir(tmp.path())
        .env("VENVUP_PYTHON", &python)
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Activate the environment now?"))
        .stdout(predicate::str::contains("source venv/bin/activate"))
        .stderr(predicate::str::contains("WARNING:"));

    assert!(tmp.path().join("venv").join("bin").join("python").exists());

    let calls = read_log(&log);
    let installs: Vec<&str> = calls
        .lines()
        .filter(|l| l.starts_with("-m pip install"))
        .collect();
    assert_eq!(
        installs,
        vec![
            "-m pip install --upgrade pip",
            "-m pip install requests==2.31.0",
            "-m pip install foo==9",
            "-m pip install foo>=9.0.0,<10.0.0",
            "-m pip install foobar",
            "-m pip install foobar",
            "-m pip install flask",
        ]
    );

    assert_eq!(
        fs::read_to_string(tmp.path().join("failed_packages.txt")).unwrap(),
        "foo==9\nfoobar\n"
    );
}

#[cfg(unix)]
#[test]
fn test_lines_outside_grammar_are_passed_to_pip() {
    let tmp = project("flask\n-r base.txt\nrequests\n");
    fs::write(tmp.path().join("failed_packages.txt"), "oldpkg==1\n").unwrap();
    let log = tmp.path().join("calls.log");
    let python = fake_python(tmp.path());

    venvup()
        .current_dir(tmp.path())
        .args(["--no-activate", "--python"])
        .arg(&python)
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("")
        .assert()
        .success()
        .stderr(predicate::str::contains("requirements.txt:2:"));

    let calls = read_log(&log);
    assert!(calls.contains("-m pip install -r base.txt\n"));
    assert!(calls.contains("-m pip install requests\n"));
    assert!(!tmp.path().join("failed_packages.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_activation_prompt_retries_invalid_input() {
    let tmp = project("flask\n");
    let log = tmp.path().join("calls.log");
    let python = fake_python(tmp.path());

    let assert = venvup()
        .current_dir(tmp.path())
        .args(["--quiet", "--python"])
        .arg(&python)
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("later\nno\n")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert_eq!(stdout.matches("Activate the environment now?").count(), 2);
    assert!(stdout.contains("Please answer y or n."));
    assert!(!tmp.path().join("failed_packages.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_overwrite_recreates_environment() {
    let tmp = project("flask\n");
    let log = tmp.path().join("calls.log");
    let python = fake_python(tmp.path());
    let marker = existing_env(tmp.path(), "venv");

    venvup()
        .current_dir(tmp.path())
        .args(["--no-activate", "--python"])
        .arg(&python)
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("y\n")
        .assert()
        .success();

    assert!(!marker.exists());
    assert!(tmp.path().join("venv").join("bin").join("python").exists());
    assert!(read_log(&log).contains("-m pip install flask"));
}

#[cfg(unix)]
#[test]
fn test_project_config_is_honoured() {
    let tmp = project("");
    fs::create_dir(tmp.path().join("reqs")).unwrap();
    fs::write(tmp.path().join("reqs").join("dev.txt"), "foo\n").unwrap();
    fs::write(
        tmp.path().join("venvup.toml"),
        "[env]\nname = \".venv\"\n\n[manifest]\npath = \"reqs/dev.txt\"\n\n[install]\nrecord_failures = false\n\n[prompts]\nactivate = false\n",
    )
    .unwrap();
    let log = tmp.path().join("calls.log");
    let python = fake_python(tmp.path());

    venvup()
        .current_dir(tmp.path())
        .arg("--python")
        .arg(&python)
        .env("VENVUP_FAKE_LOG", &log)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Activate").not());

    assert!(tmp.path().join(".venv").join("bin").join("python").exists());
    assert!(read_log(&log).contains("-m pip install foo"));
    assert!(!tmp.path().join("reqs").join("failed_packages.txt").exists());
}
