use std::io::Write;
use std::process::{Command, Output};

fn optdemo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_optdemo"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run optdemo")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn no_arguments() {
    let output = optdemo(&[]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("No command detected.\n"));
    assert!(out.contains("Input: Not set\n"));
    assert!(out.contains("Count: Not set\n"));
    assert!(out.contains("Verbose: false\n"));
    assert!(stderr(&output).is_empty());
}

#[test]
fn command_and_options() {
    let output = optdemo(&[
        "run", "-input", "a.txt", "-count", "42", "-mode", "slow", "-color", "auto", "-tags",
        "x,y,z",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Command detected: run\n"));
    assert!(out.contains("Input: a.txt\n"));
    assert!(out.contains("Output: Not set\n"));
    assert!(out.contains("Count: 42\n"));
    assert!(out.contains("Mode: slow\n"));
    assert!(out.contains("Color: auto\n"));
    assert!(out.contains("Tags: x,y,z\n"));
}

#[test]
fn leading_option_is_not_a_command() {
    let output = optdemo(&["-count", "1", "run"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No command detected.\n"));
}

#[test]
fn verbose_reports_parsed_options() {
    let output = optdemo(&["-verbose", "build", "now"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Option: verbose, Parsed: true\n"));
    assert!(out.contains("Option: count, Parsed: false\n"));
    assert!(out.contains("Positional: build now\n"));
}

#[test]
fn help_prints_usage() {
    let output = optdemo(&["-help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.starts_with("Usage: "));
    assert!(out.contains("-count (int: 1..100)"));
    assert!(out.contains("-mode (combo: fast,slow,normal)"));
    assert!(out.contains("Processing mode"));
    assert!(!out.contains("Command detected"));
}

#[test]
fn unknown_option_exits_with_status_1() {
    let output = optdemo(&["-bogus", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Unknown option: -bogus\n");
    assert!(stdout(&output).is_empty());
}

#[test]
fn out_of_range_value_exits_with_status_1() {
    let output = optdemo(&["-count", "500"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.starts_with("Error: invalid value '500' for option -count"));
}

#[test]
fn missing_value_exits_with_status_1() {
    let output = optdemo(&["-input"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Error: missing value for option -input\n");
}

#[test]
fn too_many_tags_exits_with_status_1() {
    let output = optdemo(&["-tags", "a,b,c,d,e,f,g,h,i,j,k"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: too many elements for option -tags"));
}

#[test]
fn config_file_with_command_line_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "# demo settings\ninput = from-config.txt\ncount = 7\nmode = fast\nverbose\n"
    )
    .unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let output = optdemo(&["-config", path.as_str(), "-count", "9"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Input: from-config.txt\n"));
    assert!(out.contains("Count: 9\n"));
    assert!(out.contains("Mode: fast\n"));
    assert!(out.contains("Verbose: true\n"));
}

#[test]
fn unreadable_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.conf");
    let output = optdemo(&["-config", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: cannot read "));
}
