use assert_cmd::Command;

fn shelf() -> Command {
    let mut cmd = Command::cargo_bin("shelf").unwrap();
    // nothing listens here; the cases below never reach the network
    cmd.env("SHELF_BASE_URL", "http://127.0.0.1:9");
    cmd
}

#[test]
fn help_lists_every_action() {
    let output = shelf().arg("--help").output().unwrap();
    assert!(output.status.success());

    let help = String::from_utf8(output.stdout).unwrap();
    for action in ["add-book", "search", "review", "list", "ui"] {
        assert!(help.contains(action), "missing {action} in:\n{help}");
    }
}

#[test]
fn empty_review_is_refused_locally() {
    let output = shelf().args(["review", "Dune", "   "]).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Please provide both title and review"));
}

#[test]
fn invalid_rating_is_refused_locally() {
    let output = shelf()
        .args(["add-book", "--title", "Dune", "--author", "Herbert", "--rating", "lots"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Invalid rating"));
}

#[test]
fn unreachable_service_is_reported_inline() {
    let output = shelf().args(["list"]).output().unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Failed to load books"));
}
