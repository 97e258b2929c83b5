use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the binary against `data_file` with console logging disabled
fn run(data_file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_addressbook-rs"))
        .arg("--quiet")
        .arg("--data-file")
        .arg(data_file)
        .args(args)
        .env_remove("ADDRESSBOOK_FILE_PATH")
        .env_remove("ADDRESSBOOK_LOG_FILE")
        .output()
        .expect("Failed to spawn binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Id printed for the person whose list line contains `name`
fn id_of(listing: &str, name: &str) -> String {
    let line = listing
        .lines()
        .find(|line| line.contains(name))
        .unwrap_or_else(|| panic!("{} not listed in:\n{}", name, listing));
    let start = line.rfind("(id: ").unwrap() + "(id: ".len();
    line[start..line.len() - 1].to_string()
}

#[test]
fn test_full_session() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("book.json");

    // Add two persons
    let out = run(&data, &["add", "--name", "Alice", "--phone", "91234567", "--tag", "friends"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("New person added: Alice"));
    let out = run(&data, &["add", "--name", "Bob", "--phone", "98765432"]);
    assert!(out.status.success(), "{}", stderr(&out));

    // Ids from the listing
    let listing = stdout(&run(&data, &["list"]));
    assert!(listing.contains("1. Alice"));
    let alice = id_of(&listing, "Alice");
    let bob = id_of(&listing, "Bob");

    // Relate them
    let out = run(&data, &["relate", &alice, &bob, "Mentor", "--reverse", "Mentee"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = run(&data, &["relationships"]);
    assert!(stdout(&out).contains("Alice is Mentor of Bob; Bob is Mentee of Alice"));

    // Event with both as contacts
    let out = run(
        &data,
        &[
            "add-event",
            "--title",
            "Budget Meeting",
            "--date",
            "2024-03-01 10:00",
            "--contact",
            "1",
            "--contact",
            "2",
        ],
    );
    assert!(out.status.success(), "{}", stderr(&out));

    // Deleting Alice cascades
    let out = run(&data, &["delete", "1"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("1 relationships removed, 1 events updated"));

    let events = stdout(&run(&data, &["events"]));
    assert!(events.contains("Budget Meeting"));
    assert!(events.contains("Contacts: Bob"));
    assert!(!events.contains("Alice"));

    let relationships = stdout(&run(&data, &["relationships"]));
    assert!(relationships.contains("0 relationships listed"));
}

#[test]
fn test_find_is_case_insensitive_substring() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("book.json");
    for (name, phone) in [("Alice", "111"), ("Natalie", "222"), ("Bob", "333")] {
        let out = run(&data, &["add", "--name", name, "--phone", phone]);
        assert!(out.status.success(), "{}", stderr(&out));
    }

    let out = run(&data, &["find", "ALI"]);

    let text = stdout(&out);
    assert!(text.contains("2 persons listed"));
    assert!(text.contains("Alice"));
    assert!(text.contains("Natalie"));
    assert!(!text.contains("Bob"));
}

#[test]
fn test_duplicate_person_fails() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("book.json");
    run(&data, &["add", "--name", "Alice", "--phone", "111"]);

    let out = run(&data, &["add", "--name", "Alice", "--phone", "111"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("This person already exists in the address book"));
}

#[test]
fn test_invalid_index_fails() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("book.json");

    let out = run(&data, &["delete", "5"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("The person index provided is invalid: 5"));
    // Nothing written on failure
    assert!(!data.exists());
}

#[test]
fn test_invalid_data_file_extension() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("book.txt");

    let out = run(&data, &["list"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains(".json"));
}

#[test]
fn test_schema_lists_record_fields() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("book.json");

    let out = run(&data, &["schema"]);

    assert!(out.status.success(), "{}", stderr(&out));
    let schema = stdout(&out);
    assert!(schema.contains("forwardName"));
    assert!(schema.contains("contacts"));
}
