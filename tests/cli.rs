#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch directory plus the database path inside it.
struct Workspace {
    _dir: TempDir,
    database: PathBuf,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("data").join("choice.sqlite");
    Workspace {
        _dir: dir,
        database,
    }
}

fn the_choice(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("the-choice").unwrap();
    cmd.arg("--database").arg(&ws.database);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn items_are_listed_by_name() {
    let ws = workspace();
    the_choice(&ws)
        .args(["items", "add", "pizza", "Burger", "Salad"])
        .assert()
        .success();

    the_choice(&ws)
        .args(["items", "list"])
        .assert()
        .success()
        .stdout("Burger\npizza\nSalad\n");
}

#[test]
fn duplicate_item_is_rejected() {
    let ws = workspace();
    the_choice(&ws).args(["items", "add", "Soup"]).assert().success();

    the_choice(&ws)
        .args(["items", "add", "Soup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn seeding_twice_adds_nothing_the_second_time() {
    let ws = workspace();
    the_choice(&ws)
        .args(["items", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 10 default items."));

    the_choice(&ws)
        .args(["items", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 0 default items."));
}

#[test]
fn coin_prints_a_side() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "coin"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^(Heads|Tails)\n$").unwrap());
}

#[test]
fn dice_stays_within_six() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "dice"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[1-6]\n$").unwrap());
}

#[test]
fn single_sided_custom_die_always_shows_one() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "custom", "--range", "1"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn huge_custom_range_prints_a_face() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "custom", "--range", "10000000000"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[1-9][0-9]*\n$").unwrap());

    the_choice(&ws)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CUSTOM_DICE_MAXIMUM_RANGE_VALUE = 10000000000",
        ));
}

#[test]
fn blank_names_are_rejected() {
    let ws = workspace();
    the_choice(&ws)
        .args(["items", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item name must not be empty."));
    the_choice(&ws)
        .args(["lists", "add", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("List name must not be empty."));

    the_choice(&ws).args(["items", "add", "Soup"]).assert().success();
    the_choice(&ws)
        .args(["items", "rename", "Soup", " "])
        .assert()
        .failure();

    the_choice(&ws)
        .args(["items", "list"])
        .assert()
        .success()
        .stdout("Soup\n");
    the_choice(&ws)
        .args(["lists", "list"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn seeding_default_lists_twice_adds_nothing() {
    let ws = workspace();
    the_choice(&ws)
        .args(["lists", "seed"])
        .assert()
        .success()
        .stdout("Added 2 default lists.\n");
    the_choice(&ws)
        .args(["lists", "seed"])
        .assert()
        .success()
        .stdout("Added 0 default lists.\n");

    the_choice(&ws)
        .args(["lists", "list"])
        .assert()
        .success()
        .stdout("Antworten\nRestaurants Bonn\n");
}

#[test]
fn non_positive_range_fails() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "custom", "--range", "-4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));
}

#[test]
fn choose_remembers_method_and_range() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "custom", "--range", "7"])
        .assert()
        .success();

    the_choice(&ws)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("CHOICEMETHOD = RULE_CUSTOM_DICE"))
        .stdout(predicate::str::contains(
            "CUSTOM_DICE_MAXIMUM_RANGE_VALUE = 7",
        ));

    // No method given: the stored one is used.
    the_choice(&ws)
        .arg("choose")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[1-7]\n$").unwrap());
}

#[test]
fn choosing_from_a_list_picks_a_member() {
    let ws = workspace();
    the_choice(&ws).args(["lists", "add", "Lunch"]).assert().success();
    the_choice(&ws)
        .args(["lists", "link", "Lunch", "Soup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked \"Soup\" to \"Lunch\"."));

    the_choice(&ws)
        .args(["choose", "list", "--list", "Lunch"])
        .assert()
        .success()
        .stdout("Soup\n");

    the_choice(&ws)
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CHOICEMETHOD_FROM_LIST_LISTNAME = Lunch",
        ));
}

#[test]
fn empty_list_prints_a_hint() {
    let ws = workspace();
    the_choice(&ws).args(["lists", "add", "Dinner"]).assert().success();

    the_choice(&ws)
        .args(["choose", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has no items yet"));
}

#[test]
fn choosing_from_a_list_without_lists_fails() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no lists yet"));
}

#[test]
fn unknown_list_is_reported() {
    let ws = workspace();
    the_choice(&ws)
        .args(["choose", "list", "--list", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn removing_an_item_drops_it_from_lists() {
    let ws = workspace();
    the_choice(&ws).args(["lists", "add", "Lunch"]).assert().success();
    the_choice(&ws)
        .args(["lists", "link", "Lunch", "Soup", "Pizza"])
        .assert()
        .success();
    the_choice(&ws).args(["items", "remove", "Soup"]).assert().success();

    the_choice(&ws)
        .args(["lists", "show", "Lunch"])
        .assert()
        .success()
        .stdout("Pizza\n");
}

#[test]
fn removing_a_list_keeps_its_items() {
    let ws = workspace();
    the_choice(&ws).args(["lists", "add", "Lunch"]).assert().success();
    the_choice(&ws)
        .args(["lists", "link", "Lunch", "Soup"])
        .assert()
        .success();
    the_choice(&ws).args(["lists", "remove", "Lunch"]).assert().success();

    the_choice(&ws)
        .args(["lists", "list"])
        .assert()
        .success()
        .stdout("");
    the_choice(&ws)
        .args(["items", "list"])
        .assert()
        .success()
        .stdout("Soup\n");
}

#[test]
fn linking_twice_is_harmless() {
    let ws = workspace();
    the_choice(&ws).args(["lists", "add", "Lunch"]).assert().success();
    the_choice(&ws)
        .args(["lists", "link", "Lunch", "Soup"])
        .assert()
        .success();

    the_choice(&ws)
        .args(["lists", "link", "Lunch", "Soup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in"));
}
