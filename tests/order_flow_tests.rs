use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_place_and_pay_scenario() {
    // Canonical flow: stock 10 @ 500, order 3, pay with balance 2000.
    let file = common::scenario(&[
        "user, alice, pw1, , , 2000,",
        "user, bob, pw2, , , 0,",
        "stock, bob, , s1, b1:10:500, ,",
        "order, alice, , s1, b1:3, , o1",
        "pay, alice, pw1, , , , o1",
        "pay, alice, pw1, , , , o1",
    ]);

    let output = Command::new(cargo_bin!("bookstall"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "200,ok");
    assert_eq!(lines[1], "200,ok");
    assert_eq!(lines[2], "200,ok");
    assert!(lines[3].starts_with("200,ok,alice_s1_"), "got {}", lines[3]);
    assert_eq!(lines[4], "200,ok");
    assert!(lines[5].starts_with("518,invalid order id"), "got {}", lines[5]);
}

#[test]
fn test_balance_is_spent_exactly_once() {
    // 2000 covers 3 x 500 and then 1 x 500; the third order finds an empty
    // wallet and fails at settlement.
    let file = common::scenario(&[
        "user, alice, pw1, , , 2000,",
        "user, bob, pw2, , , 0,",
        "stock, bob, , s1, b1:10:500, ,",
        "order, alice, , s1, b1:3, , o1",
        "pay, alice, pw1, , , , o1",
        "order, alice, , s1, b1:1, , o2",
        "pay, alice, pw1, , , , o2",
        "order, alice, , s1, b1:1, , o3",
        "pay, alice, pw1, , , , o3",
    ]);

    let output = Command::new(cargo_bin!("bookstall"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[4], "200,ok", "first pay");
    assert_eq!(lines[6], "200,ok", "second pay drains the balance");
    assert!(
        lines[8].starts_with("519,insufficient funds"),
        "third pay must fail, got {}",
        lines[8]
    );
}

#[test]
fn test_order_validation_failures() {
    let file = common::scenario(&[
        "user, alice, pw1, , , 2000,",
        "user, bob, pw2, , , 0,",
        "stock, bob, , s1, b1:2:500, ,",
        "order, mallory, , s1, b1:1, ,",
        "order, alice, , nowhere, b1:1, ,",
        "order, alice, , s1, b9:1, ,",
        "order, alice, , s1, b1:3, ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("bookstall"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("511,user mallory does not exist"))
        .stdout(predicate::str::contains("513,store nowhere does not exist"))
        .stdout(predicate::str::contains("515,book b9 does not exist"))
        .stdout(predicate::str::contains("517,insufficient stock for book b1"));
}

#[test]
fn test_failed_basket_reserves_nothing() {
    // The first order trips on b2; b1 stock must be untouched, so a
    // follow-up order for all of b1 still succeeds.
    let file = common::scenario(&[
        "user, alice, pw1, , , 5000,",
        "user, bob, pw2, , , 0,",
        "stock, bob, , s1, b1:2:500;b2:1:750, ,",
        "order, alice, , s1, b1:2;b2:2, ,",
        "order, alice, , s1, b1:2, , o1",
    ]);

    let mut cmd = Command::new(cargo_bin!("bookstall"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("517,insufficient stock for book b2"))
        .stdout(predicate::str::contains("200,ok,alice_s1_"));
}

#[test]
fn test_settlement_authorization() {
    let file = common::scenario(&[
        "user, alice, pw1, , , 2000,",
        "user, bob, pw2, , , 0,",
        "stock, bob, , s1, b1:10:500, ,",
        "order, alice, , s1, b1:1, , o1",
        "pay, bob, pw2, , , , o1",
        "pay, alice, wrong, , , , o1",
        "pay, alice, pw1, , , , o1",
    ]);

    let output = Command::new(cargo_bin!("bookstall"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[4], "401,authorization failed", "not the buyer");
    assert_eq!(lines[5], "401,authorization failed", "bad password");
    assert_eq!(lines[6], "200,ok", "the real buyer still settles");
}

#[test]
fn test_fund_with_wrong_password() {
    let file = common::scenario(&[
        "user, alice, pw1, , , 0,",
        "fund, alice, wrong, , , 500,",
        "fund, nobody, pw, , , 500,",
    ]);

    let output = Command::new(cargo_bin!("bookstall"))
        .arg(file.path())
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[1], "401,authorization failed");
    // A missing user reads the same as a bad password.
    assert_eq!(lines[2], "401,authorization failed");
}
