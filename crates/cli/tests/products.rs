use assert_cmd::Command;
use serde_json::Value;

fn cli(db: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("vitrine-cli").unwrap();
    cmd.env("VITRINE_CONFIG_DIR", db.parent().unwrap())
        .env("RUST_LOG", "off")
        .arg("--db")
        .arg(db);
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn products_persist_between_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.json");

    let created = json_output(cli(&db).args([
        "products", "create", "--title", "Widget", "--description", "A widget", "--price", "9.99",
        "--active",
    ]));
    assert_eq!(created["result"], "ok");

    let duplicate = json_output(cli(&db).args([
        "products", "create", "--title", "widget", "--price", "1",
    ]));
    assert_eq!(duplicate["notifications"][0]["kind"], "duplicate");

    let listed = json_output(cli(&db).args(["products", "list"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Widget");

    let removed = json_output(cli(&db).args(["products", "remove", "--title", "WIDGET"]));
    assert_eq!(removed["result"], "Product deleted!");

    let listed = json_output(cli(&db).args(["products", "list"]));
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn update_with_malformed_id_reports_invalid_identity() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("catalog.json");

    let response = json_output(cli(&db).args(["products", "update", "--id", "nope"]));
    assert_eq!(response["notifications"][0]["kind"], "invalid_identity");
}
