use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "lily-hop"])
        .status()
        .expect("failed to invoke cargo check for lily-hop CLI binary");

    assert!(status.success(), "cargo check --bin lily-hop should succeed");
}
