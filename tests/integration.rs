use std::{env, fs, path::PathBuf, process::Command};

fn run_bin(args: &[&str]) -> (bool, String) {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_episeed"));

    let output = Command::new(bin)
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to execute command");

    let stderr_str =
        String::from_utf8(output.stderr).expect("failed to convert stderr to string");

    (output.status.success(), stderr_str)
}

fn test_dir(name: &str) -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(&test_dir).expect("failed to create test directory");
    test_dir
}

const CONFIG: &str = "[domain]\n\
min_bound = 0.0\n\
max_bound = 1000.0\n\
bound_space = true\n\
\n\
[population]\n\
n_agents = 240\n\
\n\
[infection]\n\
reference = [20.0, 50.0]\n\
threshold = 100.0\n\
\n\
[engine]\n\
seed = 42\n\
\n\
[[index_agents]]\n\
position = [20.0, 50.0]\n";

#[test]
fn basic_workflow() {
    let test_dir = test_dir("basic_workflow");
    let config_path = test_dir.join("config.toml");
    fs::write(&config_path, CONFIG).expect("failed to write config file");
    let config_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let (success, stderr) = run_bin(&["--config", config_str, "check"]);
    assert!(success, "check failed\nstderr:\n{stderr}\n");
    assert!(stderr.contains("config is valid"));

    let (success, stderr) = run_bin(&["--config", config_str, "run", "--", "-b", "opaque"]);
    assert!(success, "run failed\nstderr:\n{stderr}\n");
    let placed = "placed index agent 240 at [20.0, 50.0, 0.0] (diameter 7.5, color 4)";
    assert!(stderr.contains(placed));
    assert!(stderr.contains("seeded 241 agents"));
    assert!(stderr.contains("simulation completed successfully"));

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails() {
    let test_dir = test_dir("invalid_config_fails");
    let config_path = test_dir.join("config.toml");
    let config = CONFIG.replace("n_agents = 240", "n_agents = 0");
    fs::write(&config_path, config).expect("failed to write config file");
    let config_str = config_path
        .to_str()
        .expect("failed to convert config path to string");

    let (success, stderr) = run_bin(&["--config", config_str, "run"]);
    assert!(!success);
    assert!(!stderr.contains("simulation completed successfully"));

    let missing_path = test_dir.join("missing.toml");
    let missing_str = missing_path
        .to_str()
        .expect("failed to convert config path to string");
    let (success, _) = run_bin(&["--config", missing_str, "check"]);
    assert!(!success);

    fs::remove_dir_all(&test_dir).ok();
}
