mod support;

use std::fs;

use tempfile::tempdir;

use support::{describe, run_sustain, spawn_http_server};

#[test]
fn e2e_run_until_deadline() -> Result<(), String> {
    let (url, server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_sustain(
        dir.path(),
        ["-u", url.as_str(), "-w", "4", "-t", "500ms", "--no-banner"],
    )?;
    if !output.status.success() {
        return Err(describe(&output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Starting run: http://127.0.0.1:") || !stdout.contains("workers=4") {
        return Err(format!("Missing start line.\n{}", describe(&output)));
    }
    if !stdout.contains("Run complete (duration reached)") {
        return Err(format!("Missing completion line.\n{}", describe(&output)));
    }
    if server.requests() == 0 {
        return Err("Server saw no requests.".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_run_reads_config_file() -> Result<(), String> {
    let (url, server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let config = format!(
        "url = \"{}\"\nworkers = 2\nduration = \"300ms\"\nno_banner = true\n",
        url
    );
    fs::write(dir.path().join("sustain.toml"), config)
        .map_err(|err| format!("write config failed: {}", err))?;

    let output = run_sustain(dir.path(), Vec::<&str>::new())?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    if !String::from_utf8_lossy(&output.stdout).contains("workers=2") {
        return Err(format!("Config was not applied.\n{}", describe(&output)));
    }
    if server.requests() == 0 {
        return Err("Server saw no requests.".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_unresolvable_host_fails_before_sending() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let output = run_sustain(
        dir.path(),
        ["-u", "http://sustain-test.invalid/", "-t", "5s", "--no-banner"],
    )?;
    if output.status.success() {
        return Err(format!("Expected failure.\n{}", describe(&output)));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("Error:") {
        return Err(format!("Missing error report.\n{}", describe(&output)));
    }
    if String::from_utf8_lossy(&output.stdout).contains("Run complete") {
        return Err(format!("Run should not have started.\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_usage_errors_exit_non_zero() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;

    let cases: [&[&str]; 4] = [
        &["--no-banner"],
        &["-u", "http://127.0.0.1:9/", "-w", "0"],
        &["-u", "http://127.0.0.1:9/", "-t", "0"],
        &["-u", "http://127.0.0.1:9/", "--no-ua"],
    ];
    for args in cases {
        let output = run_sustain(dir.path(), args)?;
        if output.status.success() {
            return Err(format!("Expected {:?} to fail.\n{}", args, describe(&output)));
        }
    }
    Ok(())
}
