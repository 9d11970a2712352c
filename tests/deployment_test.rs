use anyhow::Result;
use std::path::Path;

fn read(relative: &str) -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(relative);
    Ok(std::fs::read_to_string(path)?)
}

#[test]
fn test_boot_script_exports_env_file_then_starts_server() -> Result<()> {
    let script = read("boot.sh")?;
    let lines: Vec<&str> = script.lines().map(str::trim).collect();

    let position = |needle: &str| lines.iter().position(|line| line.starts_with(needle));
    let fail_fast = position("set -e").expect("set -e");
    let export = position("set -a").expect("set -a");
    let source = position("source").expect("source");
    let exec = position("exec").expect("exec");

    assert!(fail_fast < export && export < source && source < exec);
    assert!(script.contains("/opt/mme_soleil/environment.env"));
    assert!(lines[exec].contains("serve --bind 0.0.0.0:8001"));
    Ok(())
}

#[test]
fn test_workflow_pushes_after_login() -> Result<()> {
    let workflow = read(".github/workflows/docker-publish.yml")?;

    assert!(workflow.contains("branches: [ \"main\" ]"));
    assert!(workflow.contains("tags: ghcr.io/roel/mme_soleil:latest"));
    assert!(workflow.contains("registry: ghcr.io"));

    let checkout = workflow.find("actions/checkout").expect("checkout step");
    let login = workflow.find("docker/login-action").expect("login step");
    let build = workflow.find("docker/build-push-action").expect("build step");
    assert!(checkout < login && login < build);
    // a single step builds and pushes, so a failed build never pushes
    assert_eq!(workflow.matches("push: true").count(), 1);
    Ok(())
}

#[test]
fn test_image_runs_boot_script() -> Result<()> {
    let dockerfile = read("Dockerfile")?;

    assert_eq!(dockerfile.matches("FROM ").count(), 2);
    assert!(dockerfile.contains("EXPOSE 8001"));
    assert!(dockerfile.contains("boot.sh"));
    Ok(())
}
