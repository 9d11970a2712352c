use crate::utils::error::Result;
use std::path::Path;

pub const DEFAULT_ENV_FILE: &str = "/opt/mme_soleil/environment.env";

/// Exports every `KEY=value` pair of the file into the process environment,
/// replacing values that are already set. Returns the number of pairs.
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let count = dotenvy::from_path_iter(path)?.count();
    dotenvy::from_path_override(path)?;
    tracing::debug!("Loaded {} variables from {}", count, path.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::SoleilError;

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_env_file(dir.path().join("missing.env"));
        assert!(matches!(result, Err(SoleilError::EnvFile(_))));
    }
}
