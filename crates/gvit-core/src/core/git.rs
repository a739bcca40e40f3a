use std::path::Path;

use anyhow::Result;

use crate::core::runtime::effects::GitClient;
use crate::core::runtime::process::{run_command, RunOutput};
use crate::core::tooling::outcome::BackendOperationError;

/// Production git client: every operation shells out to the git binary.
pub struct SystemGit;

impl SystemGit {
    fn run_checked(
        &self,
        args: Vec<String>,
        cwd: Option<&Path>,
        what: &str,
    ) -> Result<RunOutput> {
        let output = run_command("git", &args, cwd)?;
        if output.success() {
            Ok(output)
        } else {
            Err(BackendOperationError::new(format!("{what} failed"), output.diagnostic()).into())
        }
    }
}

impl GitClient for SystemGit {
    fn clone_repo(&self, url: &str, target: &Path, extra_args: &[String]) -> Result<()> {
        let mut args = vec![
            "clone".to_string(),
            url.to_string(),
            target.display().to_string(),
        ];
        args.extend_from_slice(extra_args);
        let output = self.run_checked(args, None, "git clone")?;
        tracing::debug!("git clone: {}", output.diagnostic());
        Ok(())
    }

    fn init_repo(&self, dir: &Path, extra_args: &[String]) -> Result<()> {
        let mut args = vec!["init".to_string()];
        args.extend_from_slice(extra_args);
        self.run_checked(args, Some(dir), "git init")?;
        Ok(())
    }

    fn pull(&self, dir: &Path, extra_args: &[String]) -> Result<RunOutput> {
        let mut args = vec!["pull".to_string()];
        args.extend_from_slice(extra_args);
        self.run_checked(args, Some(dir), "git pull")
    }

    fn commit(&self, dir: &Path, extra_args: &[String]) -> Result<RunOutput> {
        let mut args = vec!["commit".to_string()];
        args.extend_from_slice(extra_args);
        // git commit fails for ordinary reasons (nothing staged); surface
        // its own output rather than wrapping it
        self.run_checked(args, Some(dir), "git commit")
    }

    fn add_remote(&self, dir: &Path, url: &str) -> Result<()> {
        let args = vec![
            "remote".to_string(),
            "add".to_string(),
            "origin".to_string(),
            url.to_string(),
        ];
        self.run_checked(args, Some(dir), "git remote add")?;
        Ok(())
    }

    fn remote_url(&self, dir: &Path) -> String {
        let args = vec![
            "remote".to_string(),
            "get-url".to_string(),
            "origin".to_string(),
        ];
        match run_command("git", &args, Some(dir)) {
            Ok(output) if output.success() => output.stdout.trim().to_string(),
            _ => String::new(),
        }
    }

    fn is_repository(&self, dir: &Path) -> bool {
        dir.join(".git").exists()
    }
}
