//! Travis CI pipeline with an encrypted service-account key

use super::download_url;
use crate::error::{AppError, Result};
use std::io::ErrorKind;
use std::path::Path;
use tokio::process::Command;

/// Marker of the decrypt command in `travis encrypt-file` output
const DECRYPT_MARKER: &str = "openssl aes-256-cbc";

/// Generates `.travis.yml` by shelling out to the travis CLI
pub struct TravisGenerator {
    program: String,
}

impl TravisGenerator {
    pub fn new() -> Self {
        Self::with_program("travis")
    }

    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self { program: program.into() }
    }

    /// Encrypt the key into the repository and render the pipeline
    pub async fn generate(&self, secret_key: &Path, binary: &str, project: &str) -> Result<String> {
        let output = self.encrypt_file(secret_key).await?;
        let decrypt = parse_decrypt_command(&output);

        let key_name = secret_key
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| secret_key.display().to_string());

        Ok(render(&decrypt, binary, project, &key_name))
    }

    /// Run `travis encrypt-file <key> -f` and return its output.
    ///
    /// stdout and stderr are captured separately and joined in that order,
    /// not interleaved. The decrypt command is printed on stdout.
    pub async fn encrypt_file(&self, secret_key: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("encrypt-file")
            .arg(secret_key)
            .arg("-f")
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    AppError::generate(format!(
                        "{} command is not installed, see https://github.com/travis-ci/travis.rb",
                        self.program
                    ))
                } else {
                    AppError::generate(format!("cannot run {}: {}", self.program, e))
                }
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(AppError::generate(combined.trim_end().to_string()));
        }
        Ok(combined)
    }
}

impl Default for TravisGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The last line mentioning the decrypt command, trimmed; empty when absent
pub fn parse_decrypt_command(output: &str) -> String {
    output
        .lines()
        .filter(|line| line.contains(DECRYPT_MARKER))
        .last()
        .map(|line| line.trim().to_string())
        .unwrap_or_default()
}

pub fn render(decrypt: &str, binary: &str, project: &str, secret_key: &str) -> String {
    format!(
        "branches:
  only:
    - master

before_install:
 - {decrypt}

install:
 - wget {url} && chmod +x ./{binary}

script:
 - GOOGLE_APPLICATION_CREDENTIALS={secret_key} ./{binary} --project={project}
",
        decrypt = decrypt,
        url = download_url(binary),
        binary = binary,
        secret_key = secret_key,
        project = project,
    )
}
