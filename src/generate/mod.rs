//! CI pipeline generation
//!
//! Emits a configuration file that downloads the released Linux binary and
//! runs it against the configured project on every push.

pub mod circleci;
pub mod travis;

pub use travis::{parse_decrypt_command, TravisGenerator};

use crate::{
    error::{AppError, Result},
    models::Config,
    types::GenTarget,
};

/// File name of the published Linux binary for this version
pub fn binary_name() -> String {
    format!("{}-linux-amd64-v{}", crate::PKG_NAME, crate::VERSION)
}

/// Where CI jobs download `binary` from
pub fn download_url(binary: &str) -> String {
    format!("{}/{}", crate::defaults::RELEASE_BUCKET_URL, binary)
}

/// Render the pipeline configuration for `target`
pub async fn generate(target: GenTarget, config: &Config) -> Result<String> {
    generate_with(target, config, &TravisGenerator::new()).await
}

/// Same as [`generate`] with an explicit travis CLI wrapper
pub async fn generate_with(target: GenTarget, config: &Config, travis: &TravisGenerator) -> Result<String> {
    let binary = binary_name();
    match target {
        GenTarget::Travis => {
            let secret_key = config.secret_key.as_deref().ok_or_else(|| {
                AppError::config("--secretkey cannot be empty; provide a Google Cloud secret key")
            })?;
            travis.generate(secret_key, &binary, &config.project).await
        }
        GenTarget::CircleCi => Ok(circleci::render(&binary, &config.project)),
    }
}
