use crate::error::{Result, SimError};
use std::{env, path::PathBuf};

const ENV_OUTPUT_DIR: &str = "COMPASS_SIM_OUTPUT_DIR";
const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub output_dir: PathBuf,
}

impl SimConfig {
    pub fn from_env() -> Result<Self> {
        let output_dir = match env::var(ENV_OUTPUT_DIR) {
            Ok(dir) if !dir.trim().is_empty() => {
                let path = PathBuf::from(dir);
                // an existing file is rejected before the run starts
                if path.exists() && !path.is_dir() {
                    return Err(SimError::InvalidConfiguration(format!(
                        "Output path is not a directory: {}",
                        path.display()
                    )));
                }
                path
            }
            _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
        };
        Ok(Self { output_dir })
    }
}
