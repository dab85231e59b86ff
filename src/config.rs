use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_PIPELINE: &str = "pipeline.json";

/// Where to listen and which model artifact to load. Both are fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub addr: String,
    pub pipeline_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            pipeline_path: PathBuf::from(DEFAULT_PIPELINE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_address_and_artifact() {
        let settings = Settings::default();
        assert_eq!(settings.addr, "127.0.0.1:5000");
        assert_eq!(settings.pipeline_path, PathBuf::from("pipeline.json"));
    }
}
