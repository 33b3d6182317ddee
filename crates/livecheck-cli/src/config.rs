use anyhow::{Context, Result};
use livecheck_core::LivenessConfig;
use std::fs;
use std::path::Path;

/// Load session settings: TOML file if given, else defaults, then
/// `LIVECHECK_*` environment overrides on top.
pub fn load(path: Option<&Path>) -> Result<LivenessConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse(&text).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => LivenessConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

fn parse(text: &str) -> Result<LivenessConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecheck_core::FacingMode;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            blinks_required = 2
            blink_debounce = false

            [camera]
            facing = "environment"
            "#,
        )
        .unwrap();

        assert_eq!(config.blinks_required, 2);
        assert!(!config.blink_debounce);
        assert_eq!(config.camera.facing, FacingMode::Environment);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.aligned_frames_required, 30);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(parse("oval_margin = \"wide\"").is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("livecheck.toml");
        fs::write(&path, "aligned_frames_required = 10\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.aligned_frames_required, 10);
        assert!(load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
