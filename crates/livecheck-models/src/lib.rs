use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One detector network: its weights manifest plus the weight shards it references.
pub struct ModelNet {
    pub name: &'static str,
    pub files: &'static [&'static str],
}

/// Name of the optional digest list inside the model directory, in
/// `sha256sum` output format.
pub const CHECKSUMS_FILE: &str = "SHA256SUMS";

/// Networks the face detector collaborator loads before a session can start.
pub const MODELS: &[ModelNet] = &[
    ModelNet {
        name: "tiny face detector",
        files: &[
            "tiny_face_detector_model-weights_manifest.json",
            "tiny_face_detector_model-shard1",
        ],
    },
    ModelNet {
        name: "68-point face landmarks",
        files: &[
            "face_landmark_68_model-weights_manifest.json",
            "face_landmark_68_model-shard1",
        ],
    },
    ModelNet {
        name: "face expressions",
        files: &[
            "face_expression_model-weights_manifest.json",
            "face_expression_model-shard1",
        ],
    },
];

#[derive(Error, Debug)]
pub enum ModelIntegrityError {
    #[error("model file not found: {name} ({path})")]
    MissingModel { name: &'static str, path: PathBuf },

    #[error("failed to open model file: {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read model file: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed checksum list {path} at line {line}")]
    MalformedChecksums { path: PathBuf, line: usize },

    #[error(
        "model checksum mismatch for {name} ({path})\n  expected: {expected}\n  got:      {got}"
    )]
    ChecksumMismatch {
        name: &'static str,
        path: PathBuf,
        expected: String,
        got: String,
    },
}

/// What a successful directory verification covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifySummary {
    pub files_present: usize,
    /// Files whose digest was listed in `SHA256SUMS` and matched.
    pub digests_verified: usize,
}

/// Compute SHA-256 hex digest of a file.
pub fn sha256_file_hex(path: &Path) -> Result<String, ModelIntegrityError> {
    let mut file = fs::File::open(path).map_err(|source| ModelIntegrityError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = file
            .read(&mut buf)
            .map_err(|source| ModelIntegrityError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn verify_file_sha256(
    name: &'static str,
    path: &Path,
    expected_sha256: &str,
) -> Result<(), ModelIntegrityError> {
    if !path.exists() {
        return Err(ModelIntegrityError::MissingModel {
            name,
            path: path.to_path_buf(),
        });
    }

    let digest = sha256_file_hex(path)?;
    if !digest.eq_ignore_ascii_case(expected_sha256) {
        return Err(ModelIntegrityError::ChecksumMismatch {
            name,
            path: path.to_path_buf(),
            expected: expected_sha256.to_string(),
            got: digest,
        });
    }

    Ok(())
}

/// Parse `sha256sum`-style lines (`<hex>  <file>` or `<hex> *<file>`).
/// Blank lines and `#` comments are skipped.
pub fn parse_checksums(
    contents: &str,
    path: &Path,
) -> Result<HashMap<String, String>, ModelIntegrityError> {
    let mut sums = HashMap::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || ModelIntegrityError::MalformedChecksums {
            path: path.to_path_buf(),
            line: idx + 1,
        };
        let (digest, file) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let file = file.trim_start().trim_start_matches('*');
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) || file.is_empty()
        {
            return Err(malformed());
        }
        sums.insert(file.to_string(), digest.to_ascii_lowercase());
    }
    Ok(sums)
}

/// Check every required network file is present in `model_dir`, and verify
/// digests for the files listed in `SHA256SUMS` when that file exists.
pub fn verify_models_dir(model_dir: &Path) -> Result<VerifySummary, ModelIntegrityError> {
    let sums_path = model_dir.join(CHECKSUMS_FILE);
    let sums = if sums_path.exists() {
        let contents =
            fs::read_to_string(&sums_path).map_err(|source| ModelIntegrityError::Read {
                path: sums_path.clone(),
                source,
            })?;
        parse_checksums(&contents, &sums_path)?
    } else {
        HashMap::new()
    };

    let mut summary = VerifySummary {
        files_present: 0,
        digests_verified: 0,
    };

    for model in MODELS {
        for &file in model.files {
            let path = model_dir.join(file);
            match sums.get(file) {
                Some(expected) => {
                    verify_file_sha256(file, &path, expected)?;
                    summary.digests_verified += 1;
                }
                None if !path.exists() => {
                    return Err(ModelIntegrityError::MissingModel { name: file, path });
                }
                None => {}
            }
            summary.files_present += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(dir: &Path) {
        for model in MODELS {
            for file in model.files {
                fs::write(dir.join(file), file.as_bytes()).unwrap();
            }
        }
    }

    #[test]
    fn verify_file_sha256_rejects_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope-shard1");

        let err = verify_file_sha256("nope-shard1", &path, "00").unwrap_err();
        assert!(matches!(err, ModelIntegrityError::MissingModel { .. }));
    }

    #[test]
    fn verify_file_sha256_rejects_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model-shard1");
        fs::write(&path, b"hello").unwrap();

        let err = verify_file_sha256("model-shard1", &path, "00").unwrap_err();
        assert!(matches!(err, ModelIntegrityError::ChecksumMismatch { .. }));
    }

    #[test]
    fn verify_file_sha256_accepts_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model-shard1");
        fs::write(&path, b"hello").unwrap();

        let digest = sha256_file_hex(&path).unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        verify_file_sha256("model-shard1", &path, &digest.to_uppercase()).unwrap();
    }

    #[test]
    fn verify_models_dir_reports_missing() {
        let dir = tempfile::tempdir().unwrap();

        let err = verify_models_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ModelIntegrityError::MissingModel { .. }));
    }

    #[test]
    fn verify_models_dir_presence_only_without_checksums() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());

        let summary = verify_models_dir(dir.path()).unwrap();
        assert_eq!(summary.files_present, 6);
        assert_eq!(summary.digests_verified, 0);
    }

    #[test]
    fn verify_models_dir_checks_listed_digests() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let shard = "face_expression_model-shard1";
        let digest = sha256_file_hex(&dir.path().join(shard)).unwrap();
        fs::write(
            dir.path().join(CHECKSUMS_FILE),
            format!("# expression net\n{digest} *{shard}\n"),
        )
        .unwrap();

        let summary = verify_models_dir(dir.path()).unwrap();
        assert_eq!(summary.digests_verified, 1);

        fs::write(dir.path().join(shard), b"tampered").unwrap();
        let err = verify_models_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ModelIntegrityError::ChecksumMismatch { name, .. } if name == shard));
    }

    #[test]
    fn parse_checksums_rejects_garbage() {
        let err = parse_checksums("not-a-digest file\n", Path::new("SHA256SUMS")).unwrap_err();
        assert!(matches!(
            err,
            ModelIntegrityError::MalformedChecksums { line: 1, .. }
        ));
    }
}
