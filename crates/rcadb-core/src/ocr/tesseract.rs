//! OCR engine wrapper around the `tesseract` executable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, trace};

use crate::error::OcrError;

use super::{OcrEngine, OcrKind, OcrRequest};

/// Romanian plate shapes in tesseract user-pattern syntax.
const PLATE_PATTERNS: &str = include_str!("../../resources/ro_plates.patterns");

/// OCR engine that shells out to tesseract for every region.
pub struct TesseractCli {
    binary: PathBuf,
    plate_patterns: PathBuf,
    /// Keep temp dir alive so the patterns file isn't deleted.
    _temp_dir: tempfile::TempDir,
}

impl TesseractCli {
    /// Create an engine using the given executable.
    ///
    /// The bundled plate patterns are written to a temporary directory that
    /// lives as long as the engine.
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self, OcrError> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| OcrError::TempFile(format!("failed to create temp dir: {}", e)))?;
        let plate_patterns = temp_dir.path().join("ro_plates.patterns");
        std::fs::write(&plate_patterns, PLATE_PATTERNS)
            .map_err(|e| OcrError::TempFile(format!("failed to write plate patterns: {}", e)))?;

        let binary = binary.into();
        debug!("Using tesseract at {}", binary.display());

        Ok(Self {
            binary,
            plate_patterns,
            _temp_dir: temp_dir,
        })
    }

    /// Check whether the executable can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn build_args(&self, input: &Path, request: &OcrRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input.as_os_str().to_owned(),
            "stdout".into(),
            "-l".into(),
            request.language.clone().into(),
            "--psm".into(),
            request.psm.as_number().to_string().into(),
        ];

        let patterns = match (&request.user_patterns, request.kind) {
            (Some(path), _) => Some(path.as_path()),
            (None, OcrKind::Plate) => Some(self.plate_patterns.as_path()),
            (None, _) => None,
        };
        if let Some(path) = patterns {
            args.push("--user-patterns".into());
            args.push(path.as_os_str().to_owned());
        }

        if let Some(whitelist) = &request.char_whitelist {
            args.push("-c".into());
            args.push(format!("tessedit_char_whitelist={}", whitelist).into());
        }

        args
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage, request: &OcrRequest) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("empty region {}x{}", width, height)));
        }

        let input = tempfile::Builder::new()
            .prefix("rcadb-region-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::TempFile(e.to_string()))?;
        image
            .save_with_format(input.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let args = self.build_args(input.path(), request);
        trace!("tesseract {:?}", args);

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| OcrError::Spawn(format!("{}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            return Err(OcrError::Recognition(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Recognized {} chars from {}x{} region", text.len(), width, height);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrProfile;

    #[test]
    fn test_plate_args_use_bundled_patterns() {
        let engine = TesseractCli::new("tesseract").unwrap();
        let request = OcrProfile::default().request(OcrKind::Plate);
        let args = engine.build_args(Path::new("in.png"), &request);

        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(&args[..6], &["in.png", "stdout", "-l", "ron", "--psm", "7"]);
        assert!(args.contains(&"--user-patterns".to_string()));
        assert!(args.iter().any(|a| a.starts_with("tessedit_char_whitelist=")));
        assert!(std::fs::read_to_string(&engine.plate_patterns)
            .unwrap()
            .contains(r"B\d\d\A\A\A"));
    }

    #[test]
    fn test_text_args_have_no_whitelist() {
        let engine = TesseractCli::new("tesseract").unwrap();
        let request = OcrProfile::default().request(OcrKind::Text);
        let args = engine.build_args(Path::new("in.png"), &request);

        assert_eq!(args.len(), 6);
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let engine = TesseractCli::new("/nonexistent/tesseract-binary").unwrap();
        let request = OcrProfile::default().request(OcrKind::Text);
        let result = engine.recognize(&DynamicImage::new_luma8(4, 4), &request);

        assert!(matches!(result, Err(OcrError::Spawn(_))));
        assert!(!engine.is_available());
    }
}
