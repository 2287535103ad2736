//! Regex patterns shared by every insurer layout.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Policy type marker, tolerant to case and OCR spacing
    pub static ref AUTO_RCA: Regex = Regex::new(r"(?i)AUTO\s*RCA").unwrap();

    // Romanian plates in free text: county (CJ07ABC) or Bucharest (B123ABC),
    // whitespace on both sides
    pub static ref PLATE_BOUNDED: Regex = Regex::new(
        r"\s([A-Z]{2}[0-9]{2}[A-Z]{3}|B[0-9]{2,3}[A-Z]{3})\s"
    ).unwrap();

    // Same shapes inside a region that holds nothing but the plate
    pub static ref PLATE_CROPPED: Regex = Regex::new(
        r"([A-Z]{2}[0-9]{2}[A-Z]{3}|B[0-9]{2,3}[A-Z]{3})"
    ).unwrap();
}

/// Whether `text` carries the RCA policy marker.
pub fn is_rca(text: &str) -> bool {
    AUTO_RCA.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rca_marker_tolerance() {
        assert!(is_rca("POLITA DE ASIGURARE AUTO RCA"));
        assert!(is_rca("auto  rca"));
        assert!(is_rca("AUTORCA"));
        assert!(!is_rca("CASCO"));
    }
}
