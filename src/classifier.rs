//! Solid-body record detection.

use crate::constants::lines::SOLID_BODY_MARKER;

/// Decides whether a raw line describes a solid-body record worth scanning.
#[derive(Clone, Debug)]
pub struct LineClassifier {
    marker: String,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new(SOLID_BODY_MARKER)
    }
}

impl LineClassifier {
    /// Create a classifier for `marker`.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Return the marker this classifier looks for.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// True if the marker occurs after the first character of `line`.
    pub fn is_solid_body(&self, line: &str) -> bool {
        contains_after_start(line, &self.marker)
    }
}

/// True if `marker` first occurs at an index greater than zero.
///
/// A marker at index 0 counts as absent. Every corpus line starts with a file
/// path, so a line opening with the marker has lost its prefix.
pub fn contains_after_start(line: &str, marker: &str) -> bool {
    line.find(marker).is_some_and(|idx| idx > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_after_prefix_is_accepted() {
        let classifier = LineClassifier::default();
        assert!(classifier.is_solid_body("/a/b.step: #5=MANIFOLD_SOLID_BREP('x',#6);"));
        assert!(classifier.is_solid_body("xMANIFOLD_SOLID_BREP"));
    }

    #[test]
    fn marker_at_line_start_is_rejected() {
        let classifier = LineClassifier::default();
        assert!(!classifier.is_solid_body("MANIFOLD_SOLID_BREP('x',#6);"));
    }

    #[test]
    fn only_first_occurrence_is_considered() {
        // The first hit sits at index 0, so the later one does not rescue the line.
        let classifier = LineClassifier::default();
        assert!(!classifier.is_solid_body("MANIFOLD_SOLID_BREP MANIFOLD_SOLID_BREP"));
    }

    #[test]
    fn missing_marker_is_rejected() {
        let classifier = LineClassifier::default();
        assert!(!classifier.is_solid_body("/a/b.step: #5=PRODUCT('x','y','',(#2));"));
        assert!(!classifier.is_solid_body(""));
    }

    #[test]
    fn custom_marker_is_honored() {
        let classifier = LineClassifier::new("BREP_WITH_VOIDS");
        assert_eq!(classifier.marker(), "BREP_WITH_VOIDS");
        assert!(classifier.is_solid_body("f.step: BREP_WITH_VOIDS('a')"));
        assert!(!classifier.is_solid_body("f.step: MANIFOLD_SOLID_BREP('a')"));
    }
}
