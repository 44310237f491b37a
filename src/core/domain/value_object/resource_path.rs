use crate::core::domain::error::ValidationError;
use std::fmt;

/// A segmented API resource path such as `nodes/pve1/qemu/100/status/start`.
///
/// Segments are pushed unvalidated so accessors can be chained freely;
/// [`ResourcePath::validate`] runs before the path is put on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// The API root (`/api2/json/`).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Iterates over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Checks that every segment is non-empty and contains no `/`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for segment in &self.segments {
            if segment.trim().is_empty() {
                return Err(ValidationError::Format(format!(
                    "Empty segment in resource path '{self}'"
                )));
            }
            if segment.contains('/') {
                return Err(ValidationError::Format(format!(
                    "Segment '{segment}' in resource path '{self}' contains '/'"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_display() {
        let path = ResourcePath::root()
            .join("nodes")
            .join("pve1")
            .join("qemu")
            .join(100);
        assert_eq!(path.to_string(), "nodes/pve1/qemu/100");
        assert!(path.validate().is_ok());
    }

    #[test]
    fn test_invalid_segments() {
        assert!(ResourcePath::root().join("").validate().is_err());
        assert!(ResourcePath::root().join("nodes").join(" ").validate().is_err());
        assert!(ResourcePath::root().join("a/b").validate().is_err());
    }
}
