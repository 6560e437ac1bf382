use serde::Serialize;

/// Verdict returned to the caller for one initialize/rotate invocation.
///
/// `was_rotated = true` also denotes a successful what-if simulation.
#[derive(Debug, Clone, Serialize)]
pub struct RotationResult {
    /// Resource name the verdict is about
    pub name: String,

    /// Whether the rotation (or its simulation) completed
    pub was_rotated: bool,

    /// Human-readable outcome
    pub notes: String,
}

impl RotationResult {
    /// Successful rotation or what-if simulation
    pub fn rotated(name: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            was_rotated: true,
            notes: notes.into(),
        }
    }

    /// Skipped or failed invocation
    pub fn not_rotated(name: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            was_rotated: false,
            notes: notes.into(),
        }
    }
}

impl std::fmt::Display for RotationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let outcome = if self.was_rotated { "rotated" } else { "skipped" };
        write!(f, "{}: {} ({})", self.name, outcome, self.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let ok = RotationResult::rotated("s1", "stored new value");
        assert!(ok.was_rotated);
        assert_eq!(ok.name, "s1");

        let skip = RotationResult::not_rotated("s1", "secret not found");
        assert!(!skip.was_rotated);
        assert!(skip.notes.contains("not found"));
    }

    #[test]
    fn test_display() {
        let verdict = RotationResult::rotated("s1", "ok");
        assert_eq!(verdict.to_string(), "s1: rotated (ok)");
    }
}
