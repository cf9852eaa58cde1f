use msr_core::Coord;

/// Named board presets. Each difficulty fixes `(width, height, mines)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    /// The fixed `(width, height, mines)` tuple for this preset.
    pub fn dimensions(&self) -> (Coord, Coord, u16) {
        match self {
            Self::Beginner => (9, 9, 10),
            Self::Intermediate => (20, 20, 50),
            Self::Expert => (20, 20, 99),
        }
    }
    pub fn all() -> [Self; 3] {
        [Self::Beginner, Self::Intermediate, Self::Expert]
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Expert => write!(f, "expert"),
        }
    }
}

impl TryFrom<&str> for Difficulty {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "expert" => Ok(Self::Expert),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn presets() {
        assert_eq!(Difficulty::Beginner.dimensions(), (9, 9, 10));
        assert_eq!(Difficulty::Intermediate.dimensions(), (20, 20, 50));
        assert_eq!(Difficulty::Expert.dimensions(), (20, 20, 99));
    }
    #[test]
    fn round_trip_names() {
        for d in Difficulty::all() {
            assert_eq!(Difficulty::try_from(d.to_string().as_str()), Ok(d));
        }
    }
    #[test]
    fn unknown_name() {
        assert!(Difficulty::try_from("impossible").is_err());
    }
    #[test]
    fn mines_fit_outside_safe_zone() {
        for d in Difficulty::all() {
            let (w, h, m) = d.dimensions();
            assert!((m as i32) <= (w as i32) * (h as i32) - 9);
        }
    }
}
