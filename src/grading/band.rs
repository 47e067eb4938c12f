/// Display band of a grade or rollup value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    Fair,
    Weak,
    Failing,
    Empty,
}

/// Which thresholds classify a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeScale {
    /// One assignment score out of 100.
    Assignment,
    TeamSprint,
    MemberSprint,
    TeamOverall,
    StudentOverall,
}

impl GradeScale {
    /// Lower bounds for Excellent, Good, Fair and Weak.
    fn thresholds(self) -> [u32; 4] {
        match self {
            GradeScale::Assignment => [90, 80, 70, 60],
            GradeScale::TeamSprint => [400, 350, 300, 250],
            GradeScale::MemberSprint => [450, 400, 350, 300],
            GradeScale::TeamOverall => [1080, 960, 840, 720],
            GradeScale::StudentOverall => [1350, 1200, 1050, 900],
        }
    }

    pub fn band(self, value: u32) -> Band {
        let [excellent, good, fair, weak] = self.thresholds();
        match value {
            v if v >= excellent => Band::Excellent,
            v if v >= good => Band::Good,
            v if v >= fair => Band::Fair,
            v if v >= weak => Band::Weak,
            v if v > 0 && self == GradeScale::Assignment => Band::Failing,
            _ => Band::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_scale_has_failing_band() {
        assert_eq!(GradeScale::Assignment.band(100), Band::Excellent);
        assert_eq!(GradeScale::Assignment.band(80), Band::Good);
        assert_eq!(GradeScale::Assignment.band(69), Band::Weak);
        assert_eq!(GradeScale::Assignment.band(12), Band::Failing);
        assert_eq!(GradeScale::Assignment.band(0), Band::Empty);
    }

    #[test]
    fn sum_scales_stop_at_weak() {
        assert_eq!(GradeScale::TeamSprint.band(400), Band::Excellent);
        assert_eq!(GradeScale::TeamSprint.band(249), Band::Empty);
        assert_eq!(GradeScale::MemberSprint.band(449), Band::Good);
        assert_eq!(GradeScale::TeamOverall.band(840), Band::Fair);
        assert_eq!(GradeScale::StudentOverall.band(900), Band::Weak);
        assert_eq!(GradeScale::StudentOverall.band(899), Band::Empty);
    }
}
