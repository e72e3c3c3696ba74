use crate::model::{Question, SessionId};

/// Everything the question-set provider supplies before a session starts.
///
/// The engine consumes `questions` and the time limit; the descriptive
/// fields ride along so the result consumer can label the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamConfig {
    pub session_id: SessionId,
    pub subject: String,
    pub module: String,
    pub exam_format: String,
    pub difficulty: String,
    pub time_limit_minutes: u32,
    pub questions: Vec<Question>,
}

impl ExamConfig {
    /// The countdown length in seconds.
    #[must_use]
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit_minutes.saturating_mul(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_limit_converts_to_seconds() {
        let config = ExamConfig {
            session_id: SessionId::new("s1"),
            subject: "Physics".to_owned(),
            module: "Optics".to_owned(),
            exam_format: "MCQ".to_owned(),
            difficulty: "medium".to_owned(),
            time_limit_minutes: 10,
            questions: Vec::new(),
        };
        assert_eq!(config.time_limit_seconds(), 600);
    }
}
