use thiserror::Error;

/// Errors raised when building a question from provider data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question prompt is empty")]
    EmptyPrompt,

    #[error("question has no answer options")]
    NoOptions,

    #[error("correct option {0:?} is not among the listed options")]
    CorrectOptionNotListed(String),
}

/// A single multiple-choice question.
///
/// Immutable for the session's lifetime. `index` is the question's 0-based
/// position in the set and stays stable once the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    index: usize,
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` for a blank prompt,
    /// `QuestionError::NoOptions` for an empty option list, and
    /// `QuestionError::CorrectOptionNotListed` if the answer key entry is
    /// not one of the options.
    pub fn new(
        index: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        let correct_option = correct_option.into();

        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if !options.iter().any(|option| *option == correct_option) {
            return Err(QuestionError::CorrectOptionNotListed(correct_option));
        }

        Ok(Self {
            index,
            prompt,
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// Whether `submitted` matches the answer key.
    ///
    /// Exact string comparison; no case or whitespace normalization.
    #[must_use]
    pub fn is_correct(&self, submitted: &str) -> bool {
        self.correct_option == submitted
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
