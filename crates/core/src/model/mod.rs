mod config;
mod ids;
mod question;
mod result;
mod state;

pub use config::ExamConfig;
pub use ids::SessionId;
pub use question::{Question, QuestionError};
pub use result::{ExamResult, ExamResultError};
pub use state::{QuestionState, QuestionStatus};
