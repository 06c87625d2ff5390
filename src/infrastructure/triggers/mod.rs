pub mod quiz_result_listener;

pub use quiz_result_listener::{dispatch_notification, QuizResultListener, QUIZ_RESULTS_CHANNEL};
