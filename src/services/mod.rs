pub mod answer_service;
pub mod attempt_service;
pub mod autosave;
pub mod band_score;
pub mod grading_service;
pub mod module_sequencer;
pub mod module_session;
pub mod question_identity;
