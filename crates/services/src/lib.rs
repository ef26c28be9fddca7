#![forbid(unsafe_code)]

pub mod error;
pub mod grading;
pub mod navigation;
pub mod note_service;
pub mod playback_tracker;
pub mod ports;
pub mod quiz_service;
pub mod session_services;

pub use lesson_core::Clock;

pub use error::{
    GradingError, NoteServiceError, QuizLoopError, SessionServicesError, TrackerError,
};
pub use grading::{GraderConfig, GradingClient};
pub use navigation::{ActiveUnit, NavigationController};
pub use note_service::NoteService;
pub use playback_tracker::PlaybackTracker;
pub use ports::{GradingService, PlayerState, VideoWidget};
pub use quiz_service::{QuizLoopService, QuizOutcome};
pub use session_services::SessionServices;
