#![forbid(unsafe_code)]

pub mod app_services;
pub mod authoring_service;
pub mod error;
pub mod quiz_service;

pub use app_services::AppServices;
pub use authoring_service::{AuthoringService, QuizListItem};
pub use error::{AppServicesError, AuthoringError, QuizServiceError};
pub use quiz_service::{QuizRun, QuizService};
