//! Authoring form engine for courses and simulations.
//!
//! [`FormState`] holds the draft (ordered sections of lessons, or ordered
//! steps), files picked but not yet uploaded, and a per-field [`ErrorMap`].
//! Every structural edit keeps the error map in step with the new positions.
//! [`FormState::submit`] validates, uploads and saves through a
//! [`FormBackend`]; [`HttpBackend`] is the implementation that talks to the API.

pub mod draft;
pub mod errors;
pub mod http;
pub mod state;
pub mod submit;
pub mod test_editor;
mod validate;

pub use draft::{
    Body, FormContext, ItemId, LessonDraft, LessonUpdate, PendingFile, SectionDraft, StepDraft, StepUpdate,
};
pub use errors::{ErrorKey, ErrorMap};
pub use http::HttpBackend;
pub use state::{AttachError, FormState};
pub use submit::{BackendError, EntityKind, FormBackend, SubmitError};
pub use test_editor::{OptionUpdate, QuestionUpdate, TestEditor, TestErrorKey};
