//! Client side of patient intake: HTTP access to the backend, the form
//! controller that submits a new patient, and the poller that follows
//! document indexing afterwards.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod poller;
pub mod session;

pub use api::{PatientApi, StatusSource, Submission};
pub use config::ClientConfig;
pub use error::{ClientError, IndexingError, SubmitError};
pub use form::{FormPhase, IntakeForm, Navigation, ProgressView, SubmitOutcome};
pub use http::{ApiClient, PatientQuery};
pub use poller::{Completion, PollEvent, RetryBatch, StatusPoller};
pub use session::run_indexing;
