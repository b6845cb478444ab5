//! Label and timing engine shared by every host integration.

mod hooks;
mod path;
mod policy;
mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use hooks::{InstrumentationHooks, RequestInstrumentation, RequestState};
pub use path::{normalize_path, PathNormalizer, ID_PLACEHOLDER};
pub use policy::{resolve_status, LabelPolicy, Phase, EXTRACTOR_FAULT_VALUE, UNKNOWN_STATUS};
pub use timer::{ActiveTimer, RequestTimer};
