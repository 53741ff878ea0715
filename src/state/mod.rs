// Persisted transition state, one record per administered root

pub mod record;
pub mod store;

pub use record::{RecordError, StateRecord, TransitionStatus, STATE_SCHEMA_VERSION};
pub use store::{state_file_path, JsonStateStore, StateStore, StateStoreError, STATE_FILE_NAME};

#[cfg(any(test, feature = "testing"))]
pub use store::MockStateStore;
