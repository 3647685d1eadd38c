pub mod cards;
pub mod conflicts;
pub mod error;
pub mod expansion;
pub mod normalize;
pub mod pacing;
pub mod ports;
pub mod provider;
mod retry;
pub mod scroll;
pub mod session;
pub mod static_page;
pub mod store;

#[cfg(test)]
mod testing;

pub use cards::{CardDecoder, RawCard};
pub use conflicts::{load_and_resolve, resolve, write_report, ConflictReport};
pub use error::{
    ExtractionError, HarvestError, PortError, ProviderError, ResolveError, StoreError,
};
pub use expansion::{
    ExpansionConfig, ExpansionEnd, ExpansionMachine, ExpansionOutcome, ExpansionState,
};
pub use normalize::{extract_items, normalize_card, ExtractionBatch};
pub use pacing::{Pacer, PacingConfig, Span};
pub use ports::{
    CredentialStore, DiagnosticsSink, FileCredentialStore, FileDiagnosticsSink, NoopDiagnostics,
};
pub use provider::{ControlHandle, PageProvider, PageSnapshot};
pub use session::{
    CycleReport, SessionConfig, SessionOrchestrator, SessionReport, SessionStatus,
    DEFAULT_MAX_CYCLES,
};
pub use static_page::StaticPageProvider;
pub use store::{JsonStore, LoadedStore, MergeOutcome};
