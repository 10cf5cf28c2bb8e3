// Build phases, run in file order by the orchestrator.

#[path = "01_detect.rs"]
pub mod detect;
#[path = "02_resolve.rs"]
pub mod resolve;
#[path = "03_compose.rs"]
pub mod compose;

pub use compose::ComposePhase;
pub use detect::DetectPhase;
pub use resolve::ResolvePhase;
