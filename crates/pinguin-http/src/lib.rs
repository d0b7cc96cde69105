pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use extractors::AdminSession;
pub use routes::build_router;
pub use session::{SessionPrincipal, SessionValidator, StubSessionValidator};
pub use state::AppState;
