//! Sessões de usuário: cookie gerenciado pelo tower-sessions e tabela de state/token por sessão
pub mod layer;
pub mod store;

pub use layer::{current_session, ensure_session, rotate_session, session_layer, DEFAULT_COOKIE_NAME};
pub use store::{SessionId, SessionPhase, SessionStore};
