// Serviços por provedor sobre o fluxo OAuth2 autenticado
pub mod github;
pub mod todoist;

pub use github::GitHubService;
pub use todoist::{SyncCommand, SyncRequest, TodoistService};
