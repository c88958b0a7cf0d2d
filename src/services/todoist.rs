//! Todoist Sync API
//!
//! Leituras e escritas passam pelo endpoint único de sync, sempre como
//! formulário; o token também vai no campo `token` (ver `ProviderProfile`).

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::OAuthFlow;
use crate::client::ProtectedRequest;
use crate::error::{AuthError, AuthResult};
use crate::session::SessionId;
use crate::utils::logging::*;

pub const SYNC_PATH: &str = "sync/v8/sync";

/// Comando de escrita da Sync API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncCommand {
    #[serde(rename = "type")]
    pub command_type: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    pub args: Value,
}

impl SyncCommand {
    fn new(command_type: &str, args: Value) -> Self {
        Self {
            command_type: command_type.to_string(),
            uuid: Uuid::new_v4().to_string(),
            temp_id: None,
            args,
        }
    }

    pub fn project_add(name: &str) -> Self {
        let mut command = Self::new("project_add", json!({ "name": name }));
        command.temp_id = Some(Uuid::new_v4().to_string());
        command
    }

    pub fn project_update(id: &str, name: &str) -> Self {
        Self::new("project_update", json!({ "id": id, "name": name }))
    }

    pub fn project_delete(id: &str) -> Self {
        Self::new("project_delete", json!({ "id": id }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    /// Sync completo (`sync_token = "*"`) dos tipos pedidos
    Read { resource_types: Vec<String> },
    Write { commands: Vec<SyncCommand> },
}

impl SyncRequest {
    pub fn read<I, S>(resource_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resource_types: Vec<String> = resource_types.into_iter().map(Into::into).collect();
        if resource_types.is_empty() {
            resource_types.push("all".to_string());
        }
        SyncRequest::Read { resource_types }
    }

    pub fn write(commands: Vec<SyncCommand>) -> Self {
        SyncRequest::Write { commands }
    }

    /// Campos do formulário; listas vão serializadas como JSON
    pub fn form_fields(&self) -> Vec<(String, String)> {
        match self {
            SyncRequest::Read { resource_types } => vec![
                ("sync_token".to_string(), "*".to_string()),
                ("resource_types".to_string(), json!(resource_types).to_string()),
            ],
            SyncRequest::Write { commands } => {
                vec![("commands".to_string(), json!(commands).to_string())]
            }
        }
    }

    pub fn into_protected_request(self) -> ProtectedRequest {
        ProtectedRequest::post_form(SYNC_PATH, self.form_fields())
    }
}

#[derive(Debug, Clone)]
pub struct TodoistService {
    flow: Arc<OAuthFlow>,
}

impl TodoistService {
    pub fn new(flow: Arc<OAuthFlow>) -> Self {
        Self { flow }
    }

    pub async fn sync(&self, session: SessionId, request: SyncRequest) -> AuthResult<Value> {
        self.flow.call(session, request.into_protected_request()).await
    }

    /// Recursos do usuário; lista vazia equivale a `["all"]`
    pub async fn resources(&self, session: SessionId, resource_types: &[String]) -> AuthResult<Value> {
        log_info(&format!("📋 [Todoist] Sync de recursos: {:?}", resource_types));
        self.sync(session, SyncRequest::read(resource_types.iter().cloned()))
            .await
    }

    pub async fn projects(&self, session: SessionId) -> AuthResult<Value> {
        let resources = self.resources(session, &["projects".to_string()]).await?;
        Ok(resources.get("projects").cloned().unwrap_or(Value::Array(vec![])))
    }

    pub async fn add_project(&self, session: SessionId, name: &str) -> AuthResult<Value> {
        let name = require_non_empty("name", name)?;
        log_info(&format!("➕ [Todoist] Criando projeto '{}'", name));
        self.sync(session, SyncRequest::write(vec![SyncCommand::project_add(name)]))
            .await
    }

    pub async fn update_project(&self, session: SessionId, id: &str, name: &str) -> AuthResult<Value> {
        let id = require_non_empty("id", id)?;
        let name = require_non_empty("name", name)?;
        log_info(&format!("✏️  [Todoist] Renomeando projeto {} → '{}'", id, name));
        self.sync(session, SyncRequest::write(vec![SyncCommand::project_update(id, name)]))
            .await
    }

    pub async fn delete_project(&self, session: SessionId, id: &str) -> AuthResult<Value> {
        let id = require_non_empty("id", id)?;
        log_info(&format!("🗑️  [Todoist] Removendo projeto {}", id));
        self.sync(session, SyncRequest::write(vec![SyncCommand::project_delete(id)]))
            .await
    }
}

fn require_non_empty<'a>(field: &str, value: &'a str) -> AuthResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::invalid_request(format!("campo '{}' vazio", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, ProviderConfig, ProviderKind};
    use crate::client::build_http_client;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Devolve o formulário recebido como JSON
    struct EchoForm;

    impl Respond for EchoForm {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let fields: serde_json::Map<String, Value> = url::form_urlencoded::parse(&request.body)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            ResponseTemplate::new(200).set_body_json(Value::Object(fields))
        }
    }

    async fn service_against(server: &MockServer) -> (TodoistService, SessionId) {
        let config = ProviderConfig::new(
            ProviderKind::Todoist,
            "td-id",
            "td-secret",
            "http://localhost:5000/auth/todoist/callback",
        )
        .unwrap()
        .with_api_base_url(&server.uri())
        .unwrap();

        let flow = Arc::new(OAuthFlow::new(
            config,
            build_http_client(Duration::from_secs(5)).unwrap(),
        ));
        let session = SessionId::new();
        flow.store()
            .put_token(session, AccessToken::new("todo-token", "Bearer"))
            .await;

        (TodoistService::new(flow), session)
    }

    fn is_v4(value: &Value) -> bool {
        value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|u| u.get_version_num() == 4)
            .unwrap_or(false)
    }

    #[test]
    fn test_read_request_fields() {
        let fields = SyncRequest::read(["projects"]).form_fields();
        assert_eq!(
            fields,
            vec![
                ("sync_token".to_string(), "*".to_string()),
                ("resource_types".to_string(), r#"["projects"]"#.to_string()),
            ]
        );
        assert_eq!(
            SyncRequest::read(Vec::<String>::new()),
            SyncRequest::Read { resource_types: vec!["all".to_string()] }
        );
    }

    #[test]
    fn test_update_and_delete_commands() {
        let update = SyncCommand::project_update("123", "Renamed");
        assert_eq!(update.command_type, "project_update");
        assert_eq!(update.args, json!({ "id": "123", "name": "Renamed" }));
        assert_eq!(update.temp_id, None);

        let delete = serde_json::to_value(SyncCommand::project_delete("123")).unwrap();
        assert_eq!(delete["type"], "project_delete");
        assert!(delete.get("temp_id").is_none());
        assert!(is_v4(&delete["uuid"]));
    }

    #[tokio::test]
    async fn test_add_project_sends_commands() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sync/v8/sync"))
            .respond_with(EchoForm)
            .expect(1)
            .mount(&server)
            .await;

        let (service, session) = service_against(&server).await;
        let echoed = service.add_project(session, "Groceries").await.unwrap();

        assert_eq!(echoed["token"], "todo-token");

        let commands: Value = serde_json::from_str(echoed["commands"].as_str().unwrap()).unwrap();
        let command = &commands[0];
        assert_eq!(command["type"], "project_add");
        assert_eq!(command["args"]["name"], "Groceries");
        assert!(is_v4(&command["uuid"]));
        assert!(is_v4(&command["temp_id"]));
    }

    #[tokio::test]
    async fn test_projects_extracts_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sync/v8/sync"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sync_token": "abc",
                "projects": [{ "id": "1", "name": "Inbox" }]
            })))
            .mount(&server)
            .await;

        let (service, session) = service_against(&server).await;
        let projects = service.projects(session).await.unwrap();

        assert_eq!(projects, json!([{ "id": "1", "name": "Inbox" }]));
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_request() {
        let server = MockServer::start().await;
        let (service, session) = service_against(&server).await;

        let err = service.add_project(session, "   ").await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidRequest(_)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
