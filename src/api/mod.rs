use serde::Deserialize;
use serde_json::json;

use crate::pipeline::BlogPipeline;

/// Parsed body of a generation request
#[derive(Debug, Deserialize)]
pub struct GenerateBlogRequest {
    pub link: String,
}

/// An HTTP-shaped reply: status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiReply {
    fn ok(content: &str) -> Self {
        Self {
            status: 200,
            body: json!({ "content": content }),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

/// Identity collaborator supplying the authenticated current user.
/// Login, signup, and logout live outside this crate.
#[cfg_attr(test, mockall::automock)]
pub trait Identity: Send + Sync {
    fn current_user(&self) -> Option<String>;
}

/// Fixed identity, used by the CLI where the user is known up front
pub struct StaticIdentity(pub String);

impl Identity for StaticIdentity {
    fn current_user(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Handle one generation request.
///
/// Framework-agnostic: the caller supplies the method and raw body and gets
/// back a status code with a JSON body. Malformed input is rejected before
/// any external call; a stage failure maps to a 500 with a message naming
/// the stage that failed.
pub async fn generate_blog(
    pipeline: &BlogPipeline,
    identity: &dyn Identity,
    method: &str,
    body: &str,
) -> ApiReply {
    if method != "POST" {
        return ApiReply::error(405, "Invalid request method");
    }

    let Some(user) = identity.current_user() else {
        return ApiReply::error(401, "Authentication required");
    };

    let request: GenerateBlogRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(_) => return ApiReply::error(400, "Invalid data sent"),
    };

    match pipeline.run(&request.link, &user).await {
        Ok(record) => ApiReply::ok(&record.content),
        Err(err) => {
            tracing::error!(error = %err, stage = ?err.stage(), "pipeline run failed");
            ApiReply::error(500, err.stage().user_message())
        }
    }
}
