//! Authenticated sample resource

use super::middleware::RequireUser;
use super::types::{Json, ResourcesResponse};

pub async fn list_resources(RequireUser(user): RequireUser) -> Json<ResourcesResponse> {
    Json(ResourcesResponse {
        message: "Here are your resources".to_string(),
        user_email: user.email().map(str::to_string),
    })
}
