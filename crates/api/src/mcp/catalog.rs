//! Catalog of operations exposed as tools

use schemars::JsonSchema;
use serde_json::{json, Value};
use toolgate_shared::{ProfileUpdate, UserView};

use super::types::{HttpBinding, Tool};
use crate::routes::{
    auth::{LoginRequest, RegisterRequest, TokenResponse},
    query::{QueryRequest, QueryResponse},
    users::UserListResponse,
};

fn schema_of<T: JsonSchema>() -> Value {
    schemars::schema_for!(T).to_value()
}

fn empty_object() -> Value {
    json!({ "type": "object", "properties": {} })
}

fn tool(
    name: &str,
    description: &str,
    method: &str,
    path: &str,
    requires_auth: bool,
    input_schema: Value,
    output_schema: Option<Value>,
) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        output_schema,
        http: HttpBinding {
            method: method.to_string(),
            path: path.to_string(),
        },
        requires_auth,
    }
}

/// Every operation the tool-exposure adapter may republish
pub fn operation_catalog() -> Vec<Tool> {
    vec![
        tool(
            "register",
            "Create a new account and return its public profile.",
            "POST",
            "/register",
            false,
            schema_of::<RegisterRequest>(),
            Some(schema_of::<UserView>()),
        ),
        tool(
            "login",
            "Exchange a username and password for a bearer access token.",
            "POST",
            "/login",
            false,
            schema_of::<LoginRequest>(),
            Some(schema_of::<TokenResponse>()),
        ),
        tool(
            "read_users_me",
            "Return the profile of the authenticated caller.",
            "GET",
            "/users/me",
            true,
            empty_object(),
            Some(schema_of::<UserView>()),
        ),
        tool(
            "update_user_me",
            "Update the authenticated caller's email, display name or password. Omitted fields are left unchanged.",
            "PATCH",
            "/users/me",
            true,
            schema_of::<ProfileUpdate>(),
            Some(schema_of::<UserView>()),
        ),
        tool(
            "delete_user_me",
            "Permanently delete the authenticated caller's account.",
            "DELETE",
            "/users/me",
            true,
            empty_object(),
            None,
        ),
        tool(
            "read_users",
            "List all registered accounts.",
            "GET",
            "/users",
            true,
            empty_object(),
            Some(schema_of::<UserListResponse>()),
        ),
        tool(
            "query",
            "Submit a free-form query, optionally searching Google Drive.",
            "POST",
            "/query",
            true,
            schema_of::<QueryRequest>(),
            Some(schema_of::<QueryResponse>()),
        ),
    ]
}
