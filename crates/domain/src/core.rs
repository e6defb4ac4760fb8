//! Always-on routes for the Supabase core (auth, REST/GraphQL, realtime,
//! storage, meta and the studio dashboard). No SOURCE setting affects them.

use crate::{
    document::{BasicAuthCredential, Consumer, Protocol},
    route::{RouteBehavior, RouteDefinition, RouteError, RouteMatch},
};

pub const DASHBOARD_CONSUMER: &str = "dashboard_user";

/// Consumers section. Credentials stay as placeholders for the gateway
/// entrypoint to substitute, so secrets never land in the generated file.
pub fn consumers() -> Vec<Consumer> {
    vec![Consumer {
        username: DASHBOARD_CONSUMER.to_string(),
        basicauth_credentials: vec![BasicAuthCredential {
            username: "${DASHBOARD_USERNAME}".to_string(),
            password: "${DASHBOARD_PASSWORD}".to_string(),
        }],
    }]
}

/// Core routes in their fixed emission order.
pub fn core_routes() -> Result<Vec<RouteDefinition>, RouteError> {
    Ok(vec![
        // Auth
        RouteDefinition::new(
            "auth-v1-open",
            "http://supabase-auth:9999/verify",
            RouteMatch::path("/auth/v1/verify"),
        )?
        .named("auth-v1-open"),
        RouteDefinition::new(
            "auth-v1-open-callback",
            "http://supabase-auth:9999/callback",
            RouteMatch::path("/auth/v1/callback"),
        )?
        .named("auth-v1-open-callback"),
        RouteDefinition::new(
            "auth-v1-open-authorize",
            "http://supabase-auth:9999/authorize",
            RouteMatch::path("/auth/v1/authorize"),
        )?
        .named("auth-v1-open-authorize"),
        RouteDefinition::new(
            "auth-v1",
            "http://supabase-auth:9999/",
            RouteMatch::path("/auth/v1/"),
        )?
        .with_behavior(RouteBehavior::ApiKeyPassThrough),
        // Database API
        RouteDefinition::new(
            "rest-v1",
            "http://supabase-api:3000/",
            RouteMatch::path("/rest/v1/"),
        )?
        .with_behavior(RouteBehavior::ApiKeyPassThrough),
        RouteDefinition::new(
            "graphql-v1",
            "http://supabase-api:3000/rpc/graphql",
            RouteMatch::path("/graphql/v1/"),
        )?
        .with_behavior(RouteBehavior::ApiKeyPassThrough),
        // Realtime: websocket and REST halves of the same backend
        RouteDefinition::new(
            "realtime-v1-ws",
            "http://supabase-realtime:4000/socket",
            RouteMatch::path("/realtime/v1/"),
        )?
        .named("realtime-v1-ws")
        .with_protocol(Protocol::Ws),
        RouteDefinition::new(
            "realtime-v1-rest",
            "http://supabase-realtime:4000/api",
            RouteMatch::path("/realtime/v1/api/"),
        )?
        .named("realtime-v1-rest")
        .with_protocol(Protocol::Http)
        .with_behavior(RouteBehavior::ApiKeyPassThrough),
        // Storage
        RouteDefinition::new(
            "storage-v1",
            "http://supabase-storage:5000/",
            RouteMatch::path("/storage/v1/"),
        )?
        .with_behavior(RouteBehavior::ApiKeyPassThrough),
        // Postgres meta, dashboard users only
        RouteDefinition::new("meta", "http://supabase-meta:8080/", RouteMatch::path("/pg/"))?
            .with_behavior(RouteBehavior::DashboardOnly),
        // Studio is the catch-all
        RouteDefinition::new(
            "dashboard",
            "http://supabase-studio:3000/",
            RouteMatch::path("/").strip_path(false),
        )?,
    ])
}
