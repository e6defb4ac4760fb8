// Domain Layer - Gateway Document Model
//
// This crate describes what the gateway should serve, organized into:
// - document: Kong declarative document types and structural validation
// - route: RouteDefinition, the intermediate form every route is built as
// - core: Always-on Supabase routes and the dashboard consumer
// - builders: Per-service route builders keyed by ServiceId
//
// The domain layer performs no I/O; probing and writing live in the services crate.

pub mod builders;
pub mod core;
pub mod document;
pub mod route;

// Re-export all public types for convenience
pub use builders::{build_routes, builder_for, RouteBuilder, ROUTE_BUILDERS};
pub use core::{consumers, core_routes, DASHBOARD_CONSUMER};
pub use document::{
    BasicAuthCredential, Consumer, KongDocument, KongRoute, KongService, Plugin, PluginConfig,
    Protocol, RequestTransformerAdd, FORMAT_VERSION, GENERATED_HEADER,
};
pub use route::{RateLimit, RouteBehavior, RouteDefinition, RouteError, RouteMatch, UpstreamTimeouts};
