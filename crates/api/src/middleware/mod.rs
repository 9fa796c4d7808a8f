//! HTTP middleware components.

pub mod employee_auth;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod rbac;
pub mod security_headers;
pub mod trace_id;

pub use employee_auth::require_session;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rate_limit::{link_rate_limit, RateLimiterState};
pub use rbac::require_reviewer;
pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
