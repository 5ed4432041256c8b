use sigv2_core::{Context, OsEnv};
use sigv2_http_send_reqwest::ReqwestHttpSend;

/// Create a context that sends requests with reqwest and reads the OS
/// environment.
///
/// ```no_run
/// let ctx = sigv2::default_context();
/// assert!(ctx.env_var("HOME").is_some());
/// ```
pub fn default_context() -> Context {
    Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
