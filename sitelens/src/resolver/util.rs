use sitelens_core::{LensError, QueryKind};

/// Collapse the provider errors of an unsuccessful resolution into one error.
///
/// Rules:
/// - If `attempted_any` is false → `Unsupported(kind)`.
/// - If all errors are `ProviderTimeout` → `AllProvidersTimedOut(kind)`.
/// - If the only error is a `RequestTimeout` → that error.
/// - Else → `AllProvidersFailed(errors)`.
#[must_use]
pub fn collapse_errors(kind: QueryKind, attempted_any: bool, errors: Vec<LensError>) -> LensError {
    if !attempted_any {
        return LensError::unsupported(kind.as_str());
    }
    if !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, LensError::ProviderTimeout { .. }))
    {
        return LensError::AllProvidersTimedOut {
            kind: kind.to_string(),
        };
    }
    if matches!(errors.as_slice(), [LensError::RequestTimeout { .. }]) {
        return LensError::request_timeout(kind.as_str());
    }
    LensError::AllProvidersFailed(errors)
}
