use std::{future::Future, time::Duration};

use crate::error::Error;

/// Runs one external call under `limit`. Expiry becomes `Error::Timeout`; the
/// call's own result is returned untouched so each caller maps it to its stage.
pub(crate) async fn bounded<F, T, E>(
    limit: Duration,
    stage: &'static str,
    call: F,
) -> Result<Result<T, E>, Error>
where
    F: Future<Output = Result<T, E>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| Error::Timeout { stage, limit })
}
