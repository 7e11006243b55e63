use anyhow::Result;
use ghsearch_api::response::ErrorBody;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::proto::http_like::read_request;
use crate::router::{self, util::error_response};
use crate::services::Services;

/// Serve exactly one request on `stream`, then shut it down.
pub async fn serve_connection<S>(stream: &mut S, services: &Services) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match read_request(stream).await {
        Ok(req) => {
            debug!(method = %req.method, route = req.route(), "request");
            router::handle(req, services).await?
        }
        Err(code) => error_response(code, &ErrorBody::new(code.reason())),
    };
    stream.write_all(&response.into_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
