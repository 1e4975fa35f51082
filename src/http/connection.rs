use bytes::BytesMut;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::timeout;

use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::routes::router::{HandlerError, Router};

/// Drives one client connection: read one request, dispatch it, write
/// the response, close. The stream is generic so tests can substitute an
/// in-memory duplex pipe for a TcpStream.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    router: Arc<Router>,
    read_timeout: Duration,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

/// Result of trying to read one complete request from the stream.
enum ReadOutcome {
    Request(Request),
    Eof,
    Malformed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, read_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            router,
            read_timeout,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match timeout(self.read_timeout, self.read_request()).await {
                        Ok(outcome) => match outcome? {
                            ReadOutcome::Request(req) => {
                                self.state = ConnectionState::Processing(req);
                            }
                            ReadOutcome::Eof => {
                                self.state = ConnectionState::Closed;
                            }
                            ReadOutcome::Malformed => {
                                // Best-effort 400 before closing
                                let writer = ResponseWriter::new(&Response::bad_request());
                                self.state = ConnectionState::Writing(writer);
                            }
                        },
                        Err(_) => {
                            // Deadline expired before a complete request
                            // arrived; abandon the connection silently.
                            tracing::warn!("request read timed out");
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    tracing::debug!(method = ?req.method, path = %req.path, "Dispatching request");

                    let response = match self.router.dispatch(req).await {
                        Ok(response) => response,
                        Err(HandlerError::NotFound) => Response::not_found(),
                        Err(HandlerError::UnsupportedMediaType) => {
                            Response::unsupported_media_type()
                        }
                    };

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    // One request per connection
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    // Remove consumed bytes
                    let _ = self.buffer.split_to(consumed);
                    return Ok(ReadOutcome::Request(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => {
                    tracing::warn!(error = ?e, "Malformed request");
                    return Ok(ReadOutcome::Malformed);
                }
            }

            // Read more data
            let mut temp = [0u8; 1024];
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                // Client closed connection
                return Ok(ReadOutcome::Eof);
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}
