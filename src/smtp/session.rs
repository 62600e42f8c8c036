//! One client connection's SMTP dialog, driven as an explicit state
//! machine over a buffered stream.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::store::{Message, MessageStore, StoreError};

/// Protocol states for one session. Each connection walks this sequence
/// top to bottom exactly once; there is no RSET and no going back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Greeting,
    Helo,
    From,
    Rcpt,
    Data,
    Done,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs the dialog to completion. Returns the stored message's id, or
/// `None` when the client closed the connection before finishing; either
/// way the connection is done when this returns.
///
/// The message is persisted before the final `221` goes out, so once a
/// client has seen its goodbye the record is queryable, and a store
/// failure means the client never gets that last acknowledgment.
pub async fn run(
    stream: TcpStream,
    store: Arc<MessageStore>,
) -> Result<Option<String>, SessionError> {
    let mut stream = BufReader::new(stream);

    let mut state = State::Greeting;
    let mut client_id = String::new();
    let mut from = String::new();
    let mut recipients: Vec<String> = Vec::new();
    let mut body: Vec<String> = Vec::new();

    loop {
        state = match state {
            State::Greeting => {
                send_line(&mut stream, "220 localhost fakesmtpd ready ESMTP").await?;
                State::Helo
            }
            State::Helo => {
                let Some(helo) = read_line(&mut stream).await? else {
                    return Ok(None);
                };
                debug!(line = %helo, "helo");
                if is_ehlo(&helo) {
                    send_line(&mut stream, "250-localhost only has this one extension")
                        .await?;
                    send_line(&mut stream, "250 HELP").await?;
                }
                // The envelope starts here, and so does the message id.
                client_id = Utc::now().format("%Y%m%d%H%M%S%f").to_string();
                State::From
            }
            State::From => {
                let Some(line) = read_line(&mut stream).await? else {
                    return Ok(None);
                };
                debug!(client = %client_id, from = %line);
                from = line;
                send_line(&mut stream, "250 OK").await?;
                State::Rcpt
            }
            State::Rcpt => {
                let Some(line) = read_line(&mut stream).await? else {
                    return Ok(None);
                };
                if is_data(&line) {
                    send_line(&mut stream, "354 Lemme have it").await?;
                    State::Data
                } else {
                    debug!(client = %client_id, to = %line);
                    recipients.push(line);
                    send_line(&mut stream, "250 OK").await?;
                    State::Rcpt
                }
            }
            State::Data => {
                let Some(line) = read_line(&mut stream).await? else {
                    return Ok(None);
                };
                if line == "." {
                    send_line(&mut stream, "250 OK").await?;
                    State::Done
                } else {
                    body.push(line);
                    State::Data
                }
            }
            State::Done => break,
        };
    }

    // Whatever the client sends after the terminator (a bare QUIT, usually)
    // is read and dropped unseen.
    read_line(&mut stream).await?;

    let message = Message {
        message_id: client_id.clone(),
        from,
        recipients,
        body,
    };
    store.put(&message)?;
    send_line(&mut stream, "221 Buhbye").await?;

    Ok(Some(client_id))
}

/// Case-sensitive `EHLO` followed by whitespace, anchored at line start.
/// Asymmetric with [`is_data`] on purpose; consumers rely on the exact
/// matching behavior.
fn is_ehlo(line: &str) -> bool {
    line.strip_prefix("EHLO")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_whitespace())
}

/// Case-insensitive `DATA` prefix anchored at line start.
fn is_data(line: &str) -> bool {
    line.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("DATA"))
}

async fn send_line(
    stream: &mut BufReader<TcpStream>,
    line: &str,
) -> std::io::Result<()> {
    stream.write_all(format!("{line}\r\n").as_bytes()).await
}

/// Reads one line, chomping the trailing newline (CRLF or LF). `None`
/// means the client closed the connection.
async fn read_line(stream: &mut BufReader<TcpStream>) -> std::io::Result<Option<String>> {
    let mut buf = String::new();
    if stream.read_line(&mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with('\n') {
        buf.pop();
        if buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ehlo_wants_the_exact_keyword_plus_an_argument() {
        assert!(is_ehlo("EHLO client.example"));
        assert!(is_ehlo("EHLO  spaced"));
        assert!(!is_ehlo("ehlo client.example"));
        assert!(!is_ehlo("EHLO"));
        assert!(!is_ehlo("HELO client.example"));
        assert!(!is_ehlo("EHLOX nope"));
    }

    #[test]
    fn data_matches_any_case_and_any_suffix() {
        assert!(is_data("DATA"));
        assert!(is_data("data"));
        assert!(is_data("DaTa please"));
        assert!(is_data("DATAnow"));
        assert!(!is_data("DAT"));
        assert!(!is_data("SDATA"));
    }
}
