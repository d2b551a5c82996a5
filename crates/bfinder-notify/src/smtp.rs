//! SMTP email delivery over TLS.
//!
//! The transport speaks raw SMTP on port 465 (implicit TLS): EHLO, AUTH
//! LOGIN, MAIL FROM, RCPT TO, DATA, QUIT.  Command construction lives in
//! pure functions so the wire format is testable without a server.
//!
//! [`Mailer::send`] returns a plain `bool`: delivery failures are logged and
//! must never propagate into the job loop, so one bad recipient cannot stop
//! the rest of the run.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rustls::ClientConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, info, warn};

use crate::error::{NotifyError, Result};

/// Default SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP implicit-TLS port.
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Connection and response timeout in seconds.
const TIMEOUT_SECS: u64 = 30;

/// Domain announced in EHLO.
const EHLO_DOMAIN: &str = "birthday-finder.local";

type TlsStream = tokio_rustls::client::TlsStream<TcpStream>;

// ---------------------------------------------------------------------------
// Command builders (pure functions, testable)
// ---------------------------------------------------------------------------

/// Build an SMTP EHLO command.
pub fn ehlo_command(domain: &str) -> String {
    format!("EHLO {domain}\r\n")
}

/// Build an SMTP AUTH LOGIN command.
pub fn auth_login_command() -> String {
    "AUTH LOGIN\r\n".to_string()
}

/// Encode a credential line for AUTH LOGIN.
pub fn auth_credential_line(value: &str) -> String {
    format!("{}\r\n", BASE64.encode(value))
}

/// Build an SMTP MAIL FROM command.
pub fn mail_from_command(from: &str) -> String {
    format!("MAIL FROM:<{from}>\r\n")
}

/// Build an SMTP RCPT TO command.
pub fn rcpt_to_command(to: &str) -> String {
    format!("RCPT TO:<{to}>\r\n")
}

/// Build an SMTP DATA command.
pub fn data_command() -> String {
    "DATA\r\n".to_string()
}

/// Build the full HTML message for SMTP DATA, terminated by the dot line.
pub fn message_body(from: &str, to: &str, subject: &str, html: &str) -> String {
    format!(
        "From: {from}\r\n\
         To: {to}\r\n\
         Subject: {subject}\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: text/html; charset=UTF-8\r\n\
         \r\n\
         {html}\r\n\
         .\r\n"
    )
}

/// Build an SMTP QUIT command.
pub fn quit_command() -> String {
    "QUIT\r\n".to_string()
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// SMTP credentials and endpoint.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub host: String,
    /// Implicit-TLS port.
    pub port: u16,
    /// Sender address, also the AUTH LOGIN username.
    pub sender_email: String,
    /// AUTH LOGIN password (an app password for Gmail).
    pub password: String,
}

impl SmtpConfig {
    /// Read SMTP settings from the environment: `SENDER_EMAIL`,
    /// `EMAIL_PASSWORD`, and optional `SMTP_HOST` / `SMTP_PORT` overrides.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Config`] on missing credentials or an
    /// unparseable port.
    pub fn from_env() -> Result<Self> {
        let sender_email = std::env::var("SENDER_EMAIL").map_err(|_| NotifyError::Config {
            reason: "SENDER_EMAIL is not set".into(),
        })?;
        let password = std::env::var("EMAIL_PASSWORD").map_err(|_| NotifyError::Config {
            reason: "EMAIL_PASSWORD is not set".into(),
        })?;
        let host =
            std::env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
        let port = match std::env::var("SMTP_PORT") {
            Ok(value) => value.parse().map_err(|_| NotifyError::Config {
                reason: format!("SMTP_PORT `{value}` is not a port number"),
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            host,
            port,
            sender_email,
            password,
        })
    }
}

// ---------------------------------------------------------------------------
// Sender interface
// ---------------------------------------------------------------------------

/// Something that can deliver one rendered email.
///
/// Implementations return `true` on success and `false` on any failure;
/// they log the failure themselves and never panic or propagate errors.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `html` to `recipient` with the given subject.
    async fn send(&self, recipient: &str, subject: &str, html: &str) -> bool;
}

/// SMTP-over-TLS implementation of [`EmailSender`].
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    /// Create a mailer from SMTP configuration.
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    async fn send_inner(&self, recipient: &str, subject: &str, html: &str) -> Result<()> {
        info!(
            host = %self.config.host,
            to = recipient,
            subject,
            "sending email"
        );

        let stream = connect_tls(&self.config.host, self.config.port).await?;
        let (read_half, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(read_half);

        // Server greeting.
        let (greeting, lines) = read_response(&mut reader).await?;
        if greeting / 100 != 2 {
            return Err(NotifyError::Smtp {
                reason: format!("server rejected connection: {}", lines.join("; ")),
            });
        }

        send_command(&mut writer, &mut reader, &ehlo_command(EHLO_DOMAIN), 2).await?;

        send_command(&mut writer, &mut reader, &auth_login_command(), 3).await?;
        send_command(
            &mut writer,
            &mut reader,
            &auth_credential_line(&self.config.sender_email),
            3,
        )
        .await?;
        send_command(
            &mut writer,
            &mut reader,
            &auth_credential_line(&self.config.password),
            2,
        )
        .await?;

        send_command(
            &mut writer,
            &mut reader,
            &mail_from_command(&self.config.sender_email),
            2,
        )
        .await?;
        send_command(&mut writer, &mut reader, &rcpt_to_command(recipient), 2).await?;
        send_command(&mut writer, &mut reader, &data_command(), 3).await?;

        let message = message_body(&self.config.sender_email, recipient, subject, html);
        send_command(&mut writer, &mut reader, &message, 2).await?;

        // Best-effort goodbye.
        let _ = writer.write_all(quit_command().as_bytes()).await;

        Ok(())
    }
}

#[async_trait]
impl EmailSender for Mailer {
    async fn send(&self, recipient: &str, subject: &str, html: &str) -> bool {
        match self.send_inner(recipient, subject, html).await {
            Ok(()) => true,
            Err(e) => {
                warn!(to = recipient, error = %e, "email delivery failed");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TLS plumbing
// ---------------------------------------------------------------------------

/// Build a rustls `ClientConfig` using Mozilla's bundled root certificates.
fn tls_client_config() -> Arc<ClientConfig> {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    Arc::new(config)
}

/// Establish a TLS connection to the given host and port.
async fn connect_tls(host: &str, port: u16) -> Result<TlsStream> {
    let connector = TlsConnector::from(tls_client_config());
    let server_name = rustls::pki_types::ServerName::try_from(host.to_owned()).map_err(|e| {
        NotifyError::Smtp {
            reason: format!("invalid server name `{host}`: {e}"),
        }
    })?;

    let addr = format!("{host}:{port}");
    let tcp_stream = tokio::time::timeout(
        Duration::from_secs(TIMEOUT_SECS),
        TcpStream::connect(&addr),
    )
    .await
    .map_err(|_| NotifyError::Timeout {
        seconds: TIMEOUT_SECS,
        reason: format!("TCP connection to {addr} timed out"),
    })??;

    let tls_stream = tokio::time::timeout(
        Duration::from_secs(TIMEOUT_SECS),
        connector.connect(server_name, tcp_stream),
    )
    .await
    .map_err(|_| NotifyError::Timeout {
        seconds: TIMEOUT_SECS,
        reason: format!("TLS handshake with {host} timed out"),
    })??;

    Ok(tls_stream)
}

/// Read an SMTP response (one or more lines) until the final status line.
///
/// SMTP continuation lines are `NNN-text`; the final line is `NNN text`.
async fn read_response(reader: &mut BufReader<ReadHalf<TlsStream>>) -> Result<(u16, Vec<String>)> {
    let mut lines = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(TIMEOUT_SECS);

    loop {
        let mut line = String::new();
        let read_result = tokio::time::timeout_at(deadline, reader.read_line(&mut line)).await;

        match read_result {
            Ok(Ok(0)) => break,
            Ok(Ok(_)) => {
                let trimmed = line.trim().to_string();
                debug!(smtp_line = %trimmed, "SMTP response line");
                lines.push(trimmed.clone());

                if trimmed.len() >= 4 {
                    let fourth_char = trimmed.as_bytes().get(3).copied();
                    if fourth_char == Some(b' ') || fourth_char.is_none() {
                        break;
                    }
                } else {
                    break;
                }
            }
            Ok(Err(e)) => {
                return Err(NotifyError::Smtp {
                    reason: format!("read error: {e}"),
                });
            }
            Err(_) => {
                return Err(NotifyError::Timeout {
                    seconds: TIMEOUT_SECS,
                    reason: "SMTP response timed out".into(),
                });
            }
        }
    }

    let status = lines
        .first()
        .and_then(|l| l.get(..3))
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(0);

    Ok((status, lines))
}

/// Send one command and require a status in the expected class (2xx, 3xx).
async fn send_command(
    writer: &mut WriteHalf<TlsStream>,
    reader: &mut BufReader<ReadHalf<TlsStream>>,
    command: &str,
    expected_class: u16,
) -> Result<(u16, Vec<String>)> {
    writer
        .write_all(command.as_bytes())
        .await
        .map_err(|e| NotifyError::Smtp {
            reason: format!("write error: {e}"),
        })?;

    let (status, lines) = read_response(reader).await?;
    if status / 100 != expected_class {
        return Err(NotifyError::Smtp {
            reason: format!(
                "expected {expected_class}xx, got {status}: {}",
                lines.join("; ")
            ),
        });
    }
    Ok((status, lines))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ehlo_format() {
        assert_eq!(ehlo_command("birthday-finder.local"), "EHLO birthday-finder.local\r\n");
    }

    #[test]
    fn mail_from_and_rcpt_to_use_angle_brackets() {
        assert_eq!(mail_from_command("a@example.com"), "MAIL FROM:<a@example.com>\r\n");
        assert_eq!(rcpt_to_command("b@example.com"), "RCPT TO:<b@example.com>\r\n");
    }

    #[test]
    fn auth_credentials_are_base64() {
        assert_eq!(auth_credential_line("user"), "dXNlcg==\r\n");
    }

    #[test]
    fn message_body_declares_html_and_terminates() {
        let body = message_body("a@example.com", "b@example.com", "Hello", "<p>hi</p>");
        assert!(body.starts_with("From: a@example.com\r\n"));
        assert!(body.contains("Content-Type: text/html; charset=UTF-8\r\n"));
        assert!(body.contains("Subject: Hello\r\n"));
        assert!(body.ends_with("\r\n.\r\n"));
    }

    #[test]
    fn smtp_port_env_must_be_numeric() {
        // Direct parse path, no env mutation: mirrors from_env validation.
        assert!("not-a-port".parse::<u16>().is_err());
        assert_eq!("465".parse::<u16>().unwrap(), DEFAULT_SMTP_PORT);
    }
}
