//! Mailgun HTTP API transport

use async_trait::async_trait;
use std::time::Duration;

use super::{MailTransport, MailgunSettings, OutgoingEmail};
use crate::error::{MailError, MailResult};

/// Posts messages to `{base_url}/v3/{domain}/messages`
pub struct MailgunTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender: String,
}

impl MailgunTransport {
    pub fn new(settings: &MailgunSettings, sender: &str) -> MailResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MailError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v3/{}/messages",
                settings.base_url.trim_end_matches('/'),
                settings.domain
            ),
            api_key: settings.api_key.clone(),
            sender: sender.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailTransport for MailgunTransport {
    fn name(&self) -> &'static str {
        "mailgun"
    }

    async fn send(&self, email: &OutgoingEmail) -> MailResult<()> {
        let form = [
            ("from", self.sender.as_str()),
            ("to", email.to.as_str()),
            ("subject", email.subject.as_str()),
            ("text", email.text_body.as_str()),
            ("html", email.html_body.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Transport(format!(
                "Mailgun responded with {}: {}",
                status,
                body.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn settings(base_url: &str) -> MailgunSettings {
        MailgunSettings {
            api_key: "key-test".to_string(),
            domain: "mg.example.com".to_string(),
            base_url: base_url.to_string(),
        }
    }

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "ada@example.com".to_string(),
            subject: "Follow-up reminder: Acme".to_string(),
            text_body: "plain".to_string(),
            html_body: "<p>html</p>".to_string(),
        }
    }

    /// Accept one request, read it fully, answer with `status_line`
    async fn one_shot_server(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
                if request_complete(&request) {
                    break;
                }
            }
            let reply = format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (base_url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    #[test]
    fn endpoint_is_built_from_domain() {
        let transport =
            MailgunTransport::new(&settings("https://api.mailgun.net/"), "noreply@example.com")
                .unwrap();
        assert_eq!(
            transport.endpoint(),
            "https://api.mailgun.net/v3/mg.example.com/messages"
        );
    }

    #[tokio::test]
    async fn posts_form_with_basic_auth() {
        let (base_url, server) = one_shot_server("HTTP/1.1 200 OK").await;
        let transport = MailgunTransport::new(&settings(&base_url), "noreply@example.com").unwrap();

        transport.send(&email()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v3/mg.example.com/messages"));
        assert!(request.to_ascii_lowercase().contains("authorization: basic"));
        assert!(request.contains("to=ada%40example.com"));
        assert!(request.contains("subject=Follow-up+reminder%3A+Acme"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let (base_url, server) = one_shot_server("HTTP/1.1 401 Unauthorized").await;
        let transport = MailgunTransport::new(&settings(&base_url), "noreply@example.com").unwrap();

        let result = transport.send(&email()).await;
        server.await.unwrap();

        match result {
            Err(MailError::Transport(message)) => assert!(message.contains("401")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
