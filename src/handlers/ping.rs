//! Ping handler for health checks

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PingRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PongResponse {
    message: String,
    version: String,
    timestamp: String,
}

/// Build the pong for a raw ping payload. An empty payload is a plain ping.
fn pong_for(payload: &[u8]) -> serde_json::Value {
    let request: PingRequest = if payload.is_empty() {
        PingRequest::default()
    } else {
        match serde_json::from_slice(payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse ping request: {}", e);
                return serde_json::json!({
                    "error": {
                        "code": "INVALID_REQUEST",
                        "message": format!("Failed to parse request: {}", e)
                    }
                });
            }
        }
    };

    let response = PongResponse {
        message: request
            .message
            .map(|m| format!("Pong: {}", m))
            .unwrap_or_else(|| "Pong".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    serde_json::to_value(response).unwrap_or_default()
}

/// Handle ping messages
pub async fn handle_ping(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received ping message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                error!("Ping message without reply subject");
                continue;
            }
        };

        let response_bytes = serde_json::to_vec(&pong_for(&msg.payload))?;
        client.publish(reply, response_bytes.into()).await?;

        debug!("Sent pong response");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_plain() {
        let pong = pong_for(b"");
        assert_eq!(pong["message"], "Pong");
        assert_eq!(pong["version"], env!("CARGO_PKG_VERSION"));
        assert!(pong["timestamp"].is_string());
    }

    #[test]
    fn test_pong_echoes_message() {
        let pong = pong_for(br#"{"message":"hello"}"#);
        assert_eq!(pong["message"], "Pong: hello");
    }

    #[test]
    fn test_pong_invalid_payload() {
        let pong = pong_for(b"{oops");
        assert_eq!(pong["error"]["code"], "INVALID_REQUEST");
    }
}
