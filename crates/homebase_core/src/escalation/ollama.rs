//! Blocking HTTP gateway for an Ollama-compatible `/api/generate` endpoint.

use super::{build_escalation_prompt, EscalationGateway, EscalationRequest, GatewayError};
use crate::config::GatewayConfig;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Escalation gateway over a local language model server.
///
/// Makes exactly one request per question; there are no retries.
#[derive(Debug, Clone)]
pub struct OllamaGateway {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}

impl EscalationGateway for OllamaGateway {
    fn ask(&self, request: &EscalationRequest) -> Result<String, GatewayError> {
        let prompt = build_escalation_prompt(request);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let payload: GenerateResponse = response
            .json()
            .map_err(|err| GatewayError::MalformedResponse(err.to_string()))?;
        let answer = payload
            .response
            .ok_or_else(|| GatewayError::MalformedResponse("missing `response` field".into()))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(GatewayError::EmptyAnswer);
        }
        Ok(answer.to_string())
    }
}
