//! Natural-language fallback for unresolved structured requests.
//!
//! # Responsibility
//! - Describe the capability the dispatcher calls when structured
//!   resolution fails (`EscalationGateway`).
//! - Recover every gateway failure into the fallback apology.
//!
//! # Invariants
//! - `escalate` never returns an error; gateway failures are logged and
//!   replaced by `ESCALATION_FALLBACK_ANSWER`.
//! - Gateway answers are returned unmodified.

use crate::logging::sanitize_message;
use crate::store::Domain;
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

#[cfg(feature = "ollama")]
mod ollama;
mod prompt;

#[cfg(feature = "ollama")]
pub use ollama::OllamaGateway;
pub use prompt::build_escalation_prompt;

/// Answer returned when the gateway cannot produce one.
pub const ESCALATION_FALLBACK_ANSWER: &str = "I'm not sure how to answer that.";

/// Question plus full collection context.
#[derive(Debug, Clone, PartialEq)]
pub struct EscalationRequest {
    pub domain: Domain,
    pub question: String,
    /// Full snapshot of the domain's collection.
    pub snapshot: Value,
}

impl EscalationRequest {
    pub fn new(domain: Domain, question: impl Into<String>, snapshot: Value) -> Self {
        Self {
            domain,
            question: question.into(),
            snapshot,
        }
    }
}

/// Recoverable escalation failure.
#[derive(Debug)]
pub enum GatewayError {
    Transport(String),
    Status(u16),
    MalformedResponse(String),
    EmptyAnswer,
    Unavailable,
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "gateway transport failed: {message}"),
            Self::Status(code) => write!(f, "gateway answered with HTTP status {code}"),
            Self::MalformedResponse(message) => {
                write!(f, "gateway response is malformed: {message}")
            }
            Self::EmptyAnswer => write!(f, "gateway returned an empty answer"),
            Self::Unavailable => write!(f, "gateway is unavailable"),
        }
    }
}

impl Error for GatewayError {}

impl GatewayError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::EmptyAnswer => "empty_answer",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Answers a natural-language question given full collection context.
pub trait EscalationGateway {
    fn ask(&self, request: &EscalationRequest) -> Result<String, GatewayError>;
}

impl<T: EscalationGateway + ?Sized> EscalationGateway for &T {
    fn ask(&self, request: &EscalationRequest) -> Result<String, GatewayError> {
        (**self).ask(request)
    }
}

impl<T: EscalationGateway + ?Sized> EscalationGateway for Box<T> {
    fn ask(&self, request: &EscalationRequest) -> Result<String, GatewayError> {
        (**self).ask(request)
    }
}

/// Calls `gateway` once, recovering failures into the fallback answer.
///
/// Returns the answer and whether the gateway actually produced it.
pub fn escalate<G>(gateway: &G, request: &EscalationRequest) -> (String, bool)
where
    G: EscalationGateway + ?Sized,
{
    let started_at = Instant::now();
    info!(
        "event=escalation module=escalation status=start domain={} question_chars={}",
        request.domain,
        request.question.chars().count()
    );

    match gateway.ask(request) {
        Ok(answer) => {
            info!(
                "event=escalation module=escalation status=ok domain={} duration_ms={} answer_chars={}",
                request.domain,
                started_at.elapsed().as_millis(),
                answer.chars().count()
            );
            (answer, true)
        }
        Err(err) => {
            warn!(
                "event=escalation module=escalation status=error domain={} duration_ms={} error_code={} error={}",
                request.domain,
                started_at.elapsed().as_millis(),
                err.code(),
                sanitize_message(&err.to_string())
            );
            (ESCALATION_FALLBACK_ANSWER.to_string(), false)
        }
    }
}

/// Gateway that always returns the same answer.
#[derive(Debug, Clone)]
pub struct StaticGateway {
    answer: String,
}

impl StaticGateway {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

impl EscalationGateway for StaticGateway {
    fn ask(&self, _request: &EscalationRequest) -> Result<String, GatewayError> {
        Ok(self.answer.clone())
    }
}

/// Gateway for offline use; every call fails with `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGateway;

impl EscalationGateway for UnavailableGateway {
    fn ask(&self, _request: &EscalationRequest) -> Result<String, GatewayError> {
        Err(GatewayError::Unavailable)
    }
}

/// Gateway that records every request and answers from a fixed reply.
///
/// `None` as reply makes every call fail with `Unavailable`.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    reply: Option<String>,
    requests: Mutex<Vec<EscalationRequest>>,
}

impl RecordingGateway {
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            reply: Some(answer.into()),
            requests: Mutex::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<EscalationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EscalationGateway for RecordingGateway {
    fn ask(&self, request: &EscalationRequest) -> Result<String, GatewayError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.reply.clone().ok_or(GatewayError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        escalate, EscalationRequest, RecordingGateway, StaticGateway, UnavailableGateway,
        ESCALATION_FALLBACK_ANSWER,
    };
    use crate::store::Domain;
    use serde_json::json;

    fn request() -> EscalationRequest {
        EscalationRequest::new(Domain::Inventory, "where is the drill?", json!({}))
    }

    #[test]
    fn answers_pass_through_unmodified() {
        let gateway = StaticGateway::new("  In the garage. \n");
        assert_eq!(
            escalate(&gateway, &request()),
            ("  In the garage. \n".to_string(), true)
        );
    }

    #[test]
    fn failures_become_the_fallback_answer() {
        assert_eq!(
            escalate(&UnavailableGateway, &request()),
            (ESCALATION_FALLBACK_ANSWER.to_string(), false)
        );
    }

    #[test]
    fn recording_gateway_keeps_requests() {
        let gateway = RecordingGateway::failing();
        let _ = escalate(&gateway, &request());
        assert_eq!(gateway.requests(), vec![request()]);
    }
}
