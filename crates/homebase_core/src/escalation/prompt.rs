use super::EscalationRequest;

/// Renders the prompt sent to a language model for an escalated question.
pub fn build_escalation_prompt(request: &EscalationRequest) -> String {
    let snapshot = serde_json::to_string_pretty(&request.snapshot)
        .unwrap_or_else(|_| request.snapshot.to_string());
    format!(
        "You are a home assistant answering a question about the user's {domain} list.\n\
         Here is the full {domain} data as JSON:\n\
         {snapshot}\n\n\
         Question: {question}\n\n\
         Answer using only the data above. Match fuzzy phrasing, synonyms and \
         locations when the wording differs. If nothing relevant is found, say so clearly.",
        domain = request.domain,
        snapshot = snapshot,
        question = request.question.trim(),
    )
}
