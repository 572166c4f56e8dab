use super::outcome::{ActionOutcome, DispatchError, ItemOutcome, ItemStatus};
use super::{inventory, shopping, todo, ItemFields, QueryStep};
use crate::clock::{Clock, SystemClock};
use crate::escalation::{escalate, EscalationGateway, EscalationRequest};
use crate::intent::{Action, Intent};
use crate::logging::text_preview;
use crate::matching::resolve_room;
use crate::model::todo::TodoDate;
use crate::store::{CollectionStore, CollectionStoreExt, Document, Domain, StoreResult};
use log::{info, warn};
use serde_json::Value;
use std::time::Instant;
use uuid::Uuid;

/// Applies intents to the collections behind `S`, escalating unresolved
/// queries through `G`.
///
/// Callers serialize dispatches that touch the same domain; see the store
/// module for the lost-update caveat.
pub struct ActionDispatcher<S, G, C = SystemClock> {
    store: S,
    gateway: G,
    clock: C,
}

impl<S, G> ActionDispatcher<S, G, SystemClock>
where
    S: CollectionStore,
    G: EscalationGateway,
{
    pub fn new(store: S, gateway: G) -> Self {
        Self::with_clock(store, gateway, SystemClock)
    }
}

impl<S, G, C> ActionDispatcher<S, G, C>
where
    S: CollectionStore,
    G: EscalationGateway,
    C: Clock,
{
    pub fn with_clock(store: S, gateway: G, clock: C) -> Self {
        Self {
            store,
            gateway,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Parses raw upstream text into an intent and dispatches it.
    pub fn dispatch_json(&self, raw: &str, question: &str) -> Result<ActionOutcome, DispatchError> {
        let intent = Intent::from_json_str(raw).map_err(|err| {
            warn!(
                "event=dispatch module=service status=error error_code=intent_parse error={}",
                err
            );
            DispatchError::from(err)
        })?;
        self.dispatch(&intent, question)
    }

    /// Validates `intent`, applies it to one fresh snapshot and writes the
    /// snapshot back when at least one item was applied.
    ///
    /// `question` is the user's original wording, forwarded verbatim on
    /// escalation.
    pub fn dispatch(&self, intent: &Intent, question: &str) -> Result<ActionOutcome, DispatchError> {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();

        let result = self.dispatch_inner(request_id, intent, question);
        match &result {
            Ok(outcome) => info!(
                "event=dispatch module=service status=ok request_id={} action={} items={} applied={} not_found={} empty={} escalated={} duration_ms={}",
                request_id,
                outcome.action,
                outcome.items.len(),
                outcome.count(ItemStatus::Applied),
                outcome.count(ItemStatus::NotFound),
                outcome.count(ItemStatus::Empty),
                outcome.count(ItemStatus::Escalated),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=dispatch module=service status=error request_id={} action={} error_code={} duration_ms={}",
                request_id,
                text_preview(&intent.action),
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn dispatch_inner(
        &self,
        request_id: Uuid,
        intent: &Intent,
        question: &str,
    ) -> Result<ActionOutcome, DispatchError> {
        let action = Action::parse(&intent.action)
            .ok_or_else(|| DispatchError::UnknownAction(intent.action.clone()))?;

        for field in &intent.ignored_fields {
            warn!(
                "event=intent_field_ignored module=service status=ignored request_id={} action={} field={}",
                request_id,
                action,
                text_preview(field)
            );
        }

        let names = intent.item_names();
        if action.requires_item() && names.is_empty() {
            return Err(DispatchError::MissingField("item"));
        }
        if intent.quantity == Some(0) {
            return Err(DispatchError::InvalidField {
                field: "quantity",
                value: "0".to_string(),
            });
        }

        info!(
            "event=dispatch module=service status=start request_id={} action={} items={}",
            request_id,
            action,
            names.len()
        );

        match action.domain() {
            Domain::Inventory => self.run_inventory(action, intent, &names, question),
            Domain::Shopping => self.run_shopping(action, intent, &names, question),
            Domain::Todo => self.run_todo(action, intent, &names, question),
        }
    }

    fn run_inventory(
        &self,
        action: Action,
        intent: &Intent,
        names: &[String],
        question: &str,
    ) -> Result<ActionOutcome, DispatchError> {
        let mut collection = self.store.read_inventory()?;
        let fields = ItemFields {
            location: intent.location.as_deref(),
            room: intent.room.as_deref().and_then(resolve_room),
            quantity: intent.quantity,
        };

        let items = match action {
            Action::AddInventory => inventory::add(&mut collection, names, fields),
            Action::UpdateInventory => inventory::update(&mut collection, names, fields),
            Action::RemoveInventory => inventory::remove(&mut collection, names, intent.quantity),
            Action::RemoveLastInventory => vec![inventory::remove_last(&mut collection)],
            Action::QueryInventory => {
                let steps = inventory::query(&collection, names);
                self.settle(Domain::Inventory, steps, question, || {
                    Document::from(collection.clone()).to_json_value()
                })?
            }
            _ => vec![self.ask(Domain::Inventory, question, || {
                Document::from(collection.clone()).to_json_value()
            })?],
        };

        let outcome = ActionOutcome::new(action, items);
        if action.is_mutation() && outcome.any_applied() {
            self.store.write_inventory(collection)?;
        }
        Ok(outcome)
    }

    fn run_shopping(
        &self,
        action: Action,
        intent: &Intent,
        names: &[String],
        question: &str,
    ) -> Result<ActionOutcome, DispatchError> {
        let mut collection = self.store.read_shopping()?;

        let items = match action {
            Action::AddShopping => shopping::add(&mut collection, names, intent.quantity),
            Action::UpdateShopping => shopping::update(&mut collection, names, intent.quantity),
            Action::RemoveShopping => shopping::remove(&mut collection, names, intent.quantity),
            Action::RemoveLastShopping => vec![shopping::remove_last(&mut collection)],
            Action::QueryShopping => {
                let steps = shopping::query(&collection, names);
                self.settle(Domain::Shopping, steps, question, || {
                    Document::from(collection.clone()).to_json_value()
                })?
            }
            _ => vec![self.ask(Domain::Shopping, question, || {
                Document::from(collection.clone()).to_json_value()
            })?],
        };

        let outcome = ActionOutcome::new(action, items);
        if action.is_mutation() && outcome.any_applied() {
            self.store.write_shopping(collection)?;
        }
        Ok(outcome)
    }

    fn run_todo(
        &self,
        action: Action,
        intent: &Intent,
        names: &[String],
        question: &str,
    ) -> Result<ActionOutcome, DispatchError> {
        let mut collection = self.store.read_todo()?;

        let items = match action {
            Action::AddTodo => todo::add(&mut collection, names, self.resolve_date(intent)?),
            Action::UpdateTodo => {
                todo::reschedule(&mut collection, names, self.resolve_date(intent)?)
            }
            Action::RemoveTodo => todo::remove(&mut collection, names, self.resolve_date(intent)?),
            Action::RemoveLastTodo => vec![todo::remove_last(&mut collection)],
            Action::QueryTodo => {
                let steps = todo::query(&collection, self.resolve_date(intent)?);
                self.settle(Domain::Todo, steps, question, || {
                    Document::from(collection.clone()).to_json_value()
                })?
            }
            _ => vec![self.ask(Domain::Todo, question, || {
                Document::from(collection.clone()).to_json_value()
            })?],
        };

        let outcome = ActionOutcome::new(action, items);
        if action.is_mutation() && outcome.any_applied() {
            self.store.write_todo(collection)?;
        }
        Ok(outcome)
    }

    /// `date` from the intent, or today's date.
    fn resolve_date(&self, intent: &Intent) -> Result<TodoDate, DispatchError> {
        match intent.date.as_deref() {
            Some(raw) => raw.parse().map_err(|_| DispatchError::InvalidField {
                field: "date",
                value: text_preview(raw),
            }),
            None => Ok(TodoDate::new(self.clock.today())),
        }
    }

    /// Turns query steps into outcomes. The first unresolved step escalates
    /// once; later unresolved steps are covered by that same answer.
    fn settle<F>(
        &self,
        domain: Domain,
        steps: Vec<QueryStep>,
        question: &str,
        snapshot: F,
    ) -> Result<Vec<ItemOutcome>, DispatchError>
    where
        F: FnOnce() -> StoreResult<Value>,
    {
        let mut snapshot = Some(snapshot);
        let mut items = Vec::with_capacity(steps.len());
        for step in steps {
            match step {
                QueryStep::Answered(outcome) => items.push(outcome),
                QueryStep::Unresolved => {
                    if let Some(snapshot) = snapshot.take() {
                        items.push(self.ask(domain, question, snapshot)?);
                    }
                }
            }
        }
        Ok(items)
    }

    fn ask<F>(&self, domain: Domain, question: &str, snapshot: F) -> Result<ItemOutcome, DispatchError>
    where
        F: FnOnce() -> StoreResult<Value>,
    {
        let request = EscalationRequest::new(domain, question, snapshot()?);
        let (answer, _) = escalate(&self.gateway, &request);
        Ok(ItemOutcome::escalated(answer))
    }
}
