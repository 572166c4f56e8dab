//! Closed set of actions the dispatcher accepts.

use crate::store::Domain;
use std::fmt::{Display, Formatter};

/// One supported intent action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddInventory,
    UpdateInventory,
    RemoveInventory,
    QueryInventory,
    AddShopping,
    UpdateShopping,
    RemoveShopping,
    QueryShopping,
    AddTodo,
    UpdateTodo,
    RemoveTodo,
    QueryTodo,
    RemoveLastInventory,
    RemoveLastShopping,
    RemoveLastTodo,
    LlmQueryInventory,
    LlmQueryShopping,
    LlmQueryTodo,
}

const ACTION_NAMES: &[(Action, &str)] = &[
    (Action::AddInventory, "add_inventory"),
    (Action::UpdateInventory, "update_inventory"),
    (Action::RemoveInventory, "remove_inventory"),
    (Action::QueryInventory, "query_inventory"),
    (Action::AddShopping, "add_shopping"),
    (Action::UpdateShopping, "update_shopping"),
    (Action::RemoveShopping, "remove_shopping"),
    (Action::QueryShopping, "query_shopping"),
    (Action::AddTodo, "add_todo"),
    (Action::UpdateTodo, "update_todo"),
    (Action::RemoveTodo, "remove_todo"),
    (Action::QueryTodo, "query_todo"),
    (Action::RemoveLastInventory, "remove_last_inventory"),
    (Action::RemoveLastShopping, "remove_last_shopping"),
    (Action::RemoveLastTodo, "remove_last_todo"),
    (Action::LlmQueryInventory, "llm_query_inventory"),
    (Action::LlmQueryShopping, "llm_query_shopping"),
    (Action::LlmQueryTodo, "llm_query_todo"),
];

impl Action {
    /// Parses a wire action name. Surrounding whitespace and case are ignored.
    pub fn parse(value: &str) -> Option<Action> {
        let normalized = value.trim().to_ascii_lowercase();
        ACTION_NAMES
            .iter()
            .find(|(_, name)| *name == normalized)
            .map(|(action, _)| *action)
    }

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        ACTION_NAMES
            .iter()
            .find(|(action, _)| *action == self)
            .map_or("unknown", |(_, name)| *name)
    }

    /// All supported wire names, in declaration order.
    pub fn supported_names() -> impl Iterator<Item = &'static str> {
        ACTION_NAMES.iter().map(|(_, name)| *name)
    }

    /// Collection this action reads or mutates.
    pub fn domain(self) -> Domain {
        match self {
            Self::AddInventory
            | Self::UpdateInventory
            | Self::RemoveInventory
            | Self::QueryInventory
            | Self::RemoveLastInventory
            | Self::LlmQueryInventory => Domain::Inventory,
            Self::AddShopping
            | Self::UpdateShopping
            | Self::RemoveShopping
            | Self::QueryShopping
            | Self::RemoveLastShopping
            | Self::LlmQueryShopping => Domain::Shopping,
            Self::AddTodo
            | Self::UpdateTodo
            | Self::RemoveTodo
            | Self::QueryTodo
            | Self::RemoveLastTodo
            | Self::LlmQueryTodo => Domain::Todo,
        }
    }

    /// Whether a non-empty `item` is mandatory.
    ///
    /// `query_shopping` falls back to the whole list without an item, so it is
    /// not item-scoped.
    pub fn requires_item(self) -> bool {
        matches!(
            self,
            Self::AddInventory
                | Self::UpdateInventory
                | Self::RemoveInventory
                | Self::QueryInventory
                | Self::AddShopping
                | Self::UpdateShopping
                | Self::RemoveShopping
                | Self::AddTodo
                | Self::UpdateTodo
                | Self::RemoveTodo
        )
    }

    /// Whether the action can change the stored collection.
    pub fn is_mutation(self) -> bool {
        !matches!(
            self,
            Self::QueryInventory
                | Self::QueryShopping
                | Self::QueryTodo
                | Self::LlmQueryInventory
                | Self::LlmQueryShopping
                | Self::LlmQueryTodo
        )
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Action;
    use crate::store::Domain;

    #[test]
    fn every_name_round_trips() {
        let names = Action::supported_names().collect::<Vec<_>>();
        assert_eq!(names.len(), 18);
        for name in names {
            let action = Action::parse(name).expect("supported name parses");
            assert_eq!(action.as_str(), name);
        }
    }

    #[test]
    fn parse_ignores_case_and_padding_but_not_spelling() {
        assert_eq!(Action::parse(" Add_Inventory "), Some(Action::AddInventory));
        assert_eq!(Action::parse("add inventory"), None);
        assert_eq!(Action::parse("delete_everything"), None);
    }

    #[test]
    fn item_scope_and_domains() {
        assert!(Action::UpdateShopping.requires_item());
        assert!(!Action::QueryShopping.requires_item());
        assert!(!Action::RemoveLastTodo.requires_item());
        assert_eq!(Action::LlmQueryTodo.domain(), Domain::Todo);
        assert!(!Action::QueryInventory.is_mutation());
        assert!(Action::RemoveLastShopping.is_mutation());
    }
}
