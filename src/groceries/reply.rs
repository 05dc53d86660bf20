// SPDX-License-Identifier: MIT
//! Reply composition for list operations.
//!
//! An empty list always renders as the word "empty", never as a bare
//! joined string.

use super::{AddOutcome, RemoveOutcome, ITEM_DELIMITER};

/// "Your list is: milk, eggs." / "Your list is empty."
fn list_line(list: &[String]) -> String {
    if list.is_empty() {
        "Your list is empty.".to_string()
    } else {
        format!("Your list is: {}.", list.join(ITEM_DELIMITER))
    }
}

pub fn render_add(outcome: &AddOutcome) -> String {
    let mut out = String::from("Got it.");
    if !outcome.added.is_empty() {
        out.push_str(&format!(
            " I have added {} to your list.",
            outcome.added.join(ITEM_DELIMITER)
        ));
    }
    if !outcome.repeats.is_empty() {
        out.push_str(&format!(
            " Your list already includes: {}.",
            outcome.repeats.join(ITEM_DELIMITER)
        ));
    }
    out.push('\n');
    out.push_str(&list_line(&outcome.list));
    out
}

pub fn render_remove(outcome: &RemoveOutcome) -> String {
    match outcome {
        RemoveOutcome::EmptyList => {
            "There are no items to remove. Your list is empty.".to_string()
        }
        RemoveOutcome::NotFound { item, list } => {
            format!("I could not find {item} on your list.\n{}", list_line(list))
        }
        RemoveOutcome::Removed { item, list, .. } => {
            if list.is_empty() {
                format!("Got it. I have removed {item} from your list.\nYour list is now empty.")
            } else {
                format!(
                    "Got it. I have removed {item} from your list.\n{}",
                    list_line(list)
                )
            }
        }
    }
}

pub fn render_clear() -> String {
    "Got it. Your list is empty.".to_string()
}

pub fn render_print(list: &[String]) -> String {
    list_line(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_reply_names_added_and_repeats() {
        let outcome = AddOutcome {
            added: vec!["bread".into()],
            repeats: vec!["milk".into()],
            list: vec!["milk".into(), "eggs".into(), "bread".into()],
        };
        assert_eq!(
            render_add(&outcome),
            "Got it. I have added bread to your list. Your list already includes: milk.\n\
             Your list is: milk, eggs, bread."
        );
    }

    #[test]
    fn add_reply_omits_added_fragment_when_nothing_added() {
        let outcome = AddOutcome {
            added: vec![],
            repeats: vec![],
            list: vec!["milk".into()],
        };
        assert_eq!(render_add(&outcome), "Got it.\nYour list is: milk.");
    }

    #[test]
    fn remove_reply_renders_empty_list_as_word() {
        let outcome = RemoveOutcome::Removed {
            item: "milk".into(),
            occurrences: 1,
            list: vec![],
        };
        assert_eq!(
            render_remove(&outcome),
            "Got it. I have removed milk from your list.\nYour list is now empty."
        );
    }

    #[test]
    fn remove_reply_reports_missing_item() {
        let outcome = RemoveOutcome::NotFound {
            item: "bananas".into(),
            list: vec!["milk".into(), "bread".into()],
        };
        assert_eq!(
            render_remove(&outcome),
            "I could not find bananas on your list.\nYour list is: milk, bread."
        );
    }

    #[test]
    fn print_reply_for_empty_and_filled_lists() {
        assert_eq!(render_print(&[]), "Your list is empty.");
        assert_eq!(
            render_print(&["milk".to_string(), "eggs".to_string()]),
            "Your list is: milk, eggs."
        );
    }
}
