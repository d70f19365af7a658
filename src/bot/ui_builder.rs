//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;
use tracing::warn;

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::action::NavigationAction;
use crate::catalog::{Category, Item};

/// Category buttons per row on the root menu
pub const ROOT_BUTTONS_PER_ROW: usize = 2;

/// One button: what the user sees and what pressing it does
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub label: String,
    pub action: NavigationAction,
}

impl KeyboardButton {
    /// `None` when the action cannot be carried by a callback payload
    fn new(label: impl Into<String>, action: NavigationAction) -> Option<Self> {
        let label = label.into();
        if action.to_token().is_none() {
            warn!(label = %label, action = action.kind(), "Button payload too long, leaving it out");
            return None;
        }
        Some(Self { label, action })
    }
}

/// Ordered rows of buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardLayout {
    pub rows: Vec<Vec<KeyboardButton>>,
}

impl KeyboardLayout {
    pub fn push_row(&mut self, row: Vec<KeyboardButton>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &KeyboardButton> {
        self.rows.iter().flatten()
    }

    pub fn to_inline_markup(&self) -> InlineKeyboardMarkup {
        let rows: Vec<Vec<InlineKeyboardButton>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| {
                        InlineKeyboardButton::callback(
                            button.label.clone(),
                            button.action.to_string(),
                        )
                    })
                    .collect()
            })
            .collect();
        InlineKeyboardMarkup::new(rows)
    }
}

/// Root menu: categories two per row, then a search row and a reset row
pub fn create_root_keyboard(categories: &[Category], language: &str) -> KeyboardLayout {
    let mut keyboard = KeyboardLayout::default();
    let mut row = Vec::with_capacity(ROOT_BUTTONS_PER_ROW);

    for category in categories {
        let button = KeyboardButton::new(
            format!("📂 {}", category.label()),
            NavigationAction::ShowCategory(category.name.clone()),
        );
        row.extend(button);
        if row.len() == ROOT_BUTTONS_PER_ROW {
            keyboard.push_row(std::mem::take(&mut row));
        }
    }
    keyboard.push_row(row);

    keyboard.push_row(
        KeyboardButton::new(t_lang("button-search", language), NavigationAction::EnterSearchMode)
            .into_iter()
            .collect(),
    );
    keyboard.push_row(reset_row(language));
    keyboard
}

/// One row per item, then the back and reset rows.
///
/// Buttons carry the full file name so a differently cased extension still
/// resolves to the listed file.
pub fn create_item_keyboard(items: &[Item], language: &str) -> KeyboardLayout {
    let mut keyboard = KeyboardLayout::default();
    for item in items {
        let button = KeyboardButton::new(
            format!("📄 {}", item.label()),
            NavigationAction::DeliverItem {
                category: item.category.clone(),
                item: item.file_name.clone(),
            },
        );
        keyboard.push_row(button.into_iter().collect());
    }
    append_navigation_rows(&mut keyboard, language);
    keyboard
}

/// Like [`create_item_keyboard`], with the category named on each button
pub fn create_search_keyboard(hits: &[Item], language: &str) -> KeyboardLayout {
    let mut keyboard = KeyboardLayout::default();
    for item in hits {
        let category = Category {
            name: item.category.clone(),
        };
        let button = KeyboardButton::new(
            format!("📄 {} · {}", item.label(), category.label()),
            NavigationAction::DeliverItem {
                category: item.category.clone(),
                item: item.file_name.clone(),
            },
        );
        keyboard.push_row(button.into_iter().collect());
    }
    append_navigation_rows(&mut keyboard, language);
    keyboard
}

/// Only the back and reset rows
pub fn create_navigation_keyboard(language: &str) -> KeyboardLayout {
    let mut keyboard = KeyboardLayout::default();
    append_navigation_rows(&mut keyboard, language);
    keyboard
}

fn append_navigation_rows(keyboard: &mut KeyboardLayout, language: &str) {
    keyboard.push_row(
        KeyboardButton::new(t_lang("button-back", language), NavigationAction::ReturnToRoot)
            .into_iter()
            .collect(),
    );
    keyboard.push_row(reset_row(language));
}

fn reset_row(language: &str) -> Vec<KeyboardButton> {
    KeyboardButton::new(t_lang("button-reset", language), NavigationAction::ResetSession)
        .into_iter()
        .collect()
}

/// Greeting shown above the root keyboard
pub fn format_root_message(has_categories: bool, language: &str) -> String {
    let body = if has_categories {
        t_lang("welcome-choose", language)
    } else {
        t_lang("catalog-empty", language)
    };
    format!("{}\n\n{}", t_lang("welcome-title", language), body)
}

/// Header shown above a category's item list
pub fn format_category_message(category: &Category, has_items: bool, language: &str) -> String {
    let label = html::escape(&category.label());
    let title = t_args_lang("category-title", &[("category", label.as_str())], language);
    let body = if has_items {
        t_lang("category-choose", language)
    } else {
        t_lang("category-empty", language)
    };
    format!("{title}\n\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn category(name: &str) -> Category {
        Category {
            name: name.to_string(),
        }
    }

    fn item(category: &str, name: &str) -> Item {
        Item {
            category: category.to_string(),
            name: name.to_string(),
            file_name: format!("{name}.pdf"),
            path: PathBuf::from(format!("{category}/{name}.pdf")),
        }
    }

    fn actions(row: &[KeyboardButton]) -> Vec<NavigationAction> {
        row.iter().map(|b| b.action.clone()).collect()
    }

    #[test]
    fn test_root_keyboard_groups_two_per_row() {
        let keyboard =
            create_root_keyboard(&[category("a"), category("b"), category("c")], "es");

        assert_eq!(keyboard.rows.len(), 4);
        assert_eq!(
            actions(&keyboard.rows[0]),
            vec![
                NavigationAction::ShowCategory("a".into()),
                NavigationAction::ShowCategory("b".into())
            ]
        );
        assert_eq!(
            actions(&keyboard.rows[1]),
            vec![NavigationAction::ShowCategory("c".into())]
        );
        assert_eq!(actions(&keyboard.rows[2]), vec![NavigationAction::EnterSearchMode]);
        assert_eq!(actions(&keyboard.rows[3]), vec![NavigationAction::ResetSession]);
        assert_eq!(keyboard.rows[0][0].label, "📂 A");
    }

    #[test]
    fn test_root_keyboard_without_categories() {
        let keyboard = create_root_keyboard(&[], "es");
        assert_eq!(keyboard.rows.len(), 2);
    }

    #[test]
    fn test_item_keyboard_has_one_row_per_item() {
        let items = [item("postres", "Flan"), item("postres", "Natillas")];
        let keyboard = create_item_keyboard(&items, "en");

        assert_eq!(keyboard.rows.len(), 4);
        assert!(keyboard.rows.iter().all(|row| row.len() == 1));
        assert_eq!(
            keyboard.rows[1][0].action,
            NavigationAction::DeliverItem {
                category: "postres".into(),
                item: "Natillas.pdf".into()
            }
        );
        assert_eq!(keyboard.rows[2][0].action, NavigationAction::ReturnToRoot);
        assert_eq!(keyboard.rows[3][0].action, NavigationAction::ResetSession);
    }

    #[test]
    fn test_oversized_item_is_left_out() {
        let items = [item("postres", &"x".repeat(80)), item("postres", "Flan")];
        let keyboard = create_item_keyboard(&items, "es");
        assert_eq!(keyboard.rows.len(), 3);
    }

    #[test]
    fn test_inline_markup_carries_tokens() {
        let keyboard = create_navigation_keyboard("es");
        let markup = keyboard.to_inline_markup();
        assert_eq!(markup.inline_keyboard.len(), 2);
    }

    #[test]
    fn test_category_title_is_escaped() {
        let text = format_category_message(&category("pan & co"), true, "es");
        assert!(text.contains("Pan &amp; co"));
    }
}
