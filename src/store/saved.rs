use crate::models::chat::{ Message, SavedChat };

/// In-memory favorites: conversation snapshots plus the current selection.
/// Nothing here outlives the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SavedChats {
    chats: Vec<SavedChat>,
    selected: Vec<i64>,
    visible: bool,
}

impl SavedChats {
    /// Stores a snapshot and returns the id it was filed under. Ids only grow,
    /// so a requested id that is not past the newest one gets bumped.
    pub fn save(&mut self, requested_id: i64, messages: Vec<Message>) -> i64 {
        let id = match self.chats.last() {
            Some(last) if requested_id <= last.id => last.id + 1,
            _ => requested_id,
        };
        self.chats.push(SavedChat { id, messages });
        id
    }

    pub fn get(&self, id: i64) -> Option<&SavedChat> {
        self.chats.iter().find(|chat| chat.id == id)
    }

    pub fn chats(&self) -> &[SavedChat] {
        &self.chats
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> &[i64] {
        &self.selected
    }

    /// Unknown ids are ignored.
    pub fn toggle_select(&mut self, id: i64) {
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else if self.get(id).is_some() {
            self.selected.push(id);
        }
    }

    /// Drops every selected chat and clears the selection.
    pub fn delete_selected(&mut self) -> usize {
        let before = self.chats.len();
        let selected = std::mem::take(&mut self.selected);
        self.chats.retain(|chat| !selected.contains(&chat.id));
        before - self.chats.len()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}
