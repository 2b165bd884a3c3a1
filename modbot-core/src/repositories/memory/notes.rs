use async_trait::async_trait;
use dashmap::DashMap;
use modbot_common::models::Note;
use modbot_common::traits::NoteRepository;
use crate::Error;

#[derive(Default)]
pub struct InMemoryNoteRepository {
    notes: DashMap<(i64, String), Note>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn save_note(&self, note: &Note) -> Result<(), Error> {
        self.notes.insert((note.chat_id, note.key.clone()), note.clone());
        Ok(())
    }

    async fn get_note(&self, chat_id: i64, key: &str) -> Result<Option<Note>, Error> {
        Ok(self.notes.get(&(chat_id, key.to_string())).map(|n| n.clone()))
    }

    async fn list_notes(&self, chat_id: i64) -> Result<Vec<Note>, Error> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.key().0 == chat_id)
            .map(|n| n.value().clone())
            .collect();
        notes.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(notes)
    }

    async fn delete_note(&self, chat_id: i64, key: &str) -> Result<bool, Error> {
        Ok(self.notes.remove(&(chat_id, key.to_string())).is_some())
    }
}
