//! Level Table
//!
//! Owns every level of a building. Ids are handed out sequentially and never
//! reused while the table lives; levels are only removed by truncating the
//! sequence or resetting it wholesale.

use super::level::{Level, LevelBlueprint, LevelId};

#[derive(Debug, Default, Clone)]
pub struct LevelTable {
    levels: Vec<Level>,
    next_id: i32,
}

impl LevelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a level built from a blueprint and return its id.
    pub fn push(&mut self, blueprint: &LevelBlueprint) -> LevelId {
        let id = LevelId(self.next_id);
        self.next_id += 1;
        self.levels.push(blueprint.instantiate(id));
        id
    }

    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|level| level.id() == id)
    }

    pub fn get_mut(&mut self, id: LevelId) -> Option<&mut Level> {
        self.levels.iter_mut().find(|level| level.id() == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.name == name)
    }

    pub fn contains(&self, id: LevelId) -> bool {
        self.get(id).is_some()
    }

    /// Level at a sequence position.
    pub fn at(&self, position: usize) -> Option<&Level> {
        self.levels.get(position)
    }

    pub fn at_mut(&mut self, position: usize) -> Option<&mut Level> {
        self.levels.get_mut(position)
    }

    /// Level that precedes `id` in the sequence.
    pub fn previous_of(&self, id: LevelId) -> Option<&Level> {
        let position = self.levels.iter().position(|level| level.id() == id)?;
        position.checked_sub(1).and_then(|p| self.levels.get(p))
    }

    /// Level `id` sits on: its named support, or the one before it.
    pub fn support_of(&self, id: LevelId) -> Option<&Level> {
        let level = self.get(id)?;
        match &level.rests_on {
            Some(name) => self.by_name(name),
            None => self.previous_of(id),
        }
    }

    pub fn ids(&self) -> Vec<LevelId> {
        self.levels.iter().map(Level::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Level> {
        self.levels.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Drop every level past `len`. Returns the ids that were removed,
    /// top-most last.
    pub fn truncate(&mut self, len: usize) -> Vec<LevelId> {
        if len >= self.levels.len() {
            return Vec::new();
        }
        self.levels.drain(len..).map(|level| level.id()).collect()
    }

    /// Clear the whole sequence. Ids keep counting up.
    pub fn reset(&mut self) {
        self.levels.clear();
    }

    pub fn snapshot(&self) -> Vec<Level> {
        self.levels.clone()
    }
}
