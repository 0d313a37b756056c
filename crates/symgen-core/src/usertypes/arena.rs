//! Arena storage for user types.
//!
//! User types form a tree through `declared_in` back-references. Storing them
//! in one arena with integer handles keeps the graph cycle-free by
//! construction and makes post-processing a matter of index bookkeeping
//! instead of shared-ownership juggling.

use super::user_type::UserType;

/// Handle to a user type in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserTypeId(u32);

impl UserTypeId
{
    /// Raw index, for debugging.
    #[must_use]
    pub fn index(self) -> u32
    {
        self.0
    }
}

/// Owns every user type created during a run.
#[derive(Debug, Default)]
pub struct TypeArena
{
    types: Vec<UserType>,
}

impl TypeArena
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn alloc(&mut self, user_type: UserType) -> UserTypeId
    {
        let id = UserTypeId(u32::try_from(self.types.len()).expect("user type arena overflow"));
        self.types.push(user_type);
        id
    }

    #[must_use]
    pub fn get(&self, id: UserTypeId) -> &UserType
    {
        &self.types[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: UserTypeId) -> &mut UserType
    {
        &mut self.types[id.0 as usize]
    }

    /// Every handle, in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = UserTypeId>
    {
        (0..self.types.len() as u32).map(UserTypeId)
    }

    #[must_use]
    pub fn len(&self) -> usize
    {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.types.is_empty()
    }
}
