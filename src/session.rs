//! Per-session context: who is signed in, which class and space they are
//! working in. Built once when the session starts and passed to whatever
//! needs it rather than read from a global.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub is_professor: bool,
}

/// The class ("kelas") currently open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Option<User>,
    profile: Option<Profile>,
    class: Option<ClassRef>,
    space_id: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_space(space_id: Option<String>) -> Self {
        let mut ctx = Self::default();
        ctx.set_space(space_id);
        ctx
    }

    /// A session is initialized once both the user and profile are known.
    pub fn is_initialized(&self) -> bool {
        self.user.is_some() && self.profile.is_some()
    }

    pub fn update_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn update_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    pub fn update_class(&mut self, class: ClassRef) {
        self.class = Some(class);
    }

    /// Blank ids clear the space.
    pub fn set_space(&mut self, space_id: Option<String>) {
        self.space_id = space_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn class(&self) -> Option<&ClassRef> {
        self.class.as_ref()
    }

    pub fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    pub fn is_professor(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_professor)
    }
}
