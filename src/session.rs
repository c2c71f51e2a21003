/// The user a dashboard is acting for.
///
/// Passed explicitly to the controller and the backend so that several
/// sessions can coexist in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: String,
}

impl Session {
    pub fn new(user: impl Into<String>) -> Self {
        Session { user: user.into() }
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}
