pub mod health;
pub mod import;
pub mod index;
pub mod login;
pub mod lookup;
pub mod onboarding;
pub mod students;
