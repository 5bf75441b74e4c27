//! Domain models shared by every service

pub mod application;
pub mod user;

pub use application::{
    Application, ApplicationStatus, NewApplication, ParseStatusError, UpdateApplication,
};
pub use user::{NewUser, User};
