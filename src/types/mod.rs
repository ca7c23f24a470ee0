// src/types/mod.rs
//! Backend entities as seen by the client

pub mod application;
pub mod job;
pub mod notification;
pub mod payment;
pub mod rating;
pub mod response;
pub mod user;

use serde::{Deserialize, Serialize};

/// Records carrying a backend identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A relation the backend sends either as a bare id or populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Populated(Box<T>),
}

impl<T: Identified> Reference<T> {
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id,
            Reference::Populated(record) => record.id(),
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Id(_) => None,
            Reference::Populated(record) => Some(record),
        }
    }
}
