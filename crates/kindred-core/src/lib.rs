//! Kindred Core - the people in a family graph
//!
//! This crate holds the data model shared by every other Kindred crate.
//! A [`Person`] is immutable once created; the graph crate assigns ids
//! and relates people to each other.
//!
//! # Example
//!
//! ```
//! use kindred_core::{Person, PersonId};
//!
//! let ada = Person::new(PersonId::new(0), "Ada", "Lovelace");
//! assert_eq!(ada.display_name(), "Ada Lovelace");
//! ```

mod person;

pub use person::{NewPerson, Person, PersonId};
