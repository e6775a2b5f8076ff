//! Row structs and create/update payloads, one module per table group.

pub mod admin_user;
pub mod api_key;
pub mod audit;
pub mod completion;
pub mod goal;
pub mod photo;
pub mod profile;
pub mod role;
pub mod routine;
pub mod survey;
