//! data_runtime: configuration records and loaders for the combat core.
//!
//! The combat runtime consumes immutable, in-memory records; parsing lives
//! here so the core itself never touches files. Persisted table rows mirror
//! the exported sheet columns 1:1; [`db::ConfigDb`] indexes them and compiles
//! the runtime [`skill::SkillSpec`] records the skill system executes.

pub mod attr;
pub mod db;
pub mod loader;
pub mod skill;
pub mod tables;
