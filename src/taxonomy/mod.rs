//! Taxonomy id to lineage resolution.

pub mod db;

pub use db::TaxonomyDb;
