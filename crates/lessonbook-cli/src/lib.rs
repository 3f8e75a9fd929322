//! # lessonbook CLI
//!
//! Database seeding utilities for lessonbook development.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//!
//! ## Usage
//!
//! ```ignore
//! use lessonbook_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(24); // 24 students per class
//! seed_all(&pool, config).await?;
//! ```

pub mod seeder;
