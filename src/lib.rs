//! Prospectify Engine - city recommendation service for Prospectify
//!
//! This library ranks European cities against a marketing customer profile
//! using a transparent additive rubric. City data comes from Supabase or
//! Postgres, with an embedded dataset as a never-failing fallback.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Recommender, calculate_match_score, MAX_RECOMMENDATIONS};
pub use models::{CustomerProfile, CityDemographic, CityFilters, CityPool, PoolOrigin, ScoringRubric};
pub use services::{CitySource, FallbackCitySource, RecommendationService, RecommendationSession, SourceError, StaticCitySource};
