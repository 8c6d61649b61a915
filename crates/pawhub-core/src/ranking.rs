// ABOUTME: Featured-score ranking used as the default listing sort key
// ABOUTME: Weighted sum of plan tier, average rating and capped review count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

//! `score = planWeight*40 + avgRating*30 + min(reviewCount, 100)*0.2`

use crate::constants::ranking::{
    MAX_RATING, PLAN_WEIGHT_FACTOR, RATING_FACTOR, REVIEW_COUNT_CAP, REVIEW_COUNT_FACTOR,
};
use crate::models::{PlanTier, ReviewStats};

/// Compute the featured score of a business
///
/// Ratings are clamped to `0..=5`; NaN counts as 0. The result is never
/// negative.
#[must_use]
pub fn featured_score(plan: PlanTier, avg_rating: f64, review_count: u32) -> f64 {
    let rating = if avg_rating.is_finite() {
        avg_rating.clamp(0.0, f64::from(MAX_RATING))
    } else {
        0.0
    };
    let capped_reviews = review_count.min(REVIEW_COUNT_CAP);

    f64::from(plan.weight()).mul_add(
        PLAN_WEIGHT_FACTOR,
        rating.mul_add(RATING_FACTOR, f64::from(capped_reviews) * REVIEW_COUNT_FACTOR),
    )
}

/// Featured score from aggregated review stats
#[must_use]
pub fn score_for(plan: PlanTier, stats: &ReviewStats) -> f64 {
    featured_score(plan, stats.avg_rating, stats.review_count)
}

/// Aggregate a set of ratings into stats
#[must_use]
pub fn aggregate(ratings: &[u8]) -> ReviewStats {
    if ratings.is_empty() {
        return ReviewStats::default();
    }
    let total: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
    let count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
    ReviewStats {
        avg_rating: f64::from(total) / f64::from(count),
        review_count: count,
    }
}
