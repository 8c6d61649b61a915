// ABOUTME: Review creation and removal, owner replies and plan changes with featured-score re-ranking
// ABOUTME: Ranking inputs are re-read inside the same transaction that changes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::constants::limits::MAX_REVIEW_LENGTH;
use crate::constants::ranking::{MAX_RATING, MIN_RATING};
use crate::database::{BusinessManager, ReviewManager};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Business, PlanTier, Review, User};
use crate::ranking::{aggregate, score_for};
use crate::resources::ServerResources;
use crate::services::validation::{optional_text, required_text};

/// Recompute a business's review stats and featured score inside a transaction
///
/// # Errors
///
/// Returns 404 if the business does not exist, or a database error
pub async fn rerank_in(conn: &mut SqliteConnection, business_id: Uuid, reason: &str) -> AppResult<Business> {
    let business = BusinessManager::get_in(&mut *conn, business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;
    let ratings = ReviewManager::ratings_in(&mut *conn, business_id).await?;
    let stats = aggregate(&ratings);
    let score = score_for(business.plan, &stats);
    BusinessManager::update_ranking_in(&mut *conn, business_id, &stats, score).await?;

    AppLogger::log_ranking_update(business_id, reason, score);
    Ok(Business {
        avg_rating: stats.avg_rating,
        review_count: stats.review_count,
        featured_score: score,
        ..business
    })
}

/// Post a review and re-rank the business
///
/// # Errors
///
/// Returns 404 for a missing or inactive business, 400 for a rating outside
/// 1..=5 or an overlong comment, 403 when owners review their own business,
/// 409 on a second review of the same business, or a database error
pub async fn create_review(
    resources: &ServerResources,
    author: &User,
    business_id: Uuid,
    rating: i64,
    comment: Option<&str>,
) -> AppResult<Review> {
    let rating = u8::try_from(rating)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or_else(|| {
            AppError::out_of_range(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            ))
        })?;
    let comment = optional_text("Comment", comment, MAX_REVIEW_LENGTH)?;

    let business = resources
        .database
        .businesses()
        .get(business_id)
        .await?
        .filter(|b| b.is_active)
        .ok_or_else(|| AppError::not_found("Business"))?;
    if business.owner_id == author.id {
        return Err(AppError::permission_denied(
            "Business owners cannot review their own business",
        ));
    }

    let review = Review {
        id: Uuid::new_v4(),
        business_id,
        user_id: author.id,
        rating,
        comment,
        owner_reply: None,
        created_at: Utc::now(),
    };

    let mut tx = resources.database.begin().await?;
    ReviewManager::create_in(tx.executor()?, &review).await?;
    let business = rerank_in(tx.executor()?, business_id, "review_added").await?;
    resources
        .dispatcher
        .stage_review_in(tx.executor()?, &business, rating)
        .await?;
    tx.commit().await?;

    Ok(review)
}

/// Remove a review and re-rank its business
///
/// # Errors
///
/// Returns 404 if the review does not exist, or a database error
pub async fn delete_review(resources: &ServerResources, review_id: Uuid) -> AppResult<Review> {
    let mut tx = resources.database.begin().await?;
    let review = ReviewManager::delete_in(tx.executor()?, review_id)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;
    rerank_in(tx.executor()?, review.business_id, "review_removed").await?;
    tx.commit().await?;
    Ok(review)
}

/// Change a business's plan and re-rank it
///
/// # Errors
///
/// Returns 404 if the business does not exist, or a database error
pub async fn change_plan(
    resources: &ServerResources,
    business_id: Uuid,
    plan: PlanTier,
) -> AppResult<Business> {
    let mut tx = resources.database.begin().await?;
    if !BusinessManager::set_plan_in(tx.executor()?, business_id, plan).await? {
        return Err(AppError::not_found("Business"));
    }
    let business = rerank_in(tx.executor()?, business_id, "plan_changed").await?;
    tx.commit().await?;
    Ok(business)
}

/// Set the owner's public reply on a review
///
/// # Errors
///
/// Returns 404 if the review is missing, 403 unless the requester owns the
/// reviewed business or is an admin, 400 for a blank or overlong reply
pub async fn reply_to_review(
    resources: &ServerResources,
    requester: &User,
    review_id: Uuid,
    reply: &str,
) -> AppResult<Review> {
    let reply = required_text("Reply", reply, MAX_REVIEW_LENGTH)?;
    let database = &resources.database;

    let review = database
        .reviews()
        .get(review_id)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;
    let business = database
        .businesses()
        .get(review.business_id)
        .await?
        .ok_or_else(|| AppError::not_found("Business"))?;

    if business.owner_id != requester.id && !requester.role.is_admin() {
        return Err(AppError::permission_denied(
            "Only the business owner can reply to its reviews",
        ));
    }

    database
        .reviews()
        .set_reply(review_id, &reply)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))
}
