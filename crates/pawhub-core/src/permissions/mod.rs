// ABOUTME: Role-based permission model for marketplace users
// ABOUTME: Pet owners book, business owners run listings, admins manage everything
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// User role stored on the `users.role` column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Customer who books grooming for their pets
    #[default]
    PetOwner,
    /// Runs one or more grooming businesses
    BusinessOwner,
    /// Platform operator
    Admin,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PetOwner => "pet_owner",
            Self::BusinessOwner => "business_owner",
            Self::Admin => "admin",
        }
    }

    /// Whether the role grants admin access
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether the role may create and manage business listings
    #[must_use]
    pub const fn can_manage_businesses(&self) -> bool {
        matches!(self, Self::BusinessOwner | Self::Admin)
    }

    /// Whether the role can be chosen at self-registration
    #[must_use]
    pub const fn is_self_assignable(&self) -> bool {
        matches!(self, Self::PetOwner | Self::BusinessOwner)
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pet_owner" => Ok(Self::PetOwner),
            "business_owner" => Ok(Self::BusinessOwner),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_db_string() {
        for role in [UserRole::PetOwner, UserRole::BusinessOwner, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_admin_cannot_self_register() {
        assert!(!UserRole::Admin.is_self_assignable());
        assert!(UserRole::BusinessOwner.is_self_assignable());
    }
}
