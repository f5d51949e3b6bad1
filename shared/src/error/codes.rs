//! Unified error codes for the cohort service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 4xxx: Submission errors
//! - 5xxx: Billing errors
//! - 6xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so that API clients can
/// switch on a number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Too many attempts from one client
    TooManyAttempts = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Account ====================
    /// User not found
    UserNotFound = 3001,
    /// Email already registered
    EmailAlreadyRegistered = 3002,
    /// Password too short
    PasswordTooShort = 3003,
    /// Email format rejected
    InvalidEmail = 3004,

    // ==================== 4xxx: Submission ====================
    /// Submission not found
    SubmissionNotFound = 4001,
    /// User already submitted for the current cohort day
    AlreadySubmittedToday = 4002,
    /// Daily cutoff has passed
    SubmissionWindowClosed = 4003,
    /// Submission content empty
    SubmissionEmpty = 4004,
    /// Submission content exceeds the size limit
    SubmissionTooLarge = 4005,
    /// Grade outside 0..=100
    InvalidScore = 4006,

    // ==================== 5xxx: Billing ====================
    /// Active subscription required for this action
    SubscriptionRequired = 5001,
    /// Subscription already active
    SubscriptionAlreadyActive = 5002,
    /// No billing account (Stripe customer) exists yet
    BillingAccountMissing = 5003,
    /// Payment setup failed (Stripe)
    PaymentSetupFailed = 5004,

    // ==================== 6xxx: Notification ====================
    /// Quiet hours malformed or inconsistent
    InvalidQuietHours = 6001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TooManyAttempts => "Too many attempts, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::InvalidEmail => "Invalid email address",

            // Submission
            ErrorCode::SubmissionNotFound => "Submission not found",
            ErrorCode::AlreadySubmittedToday => "Already submitted for today",
            ErrorCode::SubmissionWindowClosed => "Today's submission window has closed",
            ErrorCode::SubmissionEmpty => "Submission content is empty",
            ErrorCode::SubmissionTooLarge => "Submission content is too large",
            ErrorCode::InvalidScore => "Score must be between 0 and 100",

            // Billing
            ErrorCode::SubscriptionRequired => "An active subscription is required",
            ErrorCode::SubscriptionAlreadyActive => "Subscription is already active",
            ErrorCode::BillingAccountMissing => "No billing account exists yet",
            ErrorCode::PaymentSetupFailed => "Payment setup failed",

            // Notification
            ErrorCode::InvalidQuietHours => "Invalid quiet hours",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Account
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::EmailAlreadyRegistered),
            3003 => Ok(ErrorCode::PasswordTooShort),
            3004 => Ok(ErrorCode::InvalidEmail),

            // Submission
            4001 => Ok(ErrorCode::SubmissionNotFound),
            4002 => Ok(ErrorCode::AlreadySubmittedToday),
            4003 => Ok(ErrorCode::SubmissionWindowClosed),
            4004 => Ok(ErrorCode::SubmissionEmpty),
            4005 => Ok(ErrorCode::SubmissionTooLarge),
            4006 => Ok(ErrorCode::InvalidScore),

            // Billing
            5001 => Ok(ErrorCode::SubscriptionRequired),
            5002 => Ok(ErrorCode::SubscriptionAlreadyActive),
            5003 => Ok(ErrorCode::BillingAccountMissing),
            5004 => Ok(ErrorCode::PaymentSetupFailed),

            // Notification
            6001 => Ok(ErrorCode::InvalidQuietHours),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::AlreadySubmittedToday.code(), 4002);
        assert_eq!(ErrorCode::SubscriptionRequired.code(), 5001);
        assert_eq!(ErrorCode::InvalidQuietHours.code(), 6001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(2), Ok(ErrorCode::ValidationFailed));
        assert_eq!(
            ErrorCode::try_from(4003),
            Ok(ErrorCode::SubmissionWindowClosed)
        );
        assert_eq!(ErrorCode::try_from(5004), Ok(ErrorCode::PaymentSetupFailed));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(9002), Err(InvalidErrorCode(9002)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::AlreadySubmittedToday).unwrap();
        assert_eq!(json, "4002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("5001").unwrap();
        assert_eq!(code, ErrorCode::SubscriptionRequired);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("4999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::InvalidQuietHours), "6001");
    }

    #[test]
    fn test_roundtrip_every_code() {
        let codes = [
            ErrorCode::ValidationFailed,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::TooManyAttempts,
            ErrorCode::PermissionDenied,
            ErrorCode::UserNotFound,
            ErrorCode::EmailAlreadyRegistered,
            ErrorCode::PasswordTooShort,
            ErrorCode::InvalidEmail,
            ErrorCode::SubmissionNotFound,
            ErrorCode::AlreadySubmittedToday,
            ErrorCode::SubmissionWindowClosed,
            ErrorCode::SubmissionEmpty,
            ErrorCode::SubmissionTooLarge,
            ErrorCode::InvalidScore,
            ErrorCode::SubscriptionRequired,
            ErrorCode::SubscriptionAlreadyActive,
            ErrorCode::BillingAccountMissing,
            ErrorCode::PaymentSetupFailed,
            ErrorCode::InvalidQuietHours,
            ErrorCode::InternalError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
            assert!(!code.message().is_empty());
        }
    }
}
