//! Scenario and payment-method-type declarations.

use serde::{Deserialize, Serialize};

/// Request scenario, selecting the compiler's fixed parameters.
///
/// Serializes as a snake_case string so it can key the per-scenario
/// override map inside persisted profile documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Plain card request without payer authentication.
    Unauthenticated,
    /// Card request forced through 3-D Secure authentication.
    Authenticated,
    /// Alternative-payment request (mobile money, bank transfer).
    AlternativePayment,
}

impl Scenario {
    /// Returns the profile category this scenario draws its fields from.
    #[must_use]
    pub const fn category(self) -> ProfileCategory {
        match self {
            Self::Unauthenticated | Self::Authenticated => ProfileCategory::Card,
            Self::AlternativePayment => ProfileCategory::AlternativePayment,
        }
    }
}

/// Profile category, fixing the field-model key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileCategory {
    /// Debit/credit card profiles.
    Card,
    /// Alternative-payment-method profiles.
    AlternativePayment,
}

/// Output shape of an alternative-payment request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Fields wrapped under a `payment` sub-object.
    PaymentNested,
    /// Fields at the top level of the body.
    Direct,
}

/// Alternative-payment method types the compiler knows how to shape.
///
/// The body shape for each method is a fixed declaration, never inferred
/// from the data being compiled. Adding a method means adding a variant
/// and its [`shape`](Self::shape) entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApmMethod {
    /// M-PESA mobile money.
    Mpesa,
    /// MTN mobile money.
    MtnMomo,
    /// Direct bank transfer.
    BankTransfer,
    /// Electronic funds transfer.
    Eft,
}

impl ApmMethod {
    /// Returns the declared body shape for this method type.
    #[must_use]
    pub const fn shape(self) -> PayloadShape {
        match self {
            // Wallet-style methods nest under `payment`.
            Self::Mpesa | Self::MtnMomo => PayloadShape::PaymentNested,
            // Bank-transfer-style methods post fields at the top level.
            Self::BankTransfer | Self::Eft => PayloadShape::Direct,
        }
    }

    /// Wire name of the method, as emitted in the compiled body.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Mpesa => "mpesa",
            Self::MtnMomo => "mtn_momo",
            Self::BankTransfer => "banktransfer",
            Self::Eft => "eft",
        }
    }
}
