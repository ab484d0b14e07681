//! Verification of a canonical transaction against payment criteria.
//!
//! Every check always runs; the result lists every violated rule in a fixed
//! order (status, confirmation, recipient, amount, sender, memo).

use super::transaction::CanonicalTransaction;
use super::types::Address;
use std::fmt;

/// What a caller requires of a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCriteria {
    /// Principal that must receive the transfer.
    pub expected_recipient: Address,
    /// Minimum transferred amount in base units.
    pub min_amount: u64,
    /// Principal that must have sent the transfer, if any.
    pub expected_sender: Option<Address>,
    /// Exact memo the transfer must carry, if any.
    pub expected_memo: Option<String>,
    /// Accept transactions that are not yet confirmed.
    pub accept_unconfirmed: bool,
}

impl VerificationCriteria {
    /// Criteria requiring a confirmed transfer of at least `min_amount` to
    /// `expected_recipient`.
    #[must_use]
    pub fn new(expected_recipient: Address, min_amount: u64) -> Self {
        Self {
            expected_recipient,
            min_amount,
            expected_sender: None,
            expected_memo: None,
            accept_unconfirmed: false,
        }
    }

    /// Also require the given sender.
    #[must_use]
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.expected_sender = Some(sender);
        self
    }

    /// Also require the given memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.expected_memo = Some(memo.into());
        self
    }

    /// Accept unconfirmed transactions.
    #[must_use]
    pub fn accepting_unconfirmed(mut self) -> Self {
        self.accept_unconfirmed = true;
        self
    }
}

/// One failed criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The chain reports a terminal failure.
    FailedStatus {
        /// Raw chain status.
        status: String,
    },
    /// The transaction is not confirmed and confirmation was required.
    NotConfirmed,
    /// Funds went to someone else.
    RecipientMismatch {
        /// Required recipient.
        expected: Address,
        /// Actual recipient.
        actual: Address,
    },
    /// Too little was transferred.
    InsufficientAmount {
        /// Required minimum.
        expected: u64,
        /// Actual amount.
        actual: u64,
    },
    /// Funds came from someone else.
    SenderMismatch {
        /// Required sender.
        expected: Address,
        /// Actual sender.
        actual: Address,
    },
    /// The memo differs.
    MemoMismatch {
        /// Required memo.
        expected: String,
        /// Actual memo.
        actual: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailedStatus { status } => {
                write!(f, "transaction failed with status: {status}")
            }
            Self::NotConfirmed => f.write_str("transaction not confirmed"),
            Self::RecipientMismatch { expected, actual } => {
                write!(f, "recipient mismatch: expected {expected}, got {actual}")
            }
            Self::InsufficientAmount { expected, actual } => {
                write!(
                    f,
                    "insufficient amount: expected at least {expected}, got {actual}"
                )
            }
            Self::SenderMismatch { expected, actual } => {
                write!(f, "sender mismatch: expected {expected}, got {actual}")
            }
            Self::MemoMismatch { expected, actual } => {
                write!(f, "memo mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

/// Outcome of checking a transaction against criteria.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationResult {
    /// Violated criteria, in check order.
    pub violations: Vec<Violation>,
}

impl VerificationResult {
    /// True iff no criterion was violated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable violation messages, in check order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Check `tx` against `criteria`, collecting every violation.
#[must_use]
pub fn verify(tx: &CanonicalTransaction, criteria: &VerificationCriteria) -> VerificationResult {
    let mut violations = Vec::new();

    if tx.is_failed() {
        violations.push(Violation::FailedStatus {
            status: tx.raw_status.clone(),
        });
    }

    if !criteria.accept_unconfirmed && !tx.is_confirmed() {
        violations.push(Violation::NotConfirmed);
    }

    if tx.recipient != criteria.expected_recipient {
        violations.push(Violation::RecipientMismatch {
            expected: criteria.expected_recipient.clone(),
            actual: tx.recipient.clone(),
        });
    }

    if tx.amount < criteria.min_amount {
        violations.push(Violation::InsufficientAmount {
            expected: criteria.min_amount,
            actual: tx.amount,
        });
    }

    if let Some(expected) = &criteria.expected_sender {
        if &tx.sender != expected {
            violations.push(Violation::SenderMismatch {
                expected: expected.clone(),
                actual: tx.sender.clone(),
            });
        }
    }

    if let Some(expected) = &criteria.expected_memo {
        if &tx.memo != expected {
            violations.push(Violation::MemoMismatch {
                expected: expected.clone(),
                actual: tx.memo.clone(),
            });
        }
    }

    VerificationResult { violations }
}
