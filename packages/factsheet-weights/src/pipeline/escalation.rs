//! Escalation policy: which fallback runs next, and whether its answer is
//! adopted. Pure functions, no I/O.

use crate::types::constituent::{is_plausible, weight_sum, ConstituentWeight};
use crate::types::provider::Provider;
use crate::types::result::{ErrorCode, WorkflowError};

/// A fallback tier tried when parsing produced an implausible answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Issuer catalog ticker, then the vendor holdings endpoint
    VendorHoldings,
    /// Render the allocation page and recognise it
    Ocr,
    /// Nothing left to try; go to final validation
    Finish,
}

/// Next tier to try after `previous` (or after parsing when `None`).
///
/// A plausible answer always finishes. The vendor tier only applies to
/// providers served by the vendor endpoint; OCR is tried at most once.
pub fn next_escalation(
    provider: Provider,
    constituents: &[ConstituentWeight],
    previous: Option<Escalation>,
) -> Escalation {
    if is_plausible(constituents) {
        return Escalation::Finish;
    }
    match previous {
        None if provider.uses_vendor_holdings() => Escalation::VendorHoldings,
        None | Some(Escalation::VendorHoldings) => Escalation::Ocr,
        Some(Escalation::Ocr) | Some(Escalation::Finish) => Escalation::Finish,
    }
}

/// Vendor holdings replace the prior answer whenever they list anything.
pub fn accept_vendor(constituents: &[ConstituentWeight]) -> bool {
    !constituents.is_empty()
}

/// OCR replaces the prior answer only when it is itself plausible.
pub fn accept_ocr(constituents: &[ConstituentWeight]) -> bool {
    is_plausible(constituents)
}

/// Terminal check of the final answer.
pub fn validate(constituents: &[ConstituentWeight]) -> Result<(), WorkflowError> {
    if constituents.is_empty() {
        return Err(WorkflowError::new(
            ErrorCode::InsufficientData,
            "no constituents extracted; allocation may be embedded as an image",
        ));
    }
    let sum = weight_sum(constituents);
    if !is_plausible(constituents) {
        return Err(WorkflowError::new(
            ErrorCode::WeightSumInvalid,
            format!("weight sum {:.2}% outside tolerance (90–110%)", sum),
        ));
    }
    Ok(())
}
