use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GST slab applied to an invoice. Only the rates the invoice form offers
/// are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GstRate {
    Exempt,
    Five,
    Twelve,
    Eighteen,
    TwentyEight,
}

#[derive(Debug, Error)]
#[error("unsupported GST rate: {0}%")]
pub struct UnknownGstRate(pub u8);

impl GstRate {
    pub const ALL: &'static [GstRate] = &[
        GstRate::Exempt,
        GstRate::Five,
        GstRate::Twelve,
        GstRate::Eighteen,
        GstRate::TwentyEight,
    ];

    pub fn percent(&self) -> f64 {
        match self {
            GstRate::Exempt => 0.0,
            GstRate::Five => 5.0,
            GstRate::Twelve => 12.0,
            GstRate::Eighteen => 18.0,
            GstRate::TwentyEight => 28.0,
        }
    }

    /// Label shown by the rate selector.
    pub fn label(&self) -> &'static str {
        match self {
            GstRate::Exempt => "0% (Exempt)",
            GstRate::Five => "5%",
            GstRate::Twelve => "12%",
            GstRate::Eighteen => "18%",
            GstRate::TwentyEight => "28%",
        }
    }
}

impl From<GstRate> for u8 {
    fn from(rate: GstRate) -> u8 {
        rate.percent() as u8
    }
}

impl TryFrom<u8> for GstRate {
    type Error = UnknownGstRate;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        match percent {
            0 => Ok(GstRate::Exempt),
            5 => Ok(GstRate::Five),
            12 => Ok(GstRate::Twelve),
            18 => Ok(GstRate::Eighteen),
            28 => Ok(GstRate::TwentyEight),
            other => Err(UnknownGstRate(other)),
        }
    }
}

/// Tax breakdown derived from the invoice form's inputs. Never mutated on
/// its own; recomputed from scratch whenever an input changes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InvoiceTotals {
    pub taxable_amount: f64,
    pub cgst_amount: f64,
    pub sgst_amount: f64,
    pub igst_amount: f64,
    pub grand_total: f64,
}

/// Derive the taxable amount and GST breakdown for a single-line invoice.
///
/// Pure arithmetic: no I/O, no hidden state, identical inputs give
/// bit-identical outputs. Each numeric input is normalized before use —
/// NaN, infinities, and negatives become 0.0, so a half-typed form field
/// can never make this fail. The taxable amount itself is NOT clamped:
/// deductions larger than the base leave it (and the taxes on it)
/// negative.
///
/// GST is always split in half between CGST and SGST. IGST stays zero
/// even though the field exists.
// TODO: produce IGST instead of the CGST/SGST split when the firm and
// client are in different states; the state fields are stored but never
// compared.
pub fn compute_totals(
    rate: f64,
    quantity: f64,
    gst_rate: GstRate,
    extra_charges: f64,
    extra_deductions: f64,
) -> InvoiceTotals {
    let rate = sanitize(rate);
    let quantity = sanitize(quantity);
    let extra_charges = sanitize(extra_charges);
    let extra_deductions = sanitize(extra_deductions);

    let taxable_amount = rate * quantity + extra_charges - extra_deductions;

    let percent = gst_rate.percent();
    let (cgst_amount, sgst_amount) = if percent > 0.0 {
        let half = taxable_amount * percent / 200.0;
        (half, half)
    } else {
        (0.0, 0.0)
    };
    let igst_amount = 0.0;

    let grand_total = taxable_amount + cgst_amount + sgst_amount + igst_amount;

    InvoiceTotals {
        taxable_amount,
        cgst_amount,
        sgst_amount,
        igst_amount,
        grand_total,
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exempt_rate_yields_no_tax() {
        let totals = compute_totals(120.0, 10.0, GstRate::Exempt, 500.0, 200.0);
        assert_eq!(totals.taxable_amount, 120.0 * 10.0 + 500.0 - 200.0);
        assert_eq!(totals.cgst_amount, 0.0);
        assert_eq!(totals.sgst_amount, 0.0);
        assert_eq!(totals.igst_amount, 0.0);
        assert_eq!(totals.grand_total, totals.taxable_amount);
    }

    #[test]
    fn gst_splits_evenly_between_cgst_and_sgst() {
        for rate in GstRate::ALL {
            let totals = compute_totals(1000.0, 3.0, *rate, 0.0, 0.0);
            assert_eq!(totals.cgst_amount, totals.sgst_amount);
            assert!(
                (totals.cgst_amount - totals.taxable_amount * rate.percent() / 200.0).abs()
                    < 1e-9
            );
        }
    }

    #[test]
    fn grand_total_is_sum_of_components() {
        let totals = compute_totals(2750.5, 7.25, GstRate::Twelve, 150.0, 90.0);
        let sum = totals.taxable_amount
            + totals.cgst_amount
            + totals.sgst_amount
            + totals.igst_amount;
        assert_eq!(totals.grand_total, sum);
    }

    #[test]
    fn identical_inputs_give_bit_identical_results() {
        let a = compute_totals(2000.0, 88.9, GstRate::Eighteen, 0.0, 0.0);
        let b = compute_totals(2000.0, 88.9, GstRate::Eighteen, 0.0, 0.0);
        assert_eq!(a.taxable_amount.to_bits(), b.taxable_amount.to_bits());
        assert_eq!(a.cgst_amount.to_bits(), b.cgst_amount.to_bits());
        assert_eq!(a.grand_total.to_bits(), b.grand_total.to_bits());
    }

    #[test]
    fn hourly_contract_at_eighteen_percent() {
        let totals = compute_totals(2000.0, 88.9, GstRate::Eighteen, 0.0, 0.0);
        assert!((totals.taxable_amount - 177_800.0).abs() < 1e-6);
        assert!((totals.cgst_amount - 16_002.0).abs() < 1e-6);
        assert!((totals.sgst_amount - 16_002.0).abs() < 1e-6);
        assert_eq!(totals.igst_amount, 0.0);
        assert!((totals.grand_total - 209_804.0).abs() < 1e-6);
    }

    #[test]
    fn exempt_lump_sum_job() {
        let totals = compute_totals(50_000.0, 1.0, GstRate::Exempt, 0.0, 0.0);
        assert_eq!(totals.taxable_amount, 50_000.0);
        assert_eq!(totals.grand_total, 50_000.0);
        assert_eq!(totals.cgst_amount, 0.0);
        assert_eq!(totals.sgst_amount, 0.0);
        assert_eq!(totals.igst_amount, 0.0);
    }

    #[test]
    fn deductions_can_drive_totals_negative() {
        let totals = compute_totals(100.0, 2.0, GstRate::Eighteen, 0.0, 500.0);
        assert_eq!(totals.taxable_amount, -300.0);
        assert!((totals.cgst_amount - (-27.0)).abs() < 1e-9);
        assert!((totals.sgst_amount - (-27.0)).abs() < 1e-9);
        assert!((totals.grand_total - (-354.0)).abs() < 1e-9);
    }

    #[test]
    fn malformed_inputs_are_treated_as_zero() {
        let totals = compute_totals(f64::NAN, 10.0, GstRate::Eighteen, f64::INFINITY, -50.0);
        assert_eq!(totals.taxable_amount, 0.0);
        assert_eq!(totals.grand_total, 0.0);

        // A negative rate is normalized away rather than inverting the bill.
        let totals = compute_totals(-2000.0, 5.0, GstRate::Five, 100.0, 0.0);
        assert_eq!(totals.taxable_amount, 100.0);
    }

    #[test]
    fn gst_rate_round_trips_through_percent() {
        for rate in GstRate::ALL {
            let percent = u8::from(*rate);
            assert_eq!(GstRate::try_from(percent).unwrap(), *rate);
        }
        assert!(GstRate::try_from(7).is_err());
    }
}
