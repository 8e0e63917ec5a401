//! Plain-text prompt summarizing a deal for an external assistant.

use fliplab_core::DealInput;

const TASK: &str =
    "TASK: Explain top risks and 3 actions to improve ROI for a novice Chicago agent, <=150 words.";

/// Build the hand-off prompt for `deal`.
///
/// A non-blank `question` is placed first, separated by a blank line.
pub fn handoff_prompt(deal: &DealInput, question: Option<&str>) -> String {
    let base = format!(
        "PROPERTY: {address} in {region}\n\
         NUMBERS: purchase=${purchase}, rehab=${rehab}, carry=${carry}, sell%={sell:.1}%, ARV=${arv}, \
         hold={hold:?}m, permit={permit}d, tax={tax:.2}%\n\
         {TASK}",
        address = deal.address,
        region = deal.region_ring,
        purchase = dollars(deal.purchase),
        rehab = dollars(deal.rehab),
        carry = dollars(deal.carry),
        sell = deal.selling_pct * 100.0,
        arv = dollars(deal.projected_sale),
        hold = deal.hold_months,
        permit = deal.permit_delay_days,
        tax = deal.tax_drag * 100.0,
    );

    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("{q}\n\n{base}"),
        None => base,
    }
}

/// Whole dollars with thousands separators, e.g. `1,250,000`.
fn dollars(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
