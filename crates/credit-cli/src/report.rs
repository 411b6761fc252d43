//! Human-readable credit report.

use credit_core::types::Band;
use credit_scorer::{share_text, CreditReport, Impact, ImprovementPlan};

fn band_note(band: Band) -> &'static str {
    match band {
        Band::Excellent => "Strong, well-managed wallet",
        Band::Good => "Healthy with room to improve",
        Band::Moderate => "Mixed signals",
        Band::Poor => "Weak or risky behavior",
        Band::NoData => "Not enough activity to judge",
    }
}

/// Render a report and its improvement plan as plain text.
pub fn generate_report(
    wallet: Option<&str>,
    report: &CreditReport,
    plan: &ImprovementPlan,
) -> String {
    let aggregate = &report.aggregate;
    let mut out = String::new();

    out.push_str("=== Wallet Credit Report ===\n");
    if let Some(wallet) = wallet {
        out.push_str(&format!("Wallet: {}\n", wallet));
    }
    out.push_str(&format!(
        "Credit Score: {} ({})\n",
        aggregate.credit_score,
        aggregate.credit_band.credit_label()
    ));
    out.push_str(&format!(
        "Overall: {}/100 - {} - {}\n",
        aggregate.overall_score,
        aggregate.label,
        band_note(aggregate.band)
    ));
    out.push_str(&format!(
        "Factors With Data: {}/{}\n",
        aggregate.factors_used,
        report.factors.len()
    ));

    out.push_str("\n--- Factors ---\n");
    for factor in &report.factors {
        if factor.has_data() {
            out.push_str(&format!(
                "{:<28} {:>3}  {}\n",
                factor.name.title(),
                factor.value,
                factor.band.label()
            ));
        } else {
            out.push_str(&format!("{:<28}   -  {}\n", factor.name.title(), factor.band.label()));
        }
    }

    if !plan.weakest.is_empty() {
        out.push_str("\n--- Focus Areas ---\n");
        for factor in &plan.weakest {
            out.push_str(&format!("- {} ({})\n", factor.name.title(), factor.value));
        }
    }

    out.push_str("\n--- Recommendations ---\n");
    out.push_str(&format!(
        "{} high impact, {} medium, {} low\n",
        plan.count_by_impact(Impact::High),
        plan.count_by_impact(Impact::Medium),
        plan.count_by_impact(Impact::Low)
    ));
    for rec in &plan.recommendations {
        out.push_str(&format!(
            "* {} [impact: {}, difficulty: {}]\n  {}\n",
            rec.title, rec.impact, rec.difficulty, rec.description
        ));
    }

    out.push_str(&format!("\n{}\n", share_text(aggregate)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::types::{NormalizedTransaction, TransactionType};
    use credit_scorer::{CreditScorer, WalletActivity};
    use rust_decimal::Decimal;

    const NOW: i64 = 1_704_067_200;

    #[test]
    fn test_generate_report() {
        let history: Vec<_> = (0..150)
            .map(|i| {
                NormalizedTransaction::new(NOW - 86_400 * (i % 200), Decimal::new(15, 1), "SOL")
                    .with_type(TransactionType::Transfer)
            })
            .collect();
        let activity = WalletActivity::new(history, NOW).with_balance(Decimal::from(5));
        let report = CreditScorer::default().score(&activity);
        let plan = ImprovementPlan::from_report(&report);

        let text = generate_report(Some("Wallet1111"), &report, &plan);

        assert!(text.contains("Wallet: Wallet1111"));
        assert!(text.contains("Basic Activity"));
        assert!(text.contains("Maintain a Safety Buffer"));
        assert!(text.contains(&format!("Credit Score: {}", report.aggregate.credit_score)));
    }

    #[test]
    fn test_generate_report_empty_wallet() {
        let report = CreditScorer::default().score(&WalletActivity::new(Vec::new(), NOW));
        let plan = ImprovementPlan::from_report(&report);

        let text = generate_report(None, &report, &plan);

        assert!(!text.contains("Wallet:"));
        assert!(text.contains("Credit Score: 300"));
        assert!(text.contains("Not enough activity to judge"));
        assert!(!text.contains("Focus Areas"));
        assert!(text.contains("1 high impact, 1 medium, 1 low"));
    }
}
