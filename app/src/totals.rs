use crate::models::{AdditionalCost, Invoice, InvoiceStatus};

/// A cost counts once it has a printable description and a strictly positive
/// amount. Anything else is an unfinished form row.
pub fn is_qualifying(cost: &AdditionalCost) -> bool {
    !cost.description.trim().is_empty() && cost.amount > 0.0
}

pub fn qualifying_costs(costs: &[AdditionalCost]) -> impl Iterator<Item = &AdditionalCost> {
    costs.iter().filter(|c| is_qualifying(c))
}

pub fn additional_total(costs: &[AdditionalCost]) -> f64 {
    qualifying_costs(costs).map(|c| c.amount).sum()
}

/// `rate + Σ qualifying amounts`, unrounded.
pub fn invoice_total(invoice: &Invoice) -> f64 {
    invoice.rate + additional_total(invoice.additional_costs())
}

pub fn outstanding_balance(invoice: &Invoice) -> f64 {
    match invoice.status {
        InvoiceStatus::Paid => 0.0,
        InvoiceStatus::Unpaid => invoice_total(invoice),
        InvoiceStatus::Partial => invoice_total(invoice) - invoice.paid_amount.unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(rate: f64, costs: Vec<AdditionalCost>) -> Invoice {
        Invoice {
            id: "1".into(),
            invoice_number: "INV-2508-1".into(),
            load_number: "1".into(),
            broker: "ABC Logistics".into(),
            driver: "John Smith".into(),
            truck_number: "TRK-001".into(),
            rate,
            pickup_location: String::new(),
            delivery_location: String::new(),
            pickup_date: String::new(),
            delivery_date: String::new(),
            notes: String::new(),
            status: InvoiceStatus::Unpaid,
            payment_method: None,
            payment_date: None,
            paid_amount: None,
            created_at: "2025-08-12T10:00:00Z".into(),
            additional_costs: if costs.is_empty() { None } else { Some(costs) },
            include_route_info: None,
        }
    }

    #[test]
    fn only_described_positive_costs_count() {
        let inv = invoice(
            650.0,
            vec![
                AdditionalCost::new("Fuel Surcharge", 85.0),
                AdditionalCost::new("", 50.0),
                AdditionalCost::new("Detention", 0.0),
            ],
        );
        assert_eq!(invoice_total(&inv), 735.0);
    }

    #[test]
    fn blank_descriptions_do_not_count() {
        let inv = invoice(
            650.0,
            vec![
                AdditionalCost::new("Fuel Surcharge", 85.0),
                AdditionalCost::new("   ", 50.0),
                AdditionalCost::new("\t\n", 5.0),
            ],
        );
        assert!(!is_qualifying(&AdditionalCost::new("   ", 50.0)));
        assert_eq!(invoice_total(&inv), 735.0);
    }

    #[test]
    fn negative_costs_are_ignored_but_negative_rate_is_not() {
        let inv = invoice(-10.0, vec![AdditionalCost::new("Refund", -25.0)]);
        assert_eq!(invoice_total(&inv), -10.0);
    }

    #[test]
    fn order_of_costs_does_not_matter() {
        let a = invoice(
            100.0,
            vec![
                AdditionalCost::new("Lumper", 12.5),
                AdditionalCost::new("", 99.0),
                AdditionalCost::new("Tolls", 7.25),
            ],
        );
        let mut reversed = a.clone();
        reversed.additional_costs.as_mut().unwrap().reverse();
        assert_eq!(invoice_total(&a), invoice_total(&reversed));
        assert_eq!(invoice_total(&a), invoice_total(&a));
    }

    #[test]
    fn outstanding_balance_follows_status() {
        let mut inv = invoice(1000.0, vec![]);
        assert_eq!(outstanding_balance(&inv), 1000.0);

        inv.status = InvoiceStatus::Partial;
        inv.paid_amount = Some(400.0);
        assert_eq!(outstanding_balance(&inv), 600.0);

        inv.status = InvoiceStatus::Paid;
        assert_eq!(outstanding_balance(&inv), 0.0);
    }

    #[test]
    fn partial_without_amount_owes_everything() {
        let mut inv = invoice(250.0, vec![AdditionalCost::new("Tarp", 50.0)]);
        inv.status = InvoiceStatus::Partial;
        assert_eq!(outstanding_balance(&inv), 300.0);
    }
}
