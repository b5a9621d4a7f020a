//! Splitting the bankroll's capital between partners in proportion to their equity units.

use std::collections::HashMap;

use uuid::Uuid;

use crate::partner::{EquityEvent, Partner};

/// A partner's position in the bankroll.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerShare {
    pub partner: Partner,
    /// Net cash the partner has put in.
    pub cash_in: f64,
    /// Equity units held by the partner.
    pub units: f64,
    /// The partner's fraction of all units, 0 when no units exist.
    pub quota: f64,
    /// The partner's part of the current capital.
    pub capital_pro_quota: f64,
    /// `capital_pro_quota - cash_in`.
    pub gain_pro_quota: f64,
}

/// Every partner's share along with the bankroll totals.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerShares {
    /// Largest quota first.
    pub rows: Vec<PartnerShare>,
    pub total_cash_in: f64,
    pub total_units: f64,
    /// `capital - total_cash_in`.
    pub overall_profit: f64,
}

impl PartnerShares {
    /// The quota of each partner with its id, in the order of `rows`.
    pub fn quotas(&self) -> Vec<(Uuid, f64)> {
        self.rows
            .iter()
            .map(|row| (row.partner.id, row.quota))
            .collect()
    }
}

/// Compute each partner's share of `capital` from the equity events.
///
/// Events for partners that are not in `partners` still count towards the
/// totals.
pub fn partner_shares(partners: &[Partner], events: &[EquityEvent], capital: f64) -> PartnerShares {
    let mut cash_in_by_partner: HashMap<Uuid, f64> = HashMap::new();
    let mut units_by_partner: HashMap<Uuid, f64> = HashMap::new();
    let mut total_cash_in = 0.0;
    let mut total_units = 0.0;

    for event in events {
        *cash_in_by_partner.entry(event.partner_id).or_default() += event.cash_in;
        *units_by_partner.entry(event.partner_id).or_default() += event.units_minted;
        total_cash_in += event.cash_in;
        total_units += event.units_minted;
    }

    let mut rows: Vec<PartnerShare> = partners
        .iter()
        .map(|partner| {
            let cash_in = cash_in_by_partner.get(&partner.id).copied().unwrap_or(0.0);
            let units = units_by_partner.get(&partner.id).copied().unwrap_or(0.0);
            let quota = if total_units > 0.0 {
                units / total_units
            } else {
                0.0
            };
            let capital_pro_quota = capital * quota;

            PartnerShare {
                partner: partner.clone(),
                cash_in,
                units,
                quota,
                capital_pro_quota,
                gain_pro_quota: capital_pro_quota - cash_in,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.quota.total_cmp(&a.quota));

    PartnerShares {
        rows,
        total_cash_in,
        total_units,
        overall_profit: capital - total_cash_in,
    }
}
