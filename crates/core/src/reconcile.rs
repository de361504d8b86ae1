//! Dimension reconciliation planning.
//!
//! Fact data routinely references countries and ASNs the upstream catalogs
//! have not been updated to include. Before constraints are applied, the
//! reconciler inserts minimal placeholder rows so foreign keys can hold
//! without dropping valid fact rows. Planning is pure: the store supplies
//! the observed and known key sets, this module decides what to insert.
//!
//! Countries must be reconciled before ASNs: an ASN placeholder takes its
//! country from the fact row, and that country may itself be a placeholder.

use std::collections::{HashMap, HashSet};

use crate::model::{AsnDimension, CountryDimension};

/// Placeholder rows for fact countries with no catalog row.
pub fn plan_countries(
    fact_countries: &[String],
    existing: &HashSet<String>,
) -> Vec<CountryDimension> {
    let mut seen = HashSet::new();
    let mut inserts = Vec::new();
    for code in fact_countries {
        if existing.contains(code) || !seen.insert(code.clone()) {
            continue;
        }
        inserts.push(CountryDimension::placeholder(code));
    }
    inserts.sort_by(|a, b| a.id.cmp(&b.id));
    inserts
}

/// Outcome of ASN reconciliation planning.
#[derive(Debug, Default)]
pub struct AsnPlan {
    pub inserts: Vec<AsnDimension>,
    /// (asn, country) pairings ignored because the ASN was already planned
    /// with a different country. Reported, never inserted.
    pub skipped: Vec<(i64, String)>,
}

/// Placeholder rows for fact ASNs with no catalog row.
///
/// An ASN key is unique; its country association is first-write-wins over
/// the ordered `fact_pairs` stream. A later occurrence with a conflicting
/// country lands in `skipped`.
pub fn plan_asns(fact_pairs: &[(i64, Option<String>)], existing: &HashSet<i64>) -> AsnPlan {
    let mut chosen: HashMap<i64, String> = HashMap::new();
    let mut plan = AsnPlan::default();

    for (asn, country) in fact_pairs {
        if existing.contains(asn) {
            continue;
        }
        let row = AsnDimension::placeholder(*asn, country.as_deref());
        match chosen.get(asn) {
            None => {
                chosen.insert(*asn, row.country.clone());
                plan.inserts.push(row);
            }
            Some(first) if *first != row.country => {
                plan.skipped.push((*asn, row.country));
            }
            Some(_) => {}
        }
    }

    plan
}
