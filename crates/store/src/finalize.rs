//! Constraints and indexes applied after the data is stable.
//!
//! Constraint application is the closure check: once every dimension has
//! been reconciled against the facts, adding the foreign keys must
//! succeed, and a violation here means reconciliation missed a key.

use pipeline_core::Granularity;

/// Primary keys, then fact foreign keys, then cube foreign keys.
pub fn constraint_statements() -> Vec<String> {
    let mut stmts = vec![
        "ALTER TABLE dim_risk ADD PRIMARY KEY (id)".to_string(),
        "ALTER TABLE dim_country ADD PRIMARY KEY (id)".to_string(),
        "ALTER TABLE dim_asn ADD PRIMARY KEY (number)".to_string(),
        "ALTER TABLE dim_time ADD PRIMARY KEY (date)".to_string(),
        "ALTER TABLE fact_count ADD FOREIGN KEY (risk) REFERENCES dim_risk (id)".to_string(),
        "ALTER TABLE fact_count ADD FOREIGN KEY (country) REFERENCES dim_country (id)".to_string(),
        "ALTER TABLE fact_count ADD FOREIGN KEY (asn) REFERENCES dim_asn (number)".to_string(),
        "ALTER TABLE fact_count ADD FOREIGN KEY (date) REFERENCES dim_time (date)".to_string(),
    ];
    for granularity in Granularity::ALL {
        let table = granularity.cube_table();
        stmts.push(format!(
            "ALTER TABLE {table} ADD FOREIGN KEY (risk) REFERENCES dim_risk (id)"
        ));
        stmts.push(format!(
            "ALTER TABLE {table} ADD FOREIGN KEY (country) REFERENCES dim_country (id)"
        ));
        stmts.push(format!(
            "ALTER TABLE {table} ADD FOREIGN KEY (date) REFERENCES dim_time (date)"
        ));
    }
    stmts
}

/// Indexes for the reporting API's access patterns: the full composite
/// key both ways, plus single-column lookups.
pub fn index_statements() -> Vec<String> {
    let mut stmts = vec![
        "CREATE INDEX idx_fact_count_all ON fact_count (date, risk, country, asn)".to_string(),
        "CREATE INDEX idx_fact_count_all_desc ON fact_count (date DESC, risk, country, asn)"
            .to_string(),
        "CREATE INDEX idx_fact_count_risk ON fact_count (risk)".to_string(),
        "CREATE INDEX idx_fact_count_country ON fact_count (country)".to_string(),
        "CREATE INDEX idx_fact_count_asn ON fact_count (asn)".to_string(),
        "CREATE INDEX idx_fact_count_date ON fact_count (date)".to_string(),
    ];
    for granularity in Granularity::ALL {
        let table = granularity.cube_table();
        stmts.push(format!(
            "CREATE INDEX idx_{table}_all ON {table} (date, risk, country)"
        ));
        stmts.push(format!(
            "CREATE INDEX idx_{table}_all_desc ON {table} (date DESC, risk, country)"
        ));
        stmts.push(format!("CREATE INDEX idx_{table}_risk ON {table} (risk)"));
        stmts.push(format!(
            "CREATE INDEX idx_{table}_country ON {table} (country)"
        ));
        stmts.push(format!("CREATE INDEX idx_{table}_date ON {table} (date)"));
    }
    stmts
}
